//! YAML codec for policy documents.
//!
//! # Format
//!
//! ```yaml
//! roles:
//!   roles/custom.secretReader:
//!     permissions:
//!     - secretmanager.secrets.get
//!     - secretmanager.versions.access
//! groups:
//!   developers:
//!     members:
//!     - user:alice@example.com
//! projects:
//!   test-project:
//!     bindings:
//!     - role: roles/custom.secretReader
//!       members:
//!       - group:developers
//!       condition:
//!         expression: resource.name.startsWith("projects/test-project/secrets/dev-")
//!         title: dev secrets only
//! ```
//!
//! Unknown keys are ignored. Missing or `null` sections read as empty.

use crate::error::{Error, Result};
use crate::model::Policy;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Parses a YAML policy document.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the bytes are not valid YAML or if the
/// document does not have the shape of a policy (for example a scalar
/// where a mapping of roles is expected). No partial policy is returned.
///
/// # Example
///
/// ```rust
/// use iam_policy::parse;
///
/// let input = br#"
/// projects:
///   demo:
///     bindings:
///     - role: roles/secretmanager.viewer
///       members: [allAuthenticatedUsers]
/// "#;
///
/// let policy = parse(input).unwrap();
/// assert!(policy.roles.is_empty());
/// assert_eq!(policy.projects["demo"].bindings.len(), 1);
/// ```
pub fn parse(input: &[u8]) -> Result<Policy> {
    if is_blank(input) {
        return Ok(Policy::default());
    }

    let policy: Option<Policy> = serde_yaml::from_slice(input).map_err(|e| Error::parse(&e))?;
    Ok(policy.unwrap_or_default())
}

/// Parses a YAML policy document from a string.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_str(input: &str) -> Result<Policy> {
    parse(input.as_bytes())
}

/// Serializes a [`Policy`] to canonical YAML.
///
/// Sections are written as `roles`, `groups`, `projects`; maps are written
/// in key order and sequences in stored order. A binding without a
/// condition has no `condition` key at all.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if the YAML emitter fails.
pub fn serialize(policy: &Policy) -> Result<String> {
    serde_yaml::to_string(policy).map_err(Error::Serialize)
}

/// Reads and parses a policy file.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be opened or read, and
/// [`Error::Parse`] if its contents are not a valid policy.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Policy> {
    let path = path.as_ref();
    debug!("Loading policy from {}", path.display());

    let read_err = |source: std::io::Error| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = Vec::new();
    {
        let mut file = File::open(path).map_err(read_err)?;
        file.read_to_end(&mut buf).map_err(read_err)?;
    }

    let policy = parse(&buf)?;
    debug!(
        "Loaded policy with {} roles, {} groups, {} projects",
        policy.roles.len(),
        policy.groups.len(),
        policy.projects.len()
    );
    Ok(policy)
}

/// Serializes a policy and writes it to `path`, replacing any existing file.
///
/// The document is rendered before the file is opened, so a serialization
/// failure leaves an existing file untouched.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if rendering fails and [`Error::Write`] if
/// the file cannot be created or written.
pub fn save_to_path(policy: &Policy, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let document = serialize(policy)?;

    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(document.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    debug!("Wrote {} bytes to {}", document.len(), path.display());
    Ok(())
}

/// True when the document has no content besides whitespace and comments.
fn is_blank(input: &[u8]) -> bool {
    input.split(|&b| b == b'\n').all(|line| {
        matches!(
            line.iter().find(|b| !b.is_ascii_whitespace()),
            None | Some(&b'#')
        )
    })
}
