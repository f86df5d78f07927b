//! Error types for policy parsing, serialization and file I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a policy document.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read the policy file.
    #[error("failed to read policy file {}: {source}", .path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the policy file.
    #[error("failed to write policy file {}: {source}", .path.display())]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid YAML or does not match the policy schema.
    #[error("parse error{}: {reason}", .location.map_or_else(String::new, |l| format!(" at {l}")))]
    Parse {
        /// Where the problem was found, if the YAML library reported it.
        location: Option<Location>,
        /// Reason for the parse failure.
        reason: String,
    },

    /// Failed to render the policy as YAML.
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Position of a parse failure inside a document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

impl Error {
    /// Builds a parse error from a YAML deserialization failure.
    pub(crate) fn parse(err: &serde_yaml::Error) -> Self {
        let location = err.location().map(|l| Location {
            line: l.line(),
            column: l.column(),
        });
        // serde_yaml appends its own "at line X column Y" suffix; keep only the reason.
        let message = err.to_string();
        let reason = match message.find(" at line ") {
            Some(idx) if location.is_some() => message[..idx].to_string(),
            _ => message,
        };
        Self::Parse { location, reason }
    }
}

/// A principal string does not follow the `type:identifier` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    /// Neither a special literal nor `type:identifier`.
    #[error("invalid principal format: {0} (expected type:identifier)")]
    Format(String),

    /// The type part is not one of the supported principal types.
    #[error("unknown principal type: {0} (expected user, serviceAccount, or group)")]
    UnknownType(String),

    /// A user or service account identifier is not email-shaped.
    #[error("invalid {kind}: {identifier} (expected email format)")]
    NotEmail {
        /// Principal type (`user` or `serviceAccount`).
        kind: String,
        /// The offending identifier.
        identifier: String,
    },
}

/// A permission string does not follow `service.resource.verb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// Fewer than three dot-separated segments.
    #[error("invalid permission format: {0} (expected service.resource.verb)")]
    Format(String),

    /// The service segment names no known service.
    #[error("unknown service in permission: {0} (expected secretmanager or cloudkms)")]
    UnknownService(String),
}

/// Result type alias for policy codec operations.
pub type Result<T> = std::result::Result<T, Error>;
