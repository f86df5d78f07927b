//! Fmt command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Runs the fmt command.
pub fn run(policy_path: &Path, check: bool) -> Result<()> {
    let original = fs::read_to_string(policy_path)
        .with_context(|| format!("Failed to read policy file: {}", policy_path.display()))?;

    let policy = iam_policy::parse_str(&original).with_context(|| "Failed to parse policy")?;
    let canonical = iam_policy::serialize(&policy).with_context(|| "Failed to serialize policy")?;

    if canonical == original {
        info!("{} is already formatted", policy_path.display());
        return Ok(());
    }

    if check {
        anyhow::bail!("{} is not in canonical form", policy_path.display());
    }

    iam_policy::save_to_path(&policy, policy_path)
        .with_context(|| format!("Failed to write policy file: {}", policy_path.display()))?;
    info!("Formatted {}", policy_path.display());
    Ok(())
}
