//! Init command implementation.

use anyhow::{Context, Result};
use iam_policy::Template;
use std::path::Path;
use tracing::{info, warn};

/// Runs the init command.
pub fn run(path: &Path, template: Template, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    info!("Writing '{}' policy template to: {}", template, path.display());

    let policy = template.build();
    iam_policy::save_to_path(&policy, path)
        .with_context(|| format!("Failed to write policy file: {}", path.display()))?;

    let result = iam_validator::validate(&policy);
    for finding in result.warnings() {
        warn!("[{}] {}", finding.check, finding.message);
    }
    info!("Created: {} ({})", path.display(), result.summary());

    info!("");
    info!("Next steps:");
    info!("  1. Edit {} to define roles, groups and bindings", path.display());
    info!("  2. Run 'iamctl validate' to check it");
    info!("  3. Point the emulators at the validated file");

    Ok(())
}
