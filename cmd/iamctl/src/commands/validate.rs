//! Validate command implementation.

use super::OutputFormat;
use anyhow::{Context, Result};
use iam_policy::Service;
use iam_validator::{Severity, ValidationResult, Validator, ValidatorConfig};
use std::path::Path;
use tracing::{error, info, warn};

/// Runs the validate command.
pub fn run(
    policy_path: &Path,
    strict: bool,
    format: OutputFormat,
    services: &[String],
) -> Result<()> {
    info!("Validating policy: {}", policy_path.display());

    let policy = iam_policy::load_from_path(policy_path)
        .with_context(|| format!("Failed to load policy: {}", policy_path.display()))?;

    let validator = Validator::new(config_for(services)?);
    let result = validator.validate(&policy);

    match format {
        OutputFormat::Text => report(&result),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .with_context(|| "Failed to render validation result")?;
            println!("{json}");
        }
    }

    // Determine exit status
    if !result.valid {
        anyhow::bail!(
            "Policy validation failed with {} error(s)",
            result.error_count()
        );
    }

    if strict && result.warning_count() > 0 {
        anyhow::bail!(
            "Policy validation failed with {} warning(s) (strict mode)",
            result.warning_count()
        );
    }

    info!("Policy validation passed ({})", result.summary());
    Ok(())
}

fn report(result: &ValidationResult) {
    for finding in &result.findings {
        match finding.severity {
            Severity::Error => error!("[{}] {}", finding.check, finding.message),
            Severity::Warning => warn!("[{}] {}", finding.check, finding.message),
        }
    }
}

fn config_for(services: &[String]) -> Result<ValidatorConfig> {
    if services.is_empty() {
        return Ok(ValidatorConfig::default());
    }

    let allowed_services = services
        .iter()
        .map(|name| {
            Service::from_name(name).with_context(|| {
                format!("Unknown service: {name}. Use 'secretmanager' or 'cloudkms'.")
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ValidatorConfig { allowed_services })
}
