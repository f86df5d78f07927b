//! Explain command implementation.

use anyhow::{Context, Result};
use iam_policy::{Policy, Principal};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

/// Runs the explain command.
pub fn run(policy_path: &Path) -> Result<()> {
    info!("Explaining policy: {}", policy_path.display());

    let policy = iam_policy::load_from_path(policy_path)
        .with_context(|| format!("Failed to load policy: {}", policy_path.display()))?;

    print!("{}", describe(&policy));
    Ok(())
}

/// Renders a plain-text summary of a policy.
fn describe(policy: &Policy) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} role(s), {} group(s), {} project(s), {} binding(s)",
        policy.roles.len(),
        policy.groups.len(),
        policy.projects.len(),
        policy.binding_count()
    );

    let custom: Vec<_> = policy.custom_role_names().collect();
    if !custom.is_empty() {
        let _ = writeln!(out, "custom roles: {}", custom.join(", "));
    }

    for (name, role) in &policy.roles {
        let _ = writeln!(out, "role {name}: {} permission(s)", role.permissions.len());
    }

    for (name, group) in &policy.groups {
        let _ = writeln!(out, "group {name}: {}", group.members.join(", "));
    }

    for (project, idx, binding) in policy.bindings() {
        let _ = write!(
            out,
            "{project}[{idx}] {} -> {}",
            binding.role,
            binding.members.join(", ")
        );
        if let Some(condition) = &binding.condition {
            let label = condition.title.as_deref().unwrap_or(&condition.expression);
            let _ = write!(out, " if {label}");
        }
        if binding.members.iter().any(|m| is_public(m)) {
            out.push_str(" (public)");
        }
        out.push('\n');
    }

    out
}

fn is_public(member: &str) -> bool {
    Principal::parse(member).is_ok_and(|p| p.is_public())
}
