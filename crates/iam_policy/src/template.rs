//! Starter policies for new emulator setups.

use crate::model::{Binding, Condition, Group, Policy, Role};
use std::fmt;
use std::str::FromStr;

/// Project name used by the starter policies.
pub const DEFAULT_PROJECT: &str = "test-project";

/// A built-in starter policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    /// One developer role granted to a developers group.
    #[default]
    Basic,
    /// Developer, CI and read-only roles, two groups, and a conditional binding.
    Advanced,
    /// A CI runner role granted to a group of service accounts.
    Ci,
}

impl Template {
    /// Every template, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Advanced, Self::Ci];

    /// Name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Ci => "ci",
        }
    }

    /// Builds the policy for this template.
    #[must_use]
    pub fn build(self) -> Policy {
        match self {
            Self::Basic => basic(),
            Self::Advanced => advanced(),
            Self::Ci => ci(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|t| t.name()).collect();
                format!("unknown template '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

fn ci_account(name: &str) -> String {
    format!("serviceAccount:{name}@{DEFAULT_PROJECT}.iam.gserviceaccount.com")
}

fn basic() -> Policy {
    let mut policy = Policy::new();
    policy.add_role(
        "roles/custom.developer",
        Role::new([
            "secretmanager.secrets.create",
            "secretmanager.secrets.get",
            "secretmanager.versions.add",
            "secretmanager.versions.access",
            "cloudkms.cryptoKeys.encrypt",
            "cloudkms.cryptoKeys.decrypt",
        ]),
    );
    policy.add_group("developers", Group::new(["user:alice@example.com"]));
    policy.add_binding(
        DEFAULT_PROJECT,
        Binding::new("roles/custom.developer", ["group:developers"]),
    );
    policy
}

fn advanced() -> Policy {
    let mut policy = Policy::new();
    policy.add_role(
        "roles/custom.developer",
        Role::new([
            "secretmanager.secrets.create",
            "secretmanager.secrets.get",
            "secretmanager.secrets.update",
            "secretmanager.versions.add",
            "secretmanager.versions.access",
            "cloudkms.keyRings.create",
            "cloudkms.cryptoKeys.create",
            "cloudkms.cryptoKeys.encrypt",
            "cloudkms.cryptoKeys.decrypt",
        ]),
    );
    policy.add_role(
        "roles/custom.ciRunner",
        Role::new([
            "secretmanager.secrets.get",
            "secretmanager.versions.access",
            "cloudkms.cryptoKeys.encrypt",
        ]),
    );
    policy.add_role(
        "roles/custom.readonly",
        Role::new([
            "secretmanager.secrets.get",
            "cloudkms.keyRings.get",
            "cloudkms.cryptoKeys.get",
        ]),
    );

    policy.add_group(
        "developers",
        Group::new(["user:alice@example.com", "user:bob@example.com"]),
    );
    policy.add_group("operations", Group::new(["user:ops@example.com"]));

    policy.add_binding(
        DEFAULT_PROJECT,
        Binding::new("roles/custom.developer", ["group:developers"]),
    );
    policy.add_binding(
        DEFAULT_PROJECT,
        Binding::new("roles/custom.ciRunner", [ci_account("ci")]).with_condition(
            Condition::new(format!(
                "resource.name.startsWith(\"projects/{DEFAULT_PROJECT}/secrets/prod-\")"
            ))
            .with_title("CI limited to production secrets"),
        ),
    );
    policy.add_binding(
        DEFAULT_PROJECT,
        Binding::new("roles/custom.readonly", ["group:operations"]),
    );
    policy
}

fn ci() -> Policy {
    let mut policy = Policy::new();
    policy.add_role(
        "roles/custom.ciRunner",
        Role::new(["secretmanager.secrets.get", "secretmanager.versions.access"]),
    );
    policy.add_group(
        "ci-accounts",
        Group::new([ci_account("ci"), ci_account("github-actions")]),
    );
    policy.add_binding(
        DEFAULT_PROJECT,
        Binding::new("roles/custom.ciRunner", ["group:ci-accounts"]),
    );
    policy
}
