//! Validation result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of validating one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False as soon as any error-level finding is recorded.
    pub valid: bool,
    /// Every finding, in the order the checks produced them.
    pub findings: Vec<Finding>,
}

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No findings at all.
    Valid,
    /// Loadable, but with advisory warnings.
    ValidWithWarnings,
    /// At least one error; must not be loaded.
    Invalid,
}

/// One validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Which check produced the finding.
    pub check: Check,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Makes the policy invalid.
    Error,
    /// Advisory only.
    Warning,
}

/// Identifies the check behind a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// The policy defines no roles.
    NoRoles,
    /// A role key lacks the `roles/` prefix.
    RoleNamePrefix,
    /// A role grants no permissions.
    RoleNoPermissions,
    /// A permission has fewer than three segments.
    PermissionFormat,
    /// A permission names a service outside the allow-list.
    PermissionService,
    /// The policy defines no projects.
    NoProjects,
    /// A project has no bindings.
    ProjectNoBindings,
    /// A binding's role lacks the `roles/` prefix.
    BindingRolePrefix,
    /// A binding refers to a custom role the policy does not define.
    UndefinedCustomRole,
    /// A binding grants its role to nobody.
    BindingNoMembers,
    /// A member is neither a literal nor `type:identifier`.
    PrincipalFormat,
    /// A member has an unsupported principal type.
    PrincipalType,
    /// A user or service account member is not email-shaped.
    PrincipalEmail,
    /// A `group:` member refers to a group the policy does not define.
    UndefinedGroup,
    /// A binding condition has an empty expression.
    EmptyCondition,
}

impl Check {
    /// Stable kebab-case name of the check.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoRoles => "no-roles",
            Self::RoleNamePrefix => "role-name-prefix",
            Self::RoleNoPermissions => "role-no-permissions",
            Self::PermissionFormat => "permission-format",
            Self::PermissionService => "permission-service",
            Self::NoProjects => "no-projects",
            Self::ProjectNoBindings => "project-no-bindings",
            Self::BindingRolePrefix => "binding-role-prefix",
            Self::UndefinedCustomRole => "undefined-custom-role",
            Self::BindingNoMembers => "binding-no-members",
            Self::PrincipalFormat => "principal-format",
            Self::PrincipalType => "principal-type",
            Self::PrincipalEmail => "principal-email",
            Self::UndefinedGroup => "undefined-group",
            Self::EmptyCondition => "empty-condition",
        }
    }

    /// Severity every finding of this check carries.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::NoRoles
            | Self::RoleNoPermissions
            | Self::NoProjects
            | Self::ProjectNoBindings => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

impl Finding {
    /// Creates a finding; severity follows from the check.
    #[must_use]
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: check.severity(),
            message: message.into(),
        }
    }

    /// Returns true for error-level findings.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// Creates a result with no findings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            valid: true,
            findings: Vec::new(),
        }
    }

    /// Records a finding.
    pub fn push(&mut self, finding: Finding) {
        if finding.is_error() {
            self.valid = false;
        }
        self.findings.push(finding);
    }

    /// Returns true if no error was recorded.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Overall verdict.
    #[must_use]
    pub fn status(&self) -> Status {
        if !self.valid {
            Status::Invalid
        } else if self.findings.is_empty() {
            Status::Valid
        } else {
            Status::ValidWithWarnings
        }
    }

    /// Error-level findings in order.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    /// Warning-level findings in order.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    /// Number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Findings produced by `check`, in order.
    pub fn by_check(&self, check: Check) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.check == check)
    }

    /// One line per finding, `SEVERITY: message`, in finding order.
    #[must_use]
    pub fn render(&self) -> String {
        self.findings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short summary such as `invalid: 2 error(s), 1 warning(s)`.
    #[must_use]
    pub fn summary(&self) -> String {
        let verdict = if self.valid { "valid" } else { "invalid" };
        format!(
            "{verdict}: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}
