//! Main validator implementation.

use crate::checks;
use crate::result::{Check, Finding, ValidationResult};
use iam_policy::{Policy, Service};
use tracing::debug;

/// Policy validator that decides whether a policy is safe to load.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

/// Configuration for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Services permissions may refer to.
    pub allowed_services: Vec<Service>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            allowed_services: Service::ALL.to_vec(),
        }
    }
}

impl Validator {
    /// Creates a new validator with the given configuration.
    #[must_use]
    pub const fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a policy, collecting every finding.
    ///
    /// Roles are checked in key order, then projects in key order; bindings
    /// are checked in their stored order. Calling this twice on the same
    /// policy yields identical results.
    #[must_use]
    pub fn validate(&self, policy: &Policy) -> ValidationResult {
        let mut result = ValidationResult::new();

        if policy.roles.is_empty() {
            result.push(Finding::new(Check::NoRoles, "No roles defined"));
        }

        for (name, role) in &policy.roles {
            checks::check_role(name, role, &self.config.allowed_services, &mut result);
        }

        if policy.projects.is_empty() {
            result.push(Finding::new(Check::NoProjects, "No projects defined"));
        }

        for (project_name, project) in &policy.projects {
            debug!(
                "Checking project {} ({} bindings)",
                project_name,
                project.bindings.len()
            );

            if project.bindings.is_empty() {
                result.push(Finding::new(
                    Check::ProjectNoBindings,
                    format!("Project {project_name} has no bindings"),
                ));
            }

            for (idx, binding) in project.bindings.iter().enumerate() {
                checks::check_binding(policy, project_name, idx, binding, &mut result);
            }
        }

        debug!("Validation finished: {}", result.summary());
        result
    }
}

/// Validates a policy with the default configuration.
///
/// # Example
///
/// ```rust
/// use iam_policy::Policy;
/// use iam_validator::validate;
///
/// let result = validate(&Policy::new());
/// assert!(result.valid);
/// assert_eq!(result.warning_count(), 2);
/// ```
#[must_use]
pub fn validate(policy: &Policy) -> ValidationResult {
    Validator::default().validate(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Severity, Status};
    use iam_policy::{parse_str, Binding, Condition, Group, Role, Template};
    use proptest::prelude::*;

    fn checks_of(result: &ValidationResult) -> Vec<Check> {
        result.findings.iter().map(|f| f.check).collect()
    }

    /// A policy that produces no findings at all.
    fn clean_policy() -> Policy {
        let mut policy = Policy::new();
        policy.add_role("roles/custom.reader", Role::new(["secretmanager.secrets.get"]));
        policy.add_group("devs", Group::new(["user:dev@example.com"]));
        policy.add_binding(
            "p",
            Binding::new("roles/custom.reader", ["group:devs", "allUsers"]),
        );
        policy
    }

    #[test]
    fn clean_policy_has_no_findings() {
        let result = validate(&clean_policy());
        assert!(result.findings.is_empty(), "{}", result.render());
        assert_eq!(result.status(), Status::Valid);
    }

    #[test]
    fn empty_policy_warns_twice() {
        let result = validate(&parse_str("{}").unwrap());
        assert!(result.valid);
        assert_eq!(result.error_count(), 0);
        let messages: Vec<_> = result.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, ["No roles defined", "No projects defined"]);
        assert!(result.findings.iter().all(|f| f.severity == Severity::Warning));
    }

    #[test]
    fn unprefixed_role_name_is_single_error() {
        let mut policy = Policy::new();
        policy.add_role("custom.dev", Role::new(["secretmanager.secrets.get"]));

        let result = validate(&policy);
        assert!(!result.valid);
        assert_eq!(result.error_count(), 1);
        assert_eq!(
            result.errors().next().unwrap().message,
            "Role name must start with 'roles/': custom.dev"
        );
        assert_eq!(result.by_check(Check::PermissionFormat).count(), 0);
        assert_eq!(result.by_check(Check::PermissionService).count(), 0);
    }

    #[test]
    fn undefined_custom_role_and_group() {
        let input = r#"
projects:
  p:
    bindings:
      - role: "roles/custom.x"
        members: ["group:nonexistent"]
"#;
        let result = validate(&parse_str(input).unwrap());
        assert!(!result.valid);
        let errors: Vec<_> = result.errors().map(|f| f.check).collect();
        assert_eq!(errors, [Check::UndefinedCustomRole, Check::UndefinedGroup]);
        assert_eq!(
            result.errors().map(|f| f.message.as_str()).collect::<Vec<_>>(),
            [
                "Project p binding 0: undefined role roles/custom.x",
                "Project p binding 0: undefined group: nonexistent",
            ]
        );
    }

    #[test]
    fn missing_custom_role_is_not_a_prefix_error() {
        let mut policy = clean_policy();
        policy.add_binding("p", Binding::new("roles/custom.missing", ["allUsers"]));

        let result = validate(&policy);
        assert_eq!(checks_of(&result), [Check::UndefinedCustomRole]);
    }

    #[test]
    fn empty_condition_expression_is_single_error() {
        let mut policy = clean_policy();
        policy.projects.get_mut("p").unwrap().bindings[0].condition = Some(Condition::new(""));

        let result = validate(&policy);
        assert!(!result.valid);
        assert_eq!(checks_of(&result), [Check::EmptyCondition]);
    }

    #[test]
    fn condition_with_expression_is_fine() {
        let mut policy = clean_policy();
        policy.projects.get_mut("p").unwrap().bindings[0].condition =
            Some(Condition::new("request.time < timestamp(\"2030-01-01T00:00:00Z\")"));
        assert!(validate(&policy).findings.is_empty());
    }

    #[test]
    fn permission_format_and_service_errors() {
        let mut policy = clean_policy();
        policy.add_role("roles/custom.short", Role::new(["secretmanager.secrets"]));
        policy.add_role("roles/custom.unknown", Role::new(["unknownsvc.x.y"]));

        let result = validate(&policy);
        assert_eq!(
            checks_of(&result),
            [Check::PermissionFormat, Check::PermissionService]
        );
        assert_eq!(
            result.findings[1].message,
            "Role roles/custom.unknown: unknown service in permission: unknownsvc \
             (expected secretmanager or cloudkms)"
        );
    }

    #[test]
    fn placeholder_role_is_only_a_warning() {
        let mut policy = clean_policy();
        policy.add_role("roles/custom.todo", Role::default());

        let result = validate(&policy);
        assert!(result.valid);
        assert_eq!(result.status(), Status::ValidWithWarnings);
        assert_eq!(checks_of(&result), [Check::RoleNoPermissions]);
    }

    #[test]
    fn project_without_bindings_is_a_warning() {
        let mut policy = clean_policy();
        policy.add_project("staging");

        let result = validate(&policy);
        assert!(result.valid);
        assert_eq!(
            result.warnings().next().unwrap().message,
            "Project staging has no bindings"
        );
    }

    #[test]
    fn binding_without_members_is_an_error() {
        let mut policy = clean_policy();
        policy.add_binding("p", Binding::new("roles/viewer", Vec::<String>::new()));

        let result = validate(&policy);
        assert_eq!(checks_of(&result), [Check::BindingNoMembers]);
        assert_eq!(
            result.findings[0].message,
            "Project p binding 1: no members specified"
        );
    }

    #[test]
    fn restricted_services() {
        let mut policy = clean_policy();
        policy.add_role("roles/custom.kms", Role::new(["cloudkms.keys.get"]));

        let validator = Validator::new(ValidatorConfig {
            allowed_services: vec![Service::SecretManager],
        });
        let result = validator.validate(&policy);
        assert_eq!(checks_of(&result), [Check::PermissionService]);
        assert!(validate(&policy).valid);
    }

    #[test]
    fn templates_have_no_findings() {
        for template in Template::ALL {
            let result = validate(&template.build());
            assert!(result.findings.is_empty(), "{template}: {}", result.render());
        }
    }

    #[test]
    fn report_lists_every_problem_in_order() {
        let input = r"
roles:
  custom.dev:
    permissions: [secretmanager.secrets.get]
  roles/custom.empty:
    permissions: []
  roles/custom.kms:
    permissions: [cloudkms.keys, storage.buckets.get]
groups:
  ops:
    members:
      - user:ops@example.com
projects:
  alpha:
    bindings: []
  beta:
    bindings:
      - role: viewer
        members: []
        condition:
          expression: ''
      - role: roles/custom.missing
        members:
          - group:ghost
          - user:bob
          - domain:x.com
          - nobody
          - allUsers
          - group:ops
";
        let result = validate(&parse_str(input).unwrap());
        assert!(!result.valid);
        insta::assert_snapshot!(result.render(), @r"
ERROR: Role name must start with 'roles/': custom.dev
WARNING: Role roles/custom.empty has no permissions
ERROR: Role roles/custom.kms: invalid permission format: cloudkms.keys (expected service.resource.verb)
ERROR: Role roles/custom.kms: unknown service in permission: storage (expected secretmanager or cloudkms)
WARNING: Project alpha has no bindings
ERROR: Project beta binding 0: role must start with 'roles/'
ERROR: Project beta binding 0: no members specified
ERROR: Project beta binding 0: condition has empty expression
ERROR: Project beta binding 1: undefined role roles/custom.missing
ERROR: Project beta binding 1: undefined group: ghost
ERROR: Project beta binding 1: invalid user: bob (expected email format)
ERROR: Project beta binding 1: unknown principal type: domain (expected user, serviceAccount, or group)
ERROR: Project beta binding 1: invalid principal format: nobody (expected type:identifier)
");
        assert_eq!(result.summary(), "invalid: 11 error(s), 2 warning(s)");
    }

    fn principal() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("allUsers".to_string()),
            Just("allAuthenticatedUsers".to_string()),
            Just("user:dev@example.com".to_string()),
            Just("user:dev".to_string()),
            Just("serviceAccount:ci@p.iam.gserviceaccount.com".to_string()),
            Just("group:devs".to_string()),
            Just("group:ghost".to_string()),
            Just("domain:example.com".to_string()),
            Just("nobody".to_string()),
        ]
    }

    fn role_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("roles/custom.reader".to_string()),
            Just("roles/custom.missing".to_string()),
            Just("roles/secretmanager.admin".to_string()),
            Just("custom.dev".to_string()),
            Just(String::new()),
        ]
    }

    fn permission() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("secretmanager.secrets.get".to_string()),
            Just("cloudkms.cryptoKeys.encrypt".to_string()),
            Just("secretmanager.secrets".to_string()),
            Just("unknownsvc.x.y".to_string()),
        ]
    }

    fn binding() -> impl Strategy<Value = Binding> {
        (
            role_name(),
            prop::collection::vec(principal(), 0..4),
            prop::option::of(prop_oneof![Just(String::new()), Just("true".to_string())]),
        )
            .prop_map(|(role, members, expr)| {
                let binding = Binding::new(role, members);
                match expr {
                    Some(expr) => binding.with_condition(Condition::new(expr)),
                    None => binding,
                }
            })
    }

    fn policy() -> impl Strategy<Value = Policy> {
        (
            prop::collection::btree_map(
                role_name(),
                prop::collection::vec(permission(), 0..3),
                0..3,
            ),
            any::<bool>(),
            prop::collection::btree_map(
                "[a-z]{1,6}",
                prop::collection::vec(binding(), 0..3),
                0..3,
            ),
        )
            .prop_map(|(roles, with_group, projects)| {
                let mut policy = Policy::new();
                for (name, permissions) in roles {
                    policy.add_role(name, Role::new(permissions));
                }
                if with_group {
                    policy.add_group("devs", Group::new(["user:dev@example.com"]));
                }
                for (name, bindings) in projects {
                    policy.add_project(name).bindings = bindings;
                }
                policy
            })
    }

    /// Whether some error-level check applies, judged from the strings the
    /// generators above can produce.
    fn has_listed_error(policy: &Policy) -> bool {
        let bad_role_key = policy.roles.keys().any(|name| !name.starts_with("roles/"));
        let bad_permission = policy
            .roles
            .values()
            .flat_map(|role| &role.permissions)
            .any(|perm| perm == "secretmanager.secrets" || perm == "unknownsvc.x.y");
        let has_devs = policy.groups.contains_key("devs");

        let bad_binding = policy.projects.values().flat_map(|p| &p.bindings).any(|b| {
            let bad_role = !b.role.starts_with("roles/")
                || (b.role.starts_with("roles/custom.") && !policy.roles.contains_key(&b.role));
            let bad_member = b.members.iter().any(|m| match m.as_str() {
                "user:dev" | "group:ghost" | "domain:example.com" | "nobody" => true,
                "group:devs" => !has_devs,
                _ => false,
            });
            let empty_condition = b.condition.as_ref().is_some_and(|c| c.expression.is_empty());
            bad_role || b.members.is_empty() || bad_member || empty_condition
        });

        bad_role_key || bad_permission || bad_binding
    }

    proptest! {
        #[test]
        fn validation_is_deterministic(policy in policy()) {
            prop_assert_eq!(validate(&policy), validate(&policy));
        }

        #[test]
        fn invalid_exactly_when_a_listed_error_applies(policy in policy()) {
            let result = validate(&policy);
            prop_assert_eq!(result.valid, !has_listed_error(&policy), "{}", result.render());
            prop_assert_eq!(result.valid, result.error_count() == 0);
        }

        #[test]
        fn warnings_never_change_validity(policy in policy()) {
            let before = validate(&policy).valid;

            let mut with_warnings = policy;
            with_warnings.add_role("roles/custom.zzz-placeholder", Role::default());
            with_warnings.add_project("zzz-empty-project");

            let after = validate(&with_warnings);
            prop_assert_eq!(after.valid, before);
            prop_assert!(after.warning_count() >= 2);
        }

        #[test]
        fn parse_serialize_does_not_change_findings(policy in policy()) {
            let yaml = iam_policy::serialize(&policy).unwrap();
            let reparsed = parse_str(&yaml).unwrap();
            prop_assert_eq!(validate(&reparsed), validate(&policy));
        }
    }
}
