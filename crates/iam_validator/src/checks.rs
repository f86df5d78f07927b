//! Individual validation checks.
//!
//! Each function appends to a [`ValidationResult`] and never stops early.

use crate::result::{Check, Finding, ValidationResult};
use iam_policy::{
    is_custom_role, Binding, Permission, PermissionError, Policy, Principal, PrincipalError, Role,
    Service, ROLE_PREFIX,
};

/// Checks one role definition and its permissions.
pub fn check_role(name: &str, role: &Role, allowed: &[Service], out: &mut ValidationResult) {
    if !name.starts_with(ROLE_PREFIX) {
        out.push(Finding::new(
            Check::RoleNamePrefix,
            format!("Role name must start with '{ROLE_PREFIX}': {name}"),
        ));
    }

    if role.permissions.is_empty() {
        out.push(Finding::new(
            Check::RoleNoPermissions,
            format!("Role {name} has no permissions"),
        ));
    }

    for perm in &role.permissions {
        if let Some((check, reason)) = check_permission(perm, allowed) {
            out.push(Finding::new(check, format!("Role {name}: {reason}")));
        }
    }
}

/// Checks a permission string; at most one problem is reported.
pub fn check_permission(perm: &str, allowed: &[Service]) -> Option<(Check, String)> {
    let service = match Permission::parse(perm) {
        Ok(p) if allowed.contains(&p.service) => return None,
        Ok(p) => p.service.as_str().to_string(),
        Err(e @ PermissionError::Format(_)) => {
            return Some((Check::PermissionFormat, e.to_string()));
        }
        Err(PermissionError::UnknownService(service)) => service,
    };

    let expected: Vec<_> = allowed.iter().map(|s| s.as_str()).collect();
    Some((
        Check::PermissionService,
        format!(
            "unknown service in permission: {service} (expected {})",
            expected.join(" or ")
        ),
    ))
}

/// Checks one binding against the rest of the policy.
///
/// Order within a binding: role prefix, custom role existence, member
/// count, each member in order, condition.
pub fn check_binding(
    policy: &Policy,
    project: &str,
    index: usize,
    binding: &Binding,
    out: &mut ValidationResult,
) {
    let at = |msg: String| format!("Project {project} binding {index}: {msg}");

    if !binding.role.starts_with(ROLE_PREFIX) {
        out.push(Finding::new(
            Check::BindingRolePrefix,
            at(format!("role must start with '{ROLE_PREFIX}'")),
        ));
    }

    // Built-in roles live outside the document and are not checked.
    if is_custom_role(&binding.role) && !policy.roles.contains_key(&binding.role) {
        out.push(Finding::new(
            Check::UndefinedCustomRole,
            at(format!("undefined role {}", binding.role)),
        ));
    }

    if binding.members.is_empty() {
        out.push(Finding::new(
            Check::BindingNoMembers,
            at("no members specified".to_string()),
        ));
    }

    for member in &binding.members {
        if let Some((check, reason)) = check_principal(member, policy) {
            out.push(Finding::new(check, at(reason)));
        }
    }

    if let Some(condition) = &binding.condition {
        if condition.expression.is_empty() {
            out.push(Finding::new(
                Check::EmptyCondition,
                at("condition has empty expression".to_string()),
            ));
        }
    }
}

/// Checks a principal string, including that `group:` members exist.
pub fn check_principal(member: &str, policy: &Policy) -> Option<(Check, String)> {
    match Principal::parse(member) {
        Ok(Principal::Group(name)) if !policy.groups.contains_key(&name) => {
            Some((Check::UndefinedGroup, format!("undefined group: {name}")))
        }
        Ok(_) => None,
        Err(e) => {
            let check = match e {
                PrincipalError::Format(_) => Check::PrincipalFormat,
                PrincipalError::UnknownType(_) => Check::PrincipalType,
                PrincipalError::NotEmail { .. } => Check::PrincipalEmail,
            };
            Some((check, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_policy::{Condition, Group};

    fn errors_of(result: &ValidationResult) -> Vec<Check> {
        result.findings.iter().map(|f| f.check).collect()
    }

    #[test]
    fn permission_checks() {
        let all = Service::ALL;
        assert!(check_permission("secretmanager.secrets.get", &all).is_none());
        assert!(check_permission("cloudkms.cryptoKeys.encrypt", &all).is_none());

        let (check, msg) = check_permission("secretmanager.secrets", &all).unwrap();
        assert_eq!(check, Check::PermissionFormat);
        assert_eq!(
            msg,
            "invalid permission format: secretmanager.secrets (expected service.resource.verb)"
        );

        let (check, msg) = check_permission("unknownsvc.x.y", &all).unwrap();
        assert_eq!(check, Check::PermissionService);
        assert_eq!(
            msg,
            "unknown service in permission: unknownsvc (expected secretmanager or cloudkms)"
        );
    }

    #[test]
    fn restricted_service_list() {
        let only_secrets = [Service::SecretManager];
        let (check, msg) = check_permission("cloudkms.keys.get", &only_secrets).unwrap();
        assert_eq!(check, Check::PermissionService);
        assert!(msg.ends_with("(expected secretmanager)"));
    }

    #[test]
    fn role_without_prefix_and_permissions() {
        let mut out = ValidationResult::new();
        check_role("custom.dev", &Role::default(), &Service::ALL, &mut out);
        assert_eq!(
            errors_of(&out),
            [Check::RoleNamePrefix, Check::RoleNoPermissions]
        );
        assert!(!out.is_valid());
    }

    #[test]
    fn principal_checks() {
        let mut policy = Policy::new();
        policy.add_group("ops", Group::new(["user:ops@example.com"]));

        assert!(check_principal("allUsers", &policy).is_none());
        assert!(check_principal("group:ops", &policy).is_none());
        assert_eq!(
            check_principal("group:ghost", &policy),
            Some((Check::UndefinedGroup, "undefined group: ghost".to_string()))
        );
        assert_eq!(
            check_principal("nobody", &policy).map(|(c, _)| c),
            Some(Check::PrincipalFormat)
        );
        assert_eq!(
            check_principal("domain:example.com", &policy).map(|(c, _)| c),
            Some(Check::PrincipalType)
        );
        assert_eq!(
            check_principal("user:bob", &policy).map(|(c, _)| c),
            Some(Check::PrincipalEmail)
        );
    }

    #[test]
    fn binding_findings_follow_fixed_order() {
        let policy = Policy::new();
        let binding = Binding::new("viewer", ["nobody", "user:x"])
            .with_condition(Condition::new(""));
        let mut out = ValidationResult::new();
        check_binding(&policy, "p", 3, &binding, &mut out);

        assert_eq!(
            errors_of(&out),
            [
                Check::BindingRolePrefix,
                Check::PrincipalFormat,
                Check::PrincipalEmail,
                Check::EmptyCondition,
            ]
        );
        assert_eq!(
            out.findings[0].message,
            "Project p binding 3: role must start with 'roles/'"
        );
    }

    #[test]
    fn empty_role_string_is_prefix_error() {
        let mut out = ValidationResult::new();
        check_binding(&Policy::new(), "p", 0, &Binding::new("", ["allUsers"]), &mut out);
        assert_eq!(errors_of(&out), [Check::BindingRolePrefix]);
    }

    #[test]
    fn builtin_roles_are_not_looked_up() {
        let mut out = ValidationResult::new();
        let binding = Binding::new("roles/secretmanager.admin", ["allAuthenticatedUsers"]);
        check_binding(&Policy::new(), "p", 0, &binding, &mut out);
        assert!(out.findings.is_empty());
    }
}
