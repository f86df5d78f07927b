//! IAM policy model and YAML codec for the secret manager and KMS emulators.
//!
//! This crate provides:
//! - The typed policy model (roles, groups, projects, bindings, conditions)
//! - Parsing and serialization of `policy.yaml` documents
//! - Typed views of principal and permission strings
//! - Starter templates for new setups
//!
//! Checking that a policy is internally consistent lives in `iam_validator`.
//!
//! # Example
//!
//! ```rust
//! use iam_policy::{parse_str, serialize, Binding, Policy, Role};
//!
//! let mut policy = Policy::new();
//! policy.add_role("roles/custom.reader", Role::new(["secretmanager.secrets.get"]));
//! policy.add_binding(
//!     "test-project",
//!     Binding::new("roles/custom.reader", ["user:dev@example.com"]),
//! );
//!
//! let yaml = serialize(&policy).unwrap();
//! assert_eq!(parse_str(&yaml).unwrap(), policy);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod model;
pub mod parser;
pub mod permission;
pub mod principal;
pub mod template;

pub use error::{Error, Location, PermissionError, PrincipalError, Result};
pub use model::{
    is_custom_role, Binding, Condition, Group, Policy, Project, Role, CUSTOM_ROLE_PREFIX,
    ROLE_PREFIX,
};
pub use parser::{load_from_path, parse, parse_str, save_to_path, serialize};
pub use permission::{Permission, Service};
pub use principal::{Principal, ALL_AUTHENTICATED_USERS, ALL_USERS};
pub use template::Template;
