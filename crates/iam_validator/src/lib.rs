//! Policy validation for the secret manager and KMS emulators.
//!
//! The validator is the gate between authoring and enforcement: a policy is
//! only handed to the emulators once its [`ValidationResult`] is valid.
//!
//! # Checks Performed
//!
//! - **Roles**: `roles/` prefix, non-empty permission lists, permission
//!   format and service allow-list
//! - **Projects**: at least one binding per project
//! - **Bindings**: role prefix, custom roles defined in the document,
//!   non-empty members, well-formed principals, defined groups, non-empty
//!   condition expressions
//!
//! Every problem is reported; errors make the policy invalid, warnings do
//! not.
//!
//! # Example
//!
//! ```rust
//! use iam_policy::parse_str;
//! use iam_validator::{validate, Check};
//!
//! let input = "projects: {p: {bindings: [{role: roles/custom.x, members: [allUsers]}]}}";
//! let policy = parse_str(input).unwrap();
//! let result = validate(&policy);
//! assert!(!result.valid);
//! assert_eq!(result.errors().next().unwrap().check, Check::UndefinedCustomRole);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod checks;
pub mod result;
pub mod validator;

pub use result::{Check, Finding, Severity, Status, ValidationResult};
pub use validator::{validate, Validator, ValidatorConfig};
