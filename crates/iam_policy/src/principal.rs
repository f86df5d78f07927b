//! Principal grammar.
//!
//! ```text
//! allUsers
//! allAuthenticatedUsers
//! user:alice@example.com
//! serviceAccount:ci@project.iam.gserviceaccount.com
//! group:platform-admins
//! ```
//!
//! Whether a `group:` principal names a group that exists is a property of
//! the whole document and is checked by the validator, not here.

use crate::error::PrincipalError;
use std::fmt;
use std::str::FromStr;

/// Literal granting access to anyone, authenticated or not.
pub const ALL_USERS: &str = "allUsers";

/// Literal granting access to any authenticated caller.
pub const ALL_AUTHENTICATED_USERS: &str = "allAuthenticatedUsers";

/// A parsed principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// `allUsers`
    AllUsers,
    /// `allAuthenticatedUsers`
    AllAuthenticatedUsers,
    /// `user:<email>`
    User(String),
    /// `serviceAccount:<email>`
    ServiceAccount(String),
    /// `group:<name>`
    Group(String),
}

impl Principal {
    /// Parses a principal string.
    ///
    /// The string is split on the first `:`; everything after it is the
    /// identifier, so identifiers may themselves contain colons.
    ///
    /// # Errors
    ///
    /// Returns a [`PrincipalError`] when the string is not a literal, has no
    /// `:`, names an unknown type, or carries a user/service-account
    /// identifier without an `@`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use iam_policy::Principal;
    ///
    /// let p = Principal::parse("group:admins").unwrap();
    /// assert_eq!(p.group_name(), Some("admins"));
    /// assert!(Principal::parse("user:bob").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PrincipalError> {
        match s {
            ALL_USERS => return Ok(Self::AllUsers),
            ALL_AUTHENTICATED_USERS => return Ok(Self::AllAuthenticatedUsers),
            _ => {}
        }

        let (kind, identifier) = s
            .split_once(':')
            .ok_or_else(|| PrincipalError::Format(s.to_string()))?;

        match kind {
            "user" | "serviceAccount" if !identifier.contains('@') => {
                Err(PrincipalError::NotEmail {
                    kind: kind.to_string(),
                    identifier: identifier.to_string(),
                })
            }
            "user" => Ok(Self::User(identifier.to_string())),
            "serviceAccount" => Ok(Self::ServiceAccount(identifier.to_string())),
            "group" => Ok(Self::Group(identifier.to_string())),
            other => Err(PrincipalError::UnknownType(other.to_string())),
        }
    }

    /// Returns the group name for `group:` principals.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true for the two public literals.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::AllUsers | Self::AllAuthenticatedUsers)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => f.write_str(ALL_USERS),
            Self::AllAuthenticatedUsers => f.write_str(ALL_AUTHENTICATED_USERS),
            Self::User(id) => write!(f, "user:{id}"),
            Self::ServiceAccount(id) => write!(f, "serviceAccount:{id}"),
            Self::Group(name) => write!(f, "group:{name}"),
        }
    }
}
