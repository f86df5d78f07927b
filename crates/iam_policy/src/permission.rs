//! Permission grammar: `<service>.<resource>.<verb>`.

use crate::error::PermissionError;
use std::fmt;
use std::str::FromStr;

/// Emulated services that permissions can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    /// Secret Manager (`secretmanager.*`).
    SecretManager,
    /// Cloud KMS (`cloudkms.*`).
    CloudKms,
}

impl Service {
    /// Every known service.
    pub const ALL: [Self; 2] = [Self::SecretManager, Self::CloudKms];

    /// The permission prefix for the service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecretManager => "secretmanager",
            Self::CloudKms => "cloudkms",
        }
    }

    /// Looks a service up by its permission prefix.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    /// Owning service.
    pub service: Service,
    /// Resource path; every segment between the service and the verb.
    pub resource: String,
    /// Final segment (`get`, `create`, `encrypt`, ...).
    pub verb: String,
}

impl Permission {
    /// Parses a permission string.
    ///
    /// The segment count is checked before the service, so a malformed
    /// permission is reported as a format problem even if its service is
    /// also unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Format`] for fewer than three segments and
    /// [`PermissionError::UnknownService`] when the first segment names no
    /// known service.
    pub fn parse(s: &str) -> Result<Self, PermissionError> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 3 {
            return Err(PermissionError::Format(s.to_string()));
        }

        let service = Service::from_name(parts[0])
            .ok_or_else(|| PermissionError::UnknownService(parts[0].to_string()))?;

        let last = parts.len() - 1;
        Ok(Self {
            service,
            resource: parts[1..last].join("."),
            verb: parts[last].to_string(),
        })
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.service, self.resource, self.verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_three_segments() {
        let perm = Permission::parse("secretmanager.secrets.get").unwrap();
        assert_eq!(perm.service, Service::SecretManager);
        assert_eq!(perm.resource, "secrets");
        assert_eq!(perm.verb, "get");
    }

    #[test]
    fn nested_resource_segments() {
        let perm = Permission::parse("cloudkms.cryptoKeyVersions.useToDecrypt").unwrap();
        assert_eq!(perm.service, Service::CloudKms);

        let perm = Permission::parse("secretmanager.versions.secrets.access").unwrap();
        assert_eq!(perm.resource, "versions.secrets");
        assert_eq!(perm.verb, "access");
        assert_eq!(perm.to_string(), "secretmanager.versions.secrets.access");
    }

    #[test]
    fn two_segments_is_format_error() {
        assert_eq!(
            Permission::parse("secretmanager.secrets"),
            Err(PermissionError::Format("secretmanager.secrets".to_string()))
        );
        // format wins over the service check
        assert!(matches!(
            Permission::parse("unknownsvc.x"),
            Err(PermissionError::Format(_))
        ));
    }

    #[test]
    fn unknown_service() {
        assert_eq!(
            Permission::parse("unknownsvc.x.y"),
            Err(PermissionError::UnknownService("unknownsvc".to_string()))
        );
    }

    #[test]
    fn service_lookup() {
        assert_eq!(Service::from_name("cloudkms"), Some(Service::CloudKms));
        assert_eq!(Service::from_name("storage"), None);
    }
}
