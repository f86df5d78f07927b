//! Typed policy model.
//!
//! A [`Policy`] is the in-memory form of a `policy.yaml` document. Names
//! and principals are kept as the strings the author wrote so that a
//! document survives a parse/serialize round-trip unchanged; use
//! [`crate::Principal`] and [`crate::Permission`] for the typed views.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Prefix every role name must carry.
pub const ROLE_PREFIX: &str = "roles/";

/// Prefix of roles defined inside the policy document itself.
pub const CUSTOM_ROLE_PREFIX: &str = "roles/custom.";

/// Root of an IAM policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Custom roles keyed by role name (`roles/custom.reader`).
    #[serde(default, deserialize_with = "unique_keys")]
    pub roles: BTreeMap<String, Role>,
    /// Groups keyed by bare group name.
    #[serde(default, deserialize_with = "unique_keys")]
    pub groups: BTreeMap<String, Group>,
    /// Projects keyed by bare project name.
    #[serde(default, deserialize_with = "unique_keys")]
    pub projects: BTreeMap<String, Project>,
}

/// A role and the permissions it grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Permission strings (`secretmanager.secrets.get`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
}

/// A named set of principals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Member principal strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
}

/// A project and its role bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Bindings in authoring order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bindings: Vec<Binding>,
}

/// Grants one role to a list of principals, optionally under a condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Role name (`roles/custom.reader` or a built-in role).
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// Principal strings receiving the role.
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
    /// Optional attribute condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// A CEL-style condition attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Boolean expression text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expression: String,
    /// Short human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a keyed section, rejecting a key that appears twice.
///
/// `null` reads as an empty section, like a missing one.
fn unique_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Ok(Option::<UniqueKeys<V>>::deserialize(deserializer)?
        .map(|section| section.0)
        .unwrap_or_default())
}

struct UniqueKeys<V>(BTreeMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueKeys<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(UniqueKeysVisitor(PhantomData))
    }
}

struct UniqueKeysVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeysVisitor<V> {
    type Value = UniqueKeys<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping with unique keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key {key}")));
            }
            let value = access.next_value()?;
            map.insert(key, value);
        }
        Ok(UniqueKeys(map))
    }
}

/// Returns true if `name` refers to a role defined in the document.
pub fn is_custom_role(name: &str) -> bool {
    name.starts_with(CUSTOM_ROLE_PREFIX)
}

impl Policy {
    /// Creates an empty policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a role.
    pub fn add_role(&mut self, name: impl Into<String>, role: Role) {
        self.roles.insert(name.into(), role);
    }

    /// Adds (or replaces) a group.
    pub fn add_group(&mut self, name: impl Into<String>, group: Group) {
        self.groups.insert(name.into(), group);
    }

    /// Ensures a project exists, returning it for further edits.
    pub fn add_project(&mut self, name: impl Into<String>) -> &mut Project {
        self.projects.entry(name.into()).or_default()
    }

    /// Appends a binding to a project, creating the project if needed.
    pub fn add_binding(&mut self, project: impl Into<String>, binding: Binding) {
        self.add_project(project).bindings.push(binding);
    }

    /// Returns true if the policy defines nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.groups.is_empty() && self.projects.is_empty()
    }

    /// Names of roles defined in the document that use the custom prefix.
    pub fn custom_role_names(&self) -> impl Iterator<Item = &str> {
        self.roles
            .keys()
            .map(String::as_str)
            .filter(|name| is_custom_role(name))
    }

    /// Total number of bindings across all projects.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.projects.values().map(|p| p.bindings.len()).sum()
    }

    /// Iterates `(project, index, binding)` in project then authoring order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, usize, &Binding)> {
        self.projects.iter().flat_map(|(name, project)| {
            project
                .bindings
                .iter()
                .enumerate()
                .map(move |(idx, binding)| (name.as_str(), idx, binding))
        })
    }
}

impl Role {
    /// Creates a role granting the given permissions.
    #[must_use]
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

impl Group {
    /// Creates a group with the given members.
    #[must_use]
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

impl Binding {
    /// Creates an unconditional binding.
    #[must_use]
    pub fn new<I, S>(role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            members: members.into_iter().map(Into::into).collect(),
            condition: None,
        }
    }

    /// Attaches a condition to the binding.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Returns true if the bound role is defined in the document.
    #[must_use]
    pub fn uses_custom_role(&self) -> bool {
        is_custom_role(&self.role)
    }
}

impl Condition {
    /// Creates a condition with only an expression.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            title: None,
            description: None,
        }
    }

    /// Adds a title to the condition.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a description to the condition.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
