//! Domain value objects: JsonKind, TypeKind, WritePolicy, ManifestKind.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! This file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── JsonKind ─────────────────────────────────────────────────────────────────

/// A primitive JSON-schema `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TypeKind ─────────────────────────────────────────────────────────────────

/// The kind of a resolved type.
///
/// Differs from [`JsonKind`] by `Enum`: a string schema carrying an `enum`
/// list is its own kind once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Enum,
}

impl TypeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Enum => "enum",
        }
    }

    /// The JSON kind a value of this type has on the wire.
    pub const fn json_kind(self) -> JsonKind {
        match self {
            Self::Object => JsonKind::Object,
            Self::Array => JsonKind::Array,
            Self::String | Self::Enum => JsonKind::String,
            Self::Number => JsonKind::Number,
            Self::Integer => JsonKind::Integer,
            Self::Boolean => JsonKind::Boolean,
            Self::Null => JsonKind::Null,
        }
    }

    /// Whether a reference expecting `expected` may point at a type of this kind.
    pub fn satisfies(self, expected: JsonKind) -> bool {
        self.json_kind() == expected
    }
}

impl From<JsonKind> for TypeKind {
    fn from(kind: JsonKind) -> Self {
        match kind {
            JsonKind::Null => Self::Null,
            JsonKind::Boolean => Self::Boolean,
            JsonKind::Integer => Self::Integer,
            JsonKind::Number => Self::Number,
            JsonKind::String => Self::String,
            JsonKind::Array => Self::Array,
            JsonKind::Object => Self::Object,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── WritePolicy ──────────────────────────────────────────────────────────────

/// How an artifact may be written when regenerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Fail if the target exists.
    Create,
    /// Overwrite unconditionally, discarding custom blocks.
    ForceCreate,
    /// Merge into the existing file unless it is newer than its sources.
    Update,
    /// Merge regardless of staleness or a missing target.
    ForceUpdate,
    /// Write only when the target is absent.
    UpdateIfNonExistent,
}

impl WritePolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::ForceCreate => "force-create",
            Self::Update => "update",
            Self::ForceUpdate => "force-update",
            Self::UpdateIfNonExistent => "update-if-non-existent",
        }
    }

    /// The policy a `create`/`update` run uses, depending on `--force`.
    pub const fn primary(update: bool, force: bool) -> Self {
        match (update, force) {
            (false, false) => Self::Create,
            (false, true) => Self::ForceCreate,
            (true, false) => Self::Update,
            (true, true) => Self::ForceUpdate,
        }
    }

    pub const fn is_update(self) -> bool {
        matches!(
            self,
            Self::Update | Self::ForceUpdate | Self::UpdateIfNonExistent
        )
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "force-create" => Ok(Self::ForceCreate),
            "update" => Ok(Self::Update),
            "force-update" => Ok(Self::ForceUpdate),
            "update-if-non-existent" => Ok(Self::UpdateIfNonExistent),
            other => Err(DomainError::InvalidIdentifier {
                name: other.to_string(),
                context: "write policy".into(),
                reason: "expected create, force-create, update, force-update or update-if-non-existent"
                    .into(),
            }),
        }
    }
}

// ── ManifestKind ─────────────────────────────────────────────────────────────

/// Which manifest schema a raw document is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Module,
    Interface,
    Types,
}

impl ManifestKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Interface => "interface",
            Self::Types => "types",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_kind_travels_as_string() {
        assert!(TypeKind::Enum.satisfies(JsonKind::String));
        assert!(TypeKind::String.satisfies(JsonKind::String));
        assert!(!TypeKind::Enum.satisfies(JsonKind::Object));
        assert!(!TypeKind::Integer.satisfies(JsonKind::Number));
    }

    #[test]
    fn write_policy_round_trips_through_str() {
        for policy in [
            WritePolicy::Create,
            WritePolicy::ForceCreate,
            WritePolicy::Update,
            WritePolicy::ForceUpdate,
            WritePolicy::UpdateIfNonExistent,
        ] {
            assert_eq!(policy.as_str().parse::<WritePolicy>().unwrap(), policy);
        }
        assert!("overwrite".parse::<WritePolicy>().is_err());
    }

    #[test]
    fn primary_policy_follows_flags() {
        assert_eq!(WritePolicy::primary(false, false), WritePolicy::Create);
        assert_eq!(WritePolicy::primary(true, true), WritePolicy::ForceUpdate);
        assert!(WritePolicy::UpdateIfNonExistent.is_update());
        assert!(!WritePolicy::ForceCreate.is_update());
    }
}
