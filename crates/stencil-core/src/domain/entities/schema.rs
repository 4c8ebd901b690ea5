//! JSON-schema subset understood by the generator.
//!
//! Manifests embed schemas for variables, command arguments, config entries
//! and type declarations. [`Schema`] is the deserialised form; [`Schema::shape`]
//! classifies it into a closed [`SchemaShape`] so every consumer matches
//! exhaustively instead of probing optional keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::JsonKind;

/// The `type` keyword: a single kind or a union of kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KindSpec {
    Single(JsonKind),
    Union(Vec<JsonKind>),
}

/// A schema as written in a manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindSpec>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Classified view of a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaShape<'a> {
    /// `$ref` to a global type; `expected` is the declared `type`, if any.
    Reference {
        target: &'a str,
        expected: Option<JsonKind>,
    },
    /// A string restricted to a fixed set of values.
    Enum { values: &'a [String] },
    /// `type: [a, b, ...]`.
    Variant { kinds: &'a [JsonKind] },
    Array { items: Option<&'a Schema> },
    /// An inline object. `properties` is `None` for free-form objects.
    Object {
        properties: Option<&'a IndexMap<String, Schema>>,
        required: &'a [String],
    },
    /// string, number, integer, boolean or null.
    Primitive(JsonKind),
}

impl Schema {
    /// Convenience constructor for a schema with a single `type`.
    pub fn of_kind(kind: JsonKind) -> Self {
        Self {
            kind: Some(KindSpec::Single(kind)),
            ..Self::default()
        }
    }

    /// Convenience constructor for a `$ref` schema.
    pub fn reference(kind: JsonKind, target: impl Into<String>) -> Self {
        Self {
            kind: Some(KindSpec::Single(kind)),
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn description_or_default(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    /// Classify this schema. `name` is only used for error messages.
    pub fn shape(&self, name: &str) -> Result<SchemaShape<'_>, DomainError> {
        if let Some(target) = self.reference.as_deref() {
            let expected = match &self.kind {
                None => None,
                Some(KindSpec::Single(kind)) => Some(*kind),
                Some(KindSpec::Union(_)) => {
                    return Err(DomainError::UnsupportedSchema {
                        name: name.to_string(),
                        reason: "a $ref cannot be combined with a union type".into(),
                    });
                }
            };
            return Ok(SchemaShape::Reference { target, expected });
        }

        let kind = match &self.kind {
            Some(KindSpec::Single(kind)) => *kind,
            Some(KindSpec::Union(kinds)) if kinds.is_empty() => {
                return Err(DomainError::UnsupportedSchema {
                    name: name.to_string(),
                    reason: "empty type union".into(),
                });
            }
            Some(KindSpec::Union(kinds)) => return Ok(SchemaShape::Variant { kinds }),
            None => {
                return Err(DomainError::UnsupportedSchema {
                    name: name.to_string(),
                    reason: "schema has neither a 'type' nor a '$ref'".into(),
                });
            }
        };

        Ok(match kind {
            JsonKind::String => match self.enum_values.as_deref() {
                Some(values) => SchemaShape::Enum { values },
                None => SchemaShape::Primitive(JsonKind::String),
            },
            JsonKind::Array => SchemaShape::Array {
                items: self.items.as_deref(),
            },
            JsonKind::Object => SchemaShape::Object {
                properties: self.properties.as_ref(),
                required: &self.required,
            },
            other => SchemaShape::Primitive(other),
        })
    }
}
