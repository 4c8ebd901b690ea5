//! Resolved types: the output of type dependency resolution.

use serde::Serialize;

use crate::domain::entities::type_ref::QualifiedRef;
use crate::domain::value_objects::{JsonKind, TypeKind};

/// Language-agnostic description of a schema, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub name: String,
    /// `None` for variants.
    pub kind: Option<TypeKind>,
    pub is_variant: bool,
    pub variants: Vec<JsonKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<QualifiedRef>,
    /// Name of the enum type for enum values (local or qualified).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<String>,
    /// Name of the object type for object values (local or qualified).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeDescriptor>>,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            is_variant: false,
            variants: Vec::new(),
            reference: None,
            enum_type: None,
            object_type: None,
            items: None,
            description: String::new(),
            required: true,
            format: None,
        }
    }

    pub fn variant(name: impl Into<String>, kinds: &[JsonKind]) -> Self {
        Self {
            kind: None,
            is_variant: true,
            variants: kinds.to_vec(),
            ..Self::new(name, TypeKind::Null)
        }
    }
}

/// A property of an object type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProperty {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,
}

/// A declared type after resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedType {
    pub name: String,
    pub kind: TypeKind,
    pub description: String,
    /// Object properties, required first.
    pub properties: Vec<ResolvedProperty>,
    /// For non-object types: what the type aliases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<TypeDescriptor>,
    /// Names of same-namespace types this type needs declared first.
    pub depends_on: Vec<String>,
}

impl ResolvedType {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            properties: Vec::new(),
            alias_of: None,
            depends_on: Vec::new(),
        }
    }

    /// Record a dependency, ignoring duplicates.
    pub fn add_dependency(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
    }
}

/// An enumeration found anywhere in a namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    /// Display name of the type that declared it.
    pub declared_by: String,
    pub description: String,
    pub values: Vec<String>,
}

/// Resolved types in declaration-safe order: every dependency of
/// `types[i]` that is part of the sequence sits at an index below `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct OrderedTypeSequence(Vec<ResolvedType>);

impl OrderedTypeSequence {
    /// Only the orderer constructs sequences.
    pub(crate) fn from_ordered(types: Vec<ResolvedType>) -> Self {
        Self(types)
    }

    pub fn as_slice(&self) -> &[ResolvedType] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedType> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|t| t.name == name)
    }
}

impl<'a> IntoIterator for &'a OrderedTypeSequence {
    type Item = &'a ResolvedType;
    type IntoIter = std::slice::Iter<'a, ResolvedType>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Everything needed to emit one type namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeNamespace {
    pub namespace: Vec<String>,
    pub description: String,
    pub types: OrderedTypeSequence,
    pub enums: Vec<EnumDefinition>,
    /// Sorted headers of other namespaces this one refers to.
    pub includes: Vec<String>,
}

/// A command with described arguments and result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCommand {
    pub name: String,
    pub description: String,
    pub arguments: Vec<ResolvedProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TypeDescriptor>,
}

/// An interface after chain merging and member description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInterface {
    pub name: String,
    pub description: String,
    pub vars: Vec<ResolvedProperty>,
    pub cmds: Vec<ResolvedCommand>,
    /// Sorted headers of every type namespace the interface uses.
    pub type_headers: Vec<String>,
}

/// An implementation a module provides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedImplementation {
    pub id: String,
    pub interface: String,
    pub description: String,
    pub config: Vec<ResolvedProperty>,
}

/// A connection a module requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequirement {
    /// Id with any `optional:` prefix stripped.
    pub id: String,
    pub optional: bool,
    pub interface: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

/// A module after its config and interfaces were described.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedModule {
    pub name: String,
    pub description: String,
    pub config: Vec<ResolvedProperty>,
    pub provides: Vec<ResolvedImplementation>,
    pub requires: Vec<ResolvedRequirement>,
    pub type_headers: Vec<String>,
}
