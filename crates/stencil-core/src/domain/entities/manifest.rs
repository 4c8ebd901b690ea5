//! Module, interface and type-file manifests.
//!
//! These are the validated, deserialised documents. Names are not part of
//! the documents themselves (they come from file names) and are attached
//! after loading.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::schema::Schema;
use crate::domain::error::DomainError;
use crate::domain::value_objects::ManifestKind;

/// Prefix marking a requirement whose connection is optional.
pub const OPTIONAL_REQUIREMENT_PREFIX: &str = "optional:";

// ── Interfaces ───────────────────────────────────────────────────────────────

/// A command of an interface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub arguments: IndexMap<String, Schema>,

    #[serde(default)]
    pub result: Option<Schema>,
}

/// An interface definition file.
///
/// After [`InterfaceChainResolver`](crate::application::services::InterfaceChainResolver)
/// has run, `parent` is `None` and `vars`/`cmds` hold the union of the
/// whole ancestor chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, rename = "parent", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default)]
    pub vars: IndexMap<String, Schema>,

    #[serde(default)]
    pub cmds: IndexMap<String, CommandDefinition>,
}

impl InterfaceDefinition {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Merge an ancestor into this definition. Entries already present
    /// (declared by a descendant) win.
    pub fn absorb_parent(&mut self, parent: InterfaceDefinition) {
        for (key, schema) in parent.vars {
            self.vars.entry(key).or_insert(schema);
        }
        for (key, cmd) in parent.cmds {
            self.cmds.entry(key).or_insert(cmd);
        }
    }
}

// ── Modules ──────────────────────────────────────────────────────────────────

/// An implementation of an interface a module provides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProvidedImplementation {
    pub interface: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub config: IndexMap<String, Schema>,
}

/// A connection to another module's implementation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequiredConnection {
    pub interface: String,

    #[serde(default)]
    pub min_connections: Option<u32>,

    #[serde(default)]
    pub max_connections: Option<u32>,
}

/// A module manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub config: IndexMap<String, Schema>,

    #[serde(default)]
    pub provides: IndexMap<String, ProvidedImplementation>,

    #[serde(default)]
    pub requires: IndexMap<String, RequiredConnection>,
}

impl ModuleManifest {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Every interface this module touches, provided first, without duplicates.
    pub fn referenced_interfaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let all = self
            .provides
            .values()
            .map(|p| p.interface.as_str())
            .chain(self.requires.values().map(|r| r.interface.as_str()));
        for name in all {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

// ── Type files ───────────────────────────────────────────────────────────────

/// A type definition file: one namespace of global types.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeFile {
    #[serde(skip)]
    pub path: PathBuf,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub types: IndexMap<String, Schema>,
}

// ── Validator output ─────────────────────────────────────────────────────────

/// What a [`ManifestValidator`](crate::application::ports::ManifestValidator) returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedManifest {
    Module(ModuleManifest),
    Interface(InterfaceDefinition),
    Types(TypeFile),
}

impl ValidatedManifest {
    pub fn kind(&self) -> ManifestKind {
        match self {
            Self::Module(_) => ManifestKind::Module,
            Self::Interface(_) => ManifestKind::Interface,
            Self::Types(_) => ManifestKind::Types,
        }
    }

    pub fn into_module(self) -> Result<ModuleManifest, DomainError> {
        match self {
            Self::Module(m) => Ok(m),
            other => Err(other.unexpected(ManifestKind::Module)),
        }
    }

    pub fn into_interface(self) -> Result<InterfaceDefinition, DomainError> {
        match self {
            Self::Interface(i) => Ok(i),
            other => Err(other.unexpected(ManifestKind::Interface)),
        }
    }

    pub fn into_types(self) -> Result<TypeFile, DomainError> {
        match self {
            Self::Types(t) => Ok(t),
            other => Err(other.unexpected(ManifestKind::Types)),
        }
    }

    fn unexpected(&self, expected: ManifestKind) -> DomainError {
        DomainError::UnexpectedManifest {
            expected: expected.to_string(),
            found: self.kind().to_string(),
        }
    }
}
