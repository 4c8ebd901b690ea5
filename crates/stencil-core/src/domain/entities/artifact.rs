//! Generated artifacts and their per-kind regeneration rules.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::domain::blocks;
use crate::domain::entities::block::BlockSchema;
use crate::domain::error::DomainError;
use crate::domain::value_objects::WritePolicy;

/// Keyword of `--only` that lists the artifacts instead of generating them.
pub const WHICH_FILTER: &str = "which";

/// The kind of file an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    CmakeLists,
    BindingsHeader,
    BindingsSource,
    ModuleHeader,
    ModuleSource,
    ImplHeader,
    ImplSource,
    InterfaceBase,
    InterfaceExports,
    TypeHeader,
}

impl ArtifactKind {
    /// Name of the template rendering this kind.
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::CmakeLists => "CMakeLists.txt",
            Self::BindingsHeader => "bindings.hpp",
            Self::BindingsSource => "bindings.cpp",
            Self::ModuleHeader => "module.hpp",
            Self::ModuleSource => "module.cpp",
            Self::ImplHeader => "interface-impl.hpp",
            Self::ImplSource => "interface-impl.cpp",
            Self::InterfaceBase => "interface-base.hpp",
            Self::InterfaceExports => "interface-exports.hpp",
            Self::TypeHeader => "types.hpp",
        }
    }

    /// Custom blocks of this kind, if it has any.
    pub fn block_schema(self) -> Option<&'static BlockSchema> {
        match self {
            Self::CmakeLists => Some(blocks::cmake()),
            Self::ModuleHeader => Some(blocks::module_header()),
            Self::ImplHeader => Some(blocks::impl_header()),
            _ => None,
        }
    }

    /// Whether `update` refuses to run when the file does not exist yet.
    pub const fn requires_prior_scaffolding(self) -> bool {
        matches!(self, Self::CmakeLists | Self::ModuleHeader)
    }

    /// The policy used for this kind during a run with `primary` policy.
    ///
    /// Sources are hand-written after the first generation and are only
    /// ever written while they do not exist.
    pub const fn effective_policy(self, primary: WritePolicy) -> WritePolicy {
        match self {
            Self::ModuleSource | Self::ImplSource if primary.is_update() => {
                WritePolicy::UpdateIfNonExistent
            }
            _ => primary,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

/// One file produced by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    /// Label used by `--only`, e.g. `module.hpp` or `main.cpp`.
    pub label: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub rendered_content: String,
    pub write_policy: WritePolicy,
    /// Newest modification time of the manifests the artifact was generated from.
    pub sources_modified: Option<SystemTime>,
}

/// Which artifacts a run should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSelection {
    All,
    Only(Vec<String>),
}

impl ArtifactSelection {
    /// Parse a comma separated filter against the available labels.
    pub fn parse(filter: &str, available: &[String]) -> Result<Self, DomainError> {
        let requested: Vec<String> = filter
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();

        if requested.is_empty() {
            return Ok(Self::All);
        }

        let unknown: Vec<String> = requested
            .iter()
            .filter(|label| !available.contains(label))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(DomainError::UnknownArtifactFilter {
                unknown,
                available: available.to_vec(),
            });
        }

        Ok(Self::Only(requested))
    }

    pub fn includes(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.iter().any(|l| l == label),
        }
    }
}
