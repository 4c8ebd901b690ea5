//! Application layer errors.
//!
//! These errors represent failures in orchestration, not pure logic.
//! Logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{ManifestKind, WritePolicy};
use crate::error::{ErrorCategory, StencilError};

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A manifest did not pass validation.
    #[error("Validation of {origin} failed: {reason}")]
    Validation { origin: String, reason: String },

    /// No manifest file exists for the requested name.
    #[error("No {kind} manifest named '{name}' (looked for {})", display_paths(searched))]
    ManifestNotFound {
        kind: ManifestKind,
        name: String,
        searched: Vec<PathBuf>,
    },

    /// Template rendering failed.
    #[error("Rendering template '{template}' failed: {reason}")]
    RenderingFailed { template: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The write policy forbids writing an artifact.
    #[error("Write policy '{policy}' refuses {path}: {reason}")]
    WritePolicyViolation {
        path: PathBuf,
        policy: WritePolicy,
        reason: String,
    },

    /// An interface (or one of its ancestors) could not be loaded.
    #[error("{}: {cause}", interface_context(interface, descendant.as_deref()))]
    InterfaceLoad {
        interface: String,
        descendant: Option<String>,
        cause: Box<StencilError>,
    },

    /// Generating one artifact or namespace failed.
    #[error("Failed to generate {subject}: {cause}")]
    ArtifactFailed {
        subject: String,
        cause: Box<StencilError>,
    },

    /// A write failed after other artifacts were already written.
    #[error("Run aborted after writing {} artifact(s): {cause}", written.len())]
    RunAborted {
        written: Vec<PathBuf>,
        cause: Box<StencilError>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn interface_context(interface: &str, descendant: Option<&str>) -> String {
    match descendant {
        Some(descendant) => format!(
            "Failed to load parent interface definition file {interface} for interface {descendant}"
        ),
        None => format!("Failed to load interface definition file {interface}"),
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation { origin, .. } => vec![
                format!("Fix the manifest at {origin}"),
                "Check indentation and key names against the documentation".into(),
            ],
            Self::ManifestNotFound { kind, searched, .. } => vec![
                format!("Create the {kind} manifest at {}", display_paths(searched)),
                "Or pass the project root with --root".into(),
            ],
            Self::RenderingFailed { template, .. } => vec![
                format!("Check template '{template}' if you override templates with --templates"),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read/write permissions".into(),
            ],
            Self::WritePolicyViolation { policy, .. } => match policy {
                WritePolicy::Create => vec![
                    "Use 'update' to merge into existing files".into(),
                    "Use --force to overwrite (discards custom code)".into(),
                ],
                WritePolicy::Update => vec![
                    "Run 'create' first to scaffold the module".into(),
                    "Or use --force to update regardless".into(),
                ],
                _ => vec!["Check the error details above".into()],
            },
            Self::InterfaceLoad { cause, .. }
            | Self::ArtifactFailed { cause, .. } => cause.suggestions(),
            Self::RunAborted { written, cause } => {
                let mut suggestions = cause.suggestions();
                if !written.is_empty() {
                    suggestions.push(format!(
                        "{} file(s) were written before the failure; inspect them before rerunning",
                        written.len()
                    ));
                }
                suggestions
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::ManifestNotFound { .. } => ErrorCategory::NotFound,
            Self::RenderingFailed { .. } | Self::FilesystemError { .. } => ErrorCategory::Internal,
            Self::WritePolicyViolation { .. } => ErrorCategory::Conflict,
            Self::InterfaceLoad { cause, .. }
            | Self::ArtifactFailed { cause, .. }
            | Self::RunAborted { cause, .. } => cause.category(),
        }
    }

    /// The innermost error, skipping context wrappers.
    pub fn root_cause(&self) -> Option<&StencilError> {
        match self {
            Self::InterfaceLoad { cause, .. }
            | Self::ArtifactFailed { cause, .. }
            | Self::RunAborted { cause, .. } => Some(cause.root_cause()),
            _ => None,
        }
    }
}
