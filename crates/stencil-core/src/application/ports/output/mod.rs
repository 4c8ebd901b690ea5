//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::domain::{ManifestKind, ValidatedManifest};
use crate::error::StencilResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> StencilResult<String>;

    /// Write content to a file, creating parent directories.
    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()>;

    /// Last modification time of a file.
    fn modification_time(&self, path: &Path) -> StencilResult<SystemTime>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;

    /// All files below `dir` with the given extension, sorted.
    fn list_files(&self, dir: &Path, extension: &str) -> StencilResult<Vec<PathBuf>>;
}

/// Port for manifest validation.
///
/// Turns raw manifest text into a typed manifest or fails with
/// `ApplicationError::Validation`. `origin` names the source in messages.
pub trait ManifestValidator: Send + Sync {
    fn validate(
        &self,
        kind: ManifestKind,
        raw: &str,
        origin: &Path,
    ) -> StencilResult<ValidatedManifest>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `stencil_adapters::renderer::TeraRenderer`
pub trait TemplateRenderer: Send + Sync {
    /// Render the named template with a serialisable data tree.
    fn render(&self, template: &str, data: &serde_json::Value) -> StencilResult<String>;

    /// Whether a template with this name is available.
    fn has_template(&self, template: &str) -> bool;
}
