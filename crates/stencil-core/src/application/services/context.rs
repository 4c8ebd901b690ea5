//! Per-run context shared by the resolvers.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::application::ApplicationError;
use crate::application::layout::ProjectLayout;
use crate::application::ports::{Filesystem, ManifestValidator};
use crate::domain::{ManifestKind, ValidatedManifest};
use crate::error::StencilResult;

/// Borrowed collaborators of one generation run.
///
/// Created per run and dropped with it; caches built on top of it never
/// outlive the run.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub layout: &'a ProjectLayout,
    pub validator: &'a dyn ManifestValidator,
    pub filesystem: &'a dyn Filesystem,
}

impl<'a> RunContext<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        validator: &'a dyn ManifestValidator,
        filesystem: &'a dyn Filesystem,
    ) -> Self {
        Self {
            layout,
            validator,
            filesystem,
        }
    }

    /// Read and validate a manifest file.
    pub fn load(&self, kind: ManifestKind, path: &Path) -> StencilResult<ValidatedManifest> {
        let raw = self.filesystem.read_to_string(path)?;
        self.validator.validate(kind, &raw, path)
    }

    pub fn modified(&self, path: &Path) -> StencilResult<SystemTime> {
        self.filesystem.modification_time(path)
    }

    /// First existing candidate, or `ManifestNotFound`.
    pub fn locate(
        &self,
        kind: ManifestKind,
        name: &str,
        candidates: Vec<PathBuf>,
    ) -> StencilResult<PathBuf> {
        match candidates.iter().find(|p| self.filesystem.exists(p)) {
            Some(path) => Ok(path.clone()),
            None => Err(ApplicationError::ManifestNotFound {
                kind,
                name: name.to_string(),
                searched: candidates,
            }
            .into()),
        }
    }
}
