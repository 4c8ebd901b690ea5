//! Test doubles for the output ports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, ManifestValidator, TemplateRenderer};
use crate::domain::{ManifestKind, ValidatedManifest};
use crate::error::StencilResult;

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, (String, u64)>,
    clock: u64,
}

/// In-memory filesystem whose modification times come from a counter.
#[derive(Default)]
pub struct FakeFilesystem {
    state: Mutex<State>,
}

impl FakeFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.put(path, content);
        self
    }

    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;
        state
            .files
            .insert(path.as_ref().to_path_buf(), (content.to_string(), tick));
    }

    /// Bump a file's modification time without changing it.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;
        if let Some(entry) = state.files.get_mut(path.as_ref()) {
            entry.1 = tick;
        }
    }

    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.files.get(path.as_ref()).map(|(c, _)| c.clone())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }
}

impl Filesystem for FakeFilesystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path) || state.files.keys().any(|p| p.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> StencilResult<String> {
        self.content(path).ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "not found".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()> {
        self.put(path, content);
        Ok(())
    }

    fn modification_time(&self, path: &Path) -> StencilResult<SystemTime> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(path)
            .map(|(_, tick)| UNIX_EPOCH + Duration::from_secs(*tick))
            .ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "not found".into(),
                }
                .into()
            })
    }

    fn create_dir_all(&self, _path: &Path) -> StencilResult<()> {
        Ok(())
    }

    fn list_files(&self, dir: &Path, extension: &str) -> StencilResult<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .filter(|p| p.extension().is_some_and(|e| e == extension))
            .cloned()
            .collect())
    }
}

/// Validator accepting JSON manifests through serde only.
pub struct JsonValidator;

impl ManifestValidator for JsonValidator {
    fn validate(
        &self,
        kind: ManifestKind,
        raw: &str,
        origin: &Path,
    ) -> StencilResult<ValidatedManifest> {
        let invalid = |e: serde_json::Error| ApplicationError::Validation {
            origin: origin.display().to_string(),
            reason: e.to_string(),
        };
        Ok(match kind {
            ManifestKind::Module => {
                ValidatedManifest::Module(serde_json::from_str(raw).map_err(invalid)?)
            }
            ManifestKind::Interface => {
                ValidatedManifest::Interface(serde_json::from_str(raw).map_err(invalid)?)
            }
            ManifestKind::Types => {
                ValidatedManifest::Types(serde_json::from_str(raw).map_err(invalid)?)
            }
        })
    }
}

/// Renders a template as its name, its block slots and its data.
///
/// Block slots are emitted as `tag`, `content`, `tag` so merging works
/// exactly like with real templates.
pub struct EchoRenderer;

impl TemplateRenderer for EchoRenderer {
    fn render(&self, template: &str, data: &serde_json::Value) -> StencilResult<String> {
        let mut out = format!("// {template}\n");
        if let Some(blocks) = data.get("blocks").and_then(|b| b.as_object()) {
            for slot in blocks.values() {
                let tag = slot["tag"].as_str().unwrap_or_default();
                let content = slot["content"].as_str().unwrap_or_default();
                out.push_str(&format!("{tag}\n{content}{tag}\n"));
            }
        }
        let mut data = data.clone();
        if let Some(map) = data.as_object_mut() {
            map.remove("blocks");
        }
        out.push_str(&format!("// data: {data}\n"));
        Ok(out)
    }

    fn has_template(&self, _template: &str) -> bool {
        true
    }
}
