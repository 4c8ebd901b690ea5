//! Where manifests live and where generated files go.
//!
//! ```text
//! <root>/
//! ├── modules/<M>/manifest.yaml          module manifest (or manifest.json)
//! ├── interfaces/<I>.yaml                interface definitions (or .json)
//! ├── types/<ns...>.yaml                 type namespaces
//! └── generated/include/generated/
//!     ├── <I>/Implementation.hpp
//!     ├── <I>/Interface.hpp
//!     └── types/<ns...>.hpp
//! ```

use std::path::{Path, PathBuf};

use crate::domain::TYPES_DIR;

pub const MANIFEST_EXTENSIONS: [&str; 2] = ["yaml", "json"];

/// Paths of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.join("modules")
    }

    pub fn interfaces_dir(&self) -> PathBuf {
        self.root.join("interfaces")
    }

    pub fn types_dir(&self) -> PathBuf {
        self.root.join(TYPES_DIR)
    }

    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.modules_dir().join(module)
    }

    /// Candidate manifest paths of a module, in lookup order.
    pub fn module_manifest_candidates(&self, module: &str) -> Vec<PathBuf> {
        let dir = self.module_dir(module);
        MANIFEST_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("manifest.{ext}")))
            .collect()
    }

    /// Candidate definition paths of an interface, in lookup order.
    pub fn interface_candidates(&self, interface: &str) -> Vec<PathBuf> {
        let dir = self.interfaces_dir();
        MANIFEST_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{interface}.{ext}")))
            .collect()
    }

    /// Type file of a `/`-separated namespace.
    pub fn type_file(&self, namespace: &str) -> PathBuf {
        let mut path = self.types_dir();
        for segment in namespace.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.set_extension("yaml");
        path
    }

    pub fn generated_include_dir(&self) -> PathBuf {
        self.root.join("generated").join("include").join("generated")
    }

    pub fn interface_implementation_header(&self, interface: &str) -> PathBuf {
        self.generated_include_dir()
            .join(interface)
            .join("Implementation.hpp")
    }

    pub fn interface_exports_header(&self, interface: &str) -> PathBuf {
        self.generated_include_dir()
            .join(interface)
            .join("Interface.hpp")
    }

    pub fn type_header(&self, namespace: &[String]) -> PathBuf {
        let mut path = self.generated_include_dir().join(TYPES_DIR);
        for segment in namespace {
            path.push(segment);
        }
        path.set_extension("hpp");
        path
    }

    /// `path` relative to the root, for messages.
    pub fn display<'p>(&self, path: &'p Path) -> std::path::Display<'p> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}
