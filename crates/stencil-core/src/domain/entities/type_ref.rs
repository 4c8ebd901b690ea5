//! Global type references.
//!
//! A reference names a type declared in a type file:
//!
//! ```text
//! /evse/board#/Limits                      root-relative shorthand
//! file:///ws/types/evse/board.yaml#/Limits  explicit path
//! ```
//!
//! Both resolve to namespace `["evse", "board"]` and type `Limits`.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;

/// Directory marker separating the project root from the namespace path.
pub const TYPES_DIR: &str = "types";

const SELECTOR_SEPARATOR: &str = "#/";
const FILE_SCHEME: &str = "file://";
const TYPE_FILE_EXTENSION: &str = "yaml";

/// A parsed global type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// The reference as written in the manifest.
    pub raw: String,
    /// Path of the type file declaring the type.
    pub source_path: PathBuf,
    /// Namespace segments, e.g. `["evse", "board"]`.
    pub namespace: Vec<String>,
    pub type_name: String,
}

/// The render-facing form of a [`TypeRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedRef {
    pub namespace: Vec<String>,
    pub name: String,
    pub qualified: String,
    pub header: String,
}

impl TypeRef {
    /// Parse `reference`. Shorthand references are expanded below `types_dir`.
    pub fn parse(reference: &str, types_dir: &Path) -> Result<Self, DomainError> {
        let malformed = |reason: &str| DomainError::MalformedReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let stripped = reference.strip_prefix(FILE_SCHEME).unwrap_or(reference);
        let (path_part, selector) = stripped
            .split_once(SELECTOR_SEPARATOR)
            .ok_or_else(|| malformed("missing '#/' selector naming the type"))?;

        let type_name = selector
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed("selector does not name a type"))?;

        if path_part.is_empty() {
            return Err(malformed("missing type file path"));
        }

        let markers = Path::new(path_part)
            .components()
            .filter(|c| c.as_os_str() == TYPES_DIR)
            .count();
        if markers > 1 {
            return Err(malformed("the path contains more than one 'types/' directory"));
        }

        let (source_path, namespace) = if markers == 1 {
            let source_path = PathBuf::from(path_part);
            let namespace = namespace_after_marker(&source_path)
                .ok_or_else(|| malformed("no namespace after the 'types/' directory"))?;
            (source_path, namespace)
        } else {
            let relative = path_part
                .strip_prefix('/')
                .ok_or_else(|| malformed("expected '/<namespace>' or a path containing 'types/'"))?;
            let namespace: Vec<String> = relative
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| strip_extension(segment).to_string())
                .collect();
            if namespace.is_empty() {
                return Err(malformed("empty namespace"));
            }
            let mut source_path = types_dir.to_path_buf();
            for segment in &namespace {
                source_path.push(segment);
            }
            source_path.set_extension(TYPE_FILE_EXTENSION);
            (source_path, namespace)
        };

        Ok(Self {
            raw: reference.to_string(),
            source_path,
            namespace,
            type_name: type_name.to_string(),
        })
    }

    /// Namespace as a `/`-joined key, e.g. `evse/board`.
    pub fn namespace_key(&self) -> String {
        self.namespace.join("/")
    }

    /// `types::evse::board::Limits`
    pub fn qualified_name(&self) -> String {
        format!("types::{}::{}", self.namespace.join("::"), self.type_name)
    }

    /// `generated/types/evse/board.hpp`
    pub fn header_path(&self) -> String {
        namespace_header(&self.namespace)
    }

    pub fn qualified(&self) -> QualifiedRef {
        QualifiedRef {
            namespace: self.namespace.clone(),
            name: self.type_name.clone(),
            qualified: self.qualified_name(),
            header: self.header_path(),
        }
    }
}

/// Header generated for a type namespace.
pub fn namespace_header(namespace: &[String]) -> String {
    format!("generated/types/{}.hpp", namespace.join("/"))
}

/// Namespace of a type file, taken from the path below its `types`
/// directory, with the extension of the last segment removed.
///
/// `None` unless the path has exactly one `types` directory.
pub fn namespace_after_marker(path: &Path) -> Option<Vec<String>> {
    let components: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    let mut markers = components.iter().enumerate().filter(|(_, c)| **c == TYPES_DIR);
    let (marker, _) = markers.next()?;
    if markers.next().is_some() {
        return None;
    }
    let rest = &components[marker + 1..];
    let (last, parents) = rest.split_last()?;

    let mut namespace: Vec<String> = parents.iter().map(|s| s.to_string()).collect();
    namespace.push(strip_extension(last).to_string());
    Some(namespace)
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}
