//! Manifest validation through serde.
//!
//! YAML and JSON manifests are deserialised into the typed manifests of
//! `stencil-core`; the origin's extension picks the parser. Structural
//! checks that serde cannot express are applied afterwards.

use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

use stencil_core::{
    application::{ApplicationError, ports::ManifestValidator},
    domain::{InterfaceDefinition, ManifestKind, ModuleManifest, TypeFile, ValidatedManifest},
    error::StencilResult,
};

/// Validator backed by `serde_yaml` and `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeValidator;

impl SerdeValidator {
    pub fn new() -> Self {
        Self
    }

    fn parse<T: DeserializeOwned>(&self, raw: &str, origin: &Path) -> StencilResult<T> {
        let is_json = origin.extension().is_some_and(|e| e == "json");
        let parsed = if is_json {
            serde_json::from_str(raw).map_err(|e| e.to_string())
        } else if raw.trim().is_empty() {
            // An empty YAML document is an empty mapping.
            serde_yaml::from_str("{}").map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(raw).map_err(|e| e.to_string())
        };
        parsed.map_err(|reason| invalid(origin, reason).into())
    }
}

impl ManifestValidator for SerdeValidator {
    fn validate(
        &self,
        kind: ManifestKind,
        raw: &str,
        origin: &Path,
    ) -> StencilResult<ValidatedManifest> {
        debug!(origin = %origin.display(), %kind, "Validating manifest");
        match kind {
            ManifestKind::Module => {
                let manifest: ModuleManifest = self.parse(raw, origin)?;
                check_module(&manifest, origin)?;
                Ok(ValidatedManifest::Module(manifest))
            }
            ManifestKind::Interface => {
                let definition: InterfaceDefinition = self.parse(raw, origin)?;
                if definition.parent.as_deref().is_some_and(str::is_empty) {
                    return Err(invalid(origin, "'parent' must not be empty".into()).into());
                }
                Ok(ValidatedManifest::Interface(definition))
            }
            ManifestKind::Types => {
                let file: TypeFile = self.parse(raw, origin)?;
                Ok(ValidatedManifest::Types(file))
            }
        }
    }
}

fn check_module(manifest: &ModuleManifest, origin: &Path) -> Result<(), ApplicationError> {
    for (id, provided) in &manifest.provides {
        if provided.interface.is_empty() {
            return Err(invalid(origin, format!("implementation '{id}' names no interface")));
        }
    }
    for (id, required) in &manifest.requires {
        if required.interface.is_empty() {
            return Err(invalid(origin, format!("requirement '{id}' names no interface")));
        }
        if let (Some(min), Some(max)) = (required.min_connections, required.max_connections) {
            if min > max {
                return Err(invalid(
                    origin,
                    format!("requirement '{id}' has min_connections {min} > max_connections {max}"),
                ));
            }
        }
    }
    Ok(())
}

fn invalid(origin: &Path, reason: String) -> ApplicationError {
    ApplicationError::Validation {
        origin: origin.display().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::domain::{JsonKind, KindSpec};

    #[test]
    fn yaml_module_manifest() {
        let raw = r#"
description: Charging logic
config:
  max_current:
    type: number
    default: 32
provides:
  main:
    interface: evse_manager
requires:
  optional:meter:
    interface: powermeter
    min_connections: 0
"#;
        let manifest = SerdeValidator::new()
            .validate(ManifestKind::Module, raw, Path::new("modules/E/manifest.yaml"))
            .unwrap()
            .into_module()
            .unwrap();

        assert_eq!(manifest.description, "Charging logic");
        assert_eq!(manifest.provides["main"].interface, "evse_manager");
        assert_eq!(manifest.requires["optional:meter"].min_connections, Some(0));
        assert_eq!(
            manifest.config["max_current"].kind,
            Some(KindSpec::Single(JsonKind::Number))
        );
    }

    #[test]
    fn json_interface_with_union_kind() {
        let raw = r#"{"vars": {"value": {"type": ["string", "integer"]}}, "parent": "base"}"#;
        let definition = SerdeValidator::new()
            .validate(ManifestKind::Interface, raw, Path::new("interfaces/x.json"))
            .unwrap()
            .into_interface()
            .unwrap();

        assert_eq!(definition.parent.as_deref(), Some("base"));
        assert_eq!(
            definition.vars["value"].kind,
            Some(KindSpec::Union(vec![JsonKind::String, JsonKind::Integer]))
        );
    }

    #[test]
    fn empty_yaml_is_an_empty_manifest() {
        let file = SerdeValidator::new()
            .validate(ManifestKind::Types, "", Path::new("types/empty.yaml"))
            .unwrap()
            .into_types()
            .unwrap();
        assert!(file.types.is_empty());
    }

    #[test]
    fn syntax_errors_name_the_origin() {
        let err = SerdeValidator::new()
            .validate(ManifestKind::Types, "types: [", Path::new("types/bad.yaml"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Validation of types/bad.yaml failed"));
    }

    #[test]
    fn connection_bounds_are_checked() {
        let raw = "requires:\n  meter:\n    interface: powermeter\n    min_connections: 3\n    max_connections: 1\n";
        let err = SerdeValidator::new()
            .validate(ManifestKind::Module, raw, Path::new("manifest.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("min_connections 3 > max_connections 1"));
    }
}
