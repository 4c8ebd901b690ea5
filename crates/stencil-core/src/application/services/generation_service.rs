//! Generation Service - main application orchestrator.
//!
//! This service coordinates every generation workflow:
//! 1. Resolve manifests into models
//! 2. Render artifacts with template data
//! 3. Hand the artifacts to the regeneration orchestrator
//!
//! Resolution caches live in a per-call [`ModelResolver`] and are dropped
//! when the call returns.

use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::layout::ProjectLayout;
use crate::application::ports::{Filesystem, ManifestValidator, TemplateRenderer};
use crate::application::services::context::RunContext;
use crate::application::services::model_resolver::{ModelResolver, ModuleModel};
use crate::application::services::regeneration::{
    RegenerationOrchestrator, RunReport, SkippedItem,
};
use crate::application::services::template_data::{TemplateDataBuilder, to_value};
use crate::domain::{
    ArtifactKind, ArtifactSelection, GeneratedArtifact, ModuleManifest, WritePolicy,
};
use crate::error::{Context, StencilResult};

/// Options of a module run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRequest {
    pub name: String,
    pub update: bool,
    pub force: bool,
    pub dry_run: bool,
    /// Comma separated artifact labels; `None` generates everything.
    pub only: Option<String>,
}

/// Options of interface and type header runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub force: bool,
    pub dry_run: bool,
}

/// Main generation service.
pub struct GenerationService {
    layout: ProjectLayout,
    validator: Box<dyn ManifestValidator>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerationService {
    /// Create a new generation service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use stencil_core::application::{GenerationService, ProjectLayout};
    ///
    /// let service = GenerationService::new(
    ///     ProjectLayout::new("."),
    ///     Box::new(validator),  // impl ManifestValidator
    ///     Box::new(renderer),   // impl TemplateRenderer
    ///     Box::new(filesystem), // impl Filesystem
    /// );
    /// ```
    pub fn new(
        layout: ProjectLayout,
        validator: Box<dyn ManifestValidator>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            layout,
            validator,
            renderer,
            filesystem,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Labels accepted by `--only` for a module.
    pub fn module_artifacts(&self, name: &str) -> StencilResult<Vec<String>> {
        let (manifest, _) = ModelResolver::new(self.context()).manifest(name)?;
        Ok(module_labels(&manifest))
    }

    /// Create or update the files of one module.
    #[instrument(
        skip_all,
        fields(module = %request.name, update = request.update, force = request.force)
    )]
    pub fn generate_module(&self, request: &ModuleRequest) -> StencilResult<RunReport> {
        let mut models = ModelResolver::new(self.context());
        let (manifest, _) = models.manifest(&request.name)?;
        let selection = ArtifactSelection::parse(
            request.only.as_deref().unwrap_or_default(),
            &module_labels(&manifest),
        )?;

        let model = models.module(&request.name)?;
        let primary = WritePolicy::primary(request.update, request.force);
        info!(policy = %primary, "Generating module");

        let artifacts = self.module_artifacts_for(&model, primary, &selection)?;
        self.orchestrator(request.dry_run).run(artifacts)
    }

    /// Regenerate interface headers. An empty list means every interface;
    /// in that mode failing interfaces are skipped.
    #[instrument(skip_all, fields(count = names.len(), force = options.force))]
    pub fn generate_interface_headers(
        &self,
        names: &[String],
        options: RunOptions,
    ) -> StencilResult<RunReport> {
        let mut models = ModelResolver::new(self.context());
        let bulk = names.is_empty();
        let names = if bulk {
            models.all_interfaces()?
        } else {
            names.to_vec()
        };
        let policy = WritePolicy::primary(true, options.force);

        let mut artifacts = Vec::new();
        let mut skipped = Vec::new();
        for name in &names {
            let result = models.interface(name).and_then(|model| {
                let data = TemplateDataBuilder::interface(&model.interface);
                let value = to_value(&data, None, &[])?;
                let header = |kind: ArtifactKind, path: PathBuf| {
                    self.artifact(kind, kind.template_name(), path, &value, policy, Some(model.modified))
                };
                Ok(vec![
                    header(
                        ArtifactKind::InterfaceBase,
                        self.layout.interface_implementation_header(name),
                    )?,
                    header(
                        ArtifactKind::InterfaceExports,
                        self.layout.interface_exports_header(name),
                    )?,
                ])
            });
            collect(name, "interface", bulk, result, &mut artifacts, &mut skipped)?;
        }

        let mut report = self.orchestrator(options.dry_run).run(artifacts)?;
        report.skipped = skipped;
        Ok(report)
    }

    /// Regenerate type headers. An empty list means every namespace; in
    /// that mode failing namespaces are skipped.
    #[instrument(skip_all, fields(count = namespaces.len(), force = options.force))]
    pub fn generate_type_headers(
        &self,
        namespaces: &[String],
        options: RunOptions,
    ) -> StencilResult<RunReport> {
        let mut models = ModelResolver::new(self.context());
        let bulk = namespaces.is_empty();
        let namespaces = if bulk {
            models.all_namespaces()?
        } else {
            namespaces.to_vec()
        };
        let policy = WritePolicy::primary(true, options.force);

        let mut artifacts = Vec::new();
        let mut skipped = Vec::new();
        for namespace in &namespaces {
            let result = models.namespace(namespace).and_then(|model| {
                let path = self.layout.type_header(&model.namespace.namespace);
                let value = to_value(&TemplateDataBuilder::types(&model.namespace), None, &[])?;
                Ok(vec![self.artifact(
                    ArtifactKind::TypeHeader,
                    namespace,
                    path,
                    &value,
                    policy,
                    Some(model.modified),
                )?])
            });
            collect(namespace, "type namespace", bulk, result, &mut artifacts, &mut skipped)?;
        }

        let mut report = self.orchestrator(options.dry_run).run(artifacts)?;
        report.skipped = skipped;
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn context(&self) -> RunContext<'_> {
        RunContext::new(&self.layout, &*self.validator, &*self.filesystem)
    }

    fn orchestrator(&self, dry_run: bool) -> RegenerationOrchestrator<'_> {
        RegenerationOrchestrator::new(&*self.filesystem, &self.layout, dry_run)
    }

    fn module_artifacts_for(
        &self,
        model: &ModuleModel,
        primary: WritePolicy,
        selection: &ArtifactSelection,
    ) -> StencilResult<Vec<GeneratedArtifact>> {
        let module = &model.module;
        let dir = self.layout.module_dir(&module.name);
        let data = TemplateDataBuilder::module(module);
        let modified = Some(model.modified);

        let mut artifacts = Vec::new();
        let module_files = [
            (ArtifactKind::CmakeLists, "cmakelists", dir.join("CMakeLists.txt")),
            (ArtifactKind::BindingsHeader, "bindings.hpp", dir.join("bindings.hpp")),
            (ArtifactKind::BindingsSource, "bindings.cpp", dir.join("bindings.cpp")),
            (ArtifactKind::ModuleHeader, "module.hpp", dir.join(format!("{}.hpp", module.name))),
            (ArtifactKind::ModuleSource, "module.cpp", dir.join(format!("{}.cpp", module.name))),
        ];
        for (kind, label, path) in module_files {
            if !selection.includes(label) {
                continue;
            }
            let value = to_value(&data, kind.block_schema(), &[])?;
            artifacts.push(self.artifact(kind, label, path, &value, primary, modified)?);
        }

        for implementation in &data.provides {
            let interface = model.interfaces.get(&implementation.interface);
            let modified = newest(model.modified, interface.map(|i| i.modified));
            let interface_value = match interface {
                Some(interface) => {
                    to_value(&TemplateDataBuilder::interface(&interface.interface), None, &[])?
                }
                None => serde_json::Value::Null,
            };
            let impl_value =
                serde_json::to_value(implementation).context("Serialising implementation data")?;
            let class = &implementation.names.implementation_class;
            let impl_dir = dir.join(&implementation.id);

            let impl_files = [
                (
                    ArtifactKind::ImplHeader,
                    format!("{}.hpp", implementation.id),
                    impl_dir.join(format!("{class}.hpp")),
                ),
                (
                    ArtifactKind::ImplSource,
                    format!("{}.cpp", implementation.id),
                    impl_dir.join(format!("{class}.cpp")),
                ),
            ];
            for (kind, label, path) in impl_files {
                if !selection.includes(&label) {
                    continue;
                }
                let extra = [
                    ("impl", impl_value.clone()),
                    ("interface", interface_value.clone()),
                ];
                let value = to_value(&data, kind.block_schema(), &extra)?;
                artifacts.push(self.artifact(kind, &label, path, &value, primary, Some(modified))?);
            }
        }

        Ok(artifacts)
    }

    fn artifact(
        &self,
        kind: ArtifactKind,
        label: &str,
        path: PathBuf,
        data: &serde_json::Value,
        primary: WritePolicy,
        sources_modified: Option<SystemTime>,
    ) -> StencilResult<GeneratedArtifact> {
        let rendered_content = self
            .renderer
            .render(kind.template_name(), data)
            .map_err(|cause| ApplicationError::ArtifactFailed {
                subject: self.layout.display(&path).to_string(),
                cause: Box::new(cause),
            })?;

        Ok(GeneratedArtifact {
            label: label.to_string(),
            kind,
            path,
            rendered_content,
            write_policy: kind.effective_policy(primary),
            sources_modified,
        })
    }
}

/// Labels of a module's artifacts, in generation order.
fn module_labels(manifest: &ModuleManifest) -> Vec<String> {
    let mut labels: Vec<String> = ["cmakelists", "bindings.hpp", "bindings.cpp", "module.hpp", "module.cpp"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for id in manifest.provides.keys() {
        labels.push(format!("{id}.hpp"));
        labels.push(format!("{id}.cpp"));
    }
    labels
}

fn newest(a: SystemTime, b: Option<SystemTime>) -> SystemTime {
    b.map_or(a, |b| a.max(b))
}

/// Keep an item's artifacts, or skip it in bulk mode.
fn collect(
    name: &str,
    what: &str,
    bulk: bool,
    result: StencilResult<Vec<GeneratedArtifact>>,
    artifacts: &mut Vec<GeneratedArtifact>,
    skipped: &mut Vec<SkippedItem>,
) -> StencilResult<()> {
    match result {
        Ok(generated) => artifacts.extend(generated),
        Err(err) if bulk => {
            warn!("Ignoring {what} {name} with reason: {err}");
            skipped.push(SkippedItem {
                name: name.to_string(),
                reason: err.to_string(),
            });
        }
        Err(err) => return Err(err),
    }
    Ok(())
}
