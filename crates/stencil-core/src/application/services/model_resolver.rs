//! Turns manifests into resolved models for one run.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::SystemTime;
use tracing::debug;

use crate::application::services::context::RunContext;
use crate::application::services::interface_resolver::InterfaceChainResolver;
use crate::application::services::type_resolver::{TypeDependencyResolver, TypeReferenceResolver};
use crate::domain::naming::validate_identifier;
use crate::domain::{
    DomainError, ManifestKind, ModuleManifest, OPTIONAL_REQUIREMENT_PREFIX, ResolvedCommand,
    ResolvedImplementation, ResolvedInterface, ResolvedModule, ResolvedProperty,
    ResolvedRequirement, Schema, TypeNamespace, namespace_after_marker,
};
use crate::error::StencilResult;

/// A resolved interface and the newest modification time of its chain and
/// of the type files it references.
#[derive(Debug, Clone)]
pub struct InterfaceModel {
    pub interface: Rc<ResolvedInterface>,
    pub modified: SystemTime,
}

/// A resolved module with the times its artifacts depend on.
#[derive(Debug, Clone)]
pub struct ModuleModel {
    pub module: ResolvedModule,
    /// Newest of the manifest and the type files its config references.
    pub modified: SystemTime,
    /// Every interface the module provides or requires, by name.
    pub interfaces: HashMap<String, InterfaceModel>,
}

/// A resolved type namespace and the newest modification time of its file
/// and the type files it references.
#[derive(Debug, Clone)]
pub struct NamespaceModel {
    pub namespace: TypeNamespace,
    pub modified: SystemTime,
}

/// Per-run resolution of modules, interfaces and type namespaces.
pub struct ModelResolver<'a> {
    ctx: RunContext<'a>,
    refs: TypeReferenceResolver<'a>,
    interfaces: HashMap<String, InterfaceModel>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(ctx: RunContext<'a>) -> Self {
        Self {
            ctx,
            refs: TypeReferenceResolver::new(ctx),
            interfaces: HashMap::new(),
        }
    }

    /// Load a module manifest without resolving anything it references.
    pub fn manifest(&self, name: &str) -> StencilResult<(ModuleManifest, SystemTime)> {
        validate_identifier(name, "module name")?;
        let path = self.ctx.locate(
            ManifestKind::Module,
            name,
            self.ctx.layout.module_manifest_candidates(name),
        )?;
        let manifest = self
            .ctx
            .load(ManifestKind::Module, &path)?
            .into_module()?
            .with_name(name);
        Ok((manifest, self.ctx.modified(&path)?))
    }

    pub fn interface(&mut self, name: &str) -> StencilResult<InterfaceModel> {
        if let Some(model) = self.interfaces.get(name) {
            return Ok(model.clone());
        }

        validate_identifier(name, "interface name")?;
        let loaded = InterfaceChainResolver::new(self.ctx).load(name)?;
        let definition = loaded.definition;
        let outer = self.refs.take_newest();

        let mut headers = BTreeSet::new();
        let mut deps = TypeDependencyResolver::new(&mut self.refs);
        let vars = deps.describe_members(name, &definition.vars, &mut headers)?;

        let mut cmds = Vec::with_capacity(definition.cmds.len());
        for (cmd_name, cmd) in &definition.cmds {
            validate_identifier(cmd_name, &format!("command of '{name}'"))?;
            let owner = format!("{name}.{cmd_name}");
            let arguments = deps.describe_members(&owner, &cmd.arguments, &mut headers)?;
            let result = cmd
                .result
                .as_ref()
                .map(|schema| deps.describe_one(&owner, "result", schema, &mut headers))
                .transpose()?;
            cmds.push(ResolvedCommand {
                name: cmd_name.clone(),
                description: cmd.description.clone(),
                arguments,
                result,
            });
        }

        let types_modified = self.refs.take_newest();
        self.refs.note_newest(outer);

        debug!(interface = name, chain = ?loaded.chain, "Interface resolved");
        let model = InterfaceModel {
            interface: Rc::new(ResolvedInterface {
                name: name.to_string(),
                description: definition.description,
                vars,
                cmds,
                type_headers: headers.into_iter().collect(),
            }),
            modified: loaded.modified.max(types_modified.unwrap_or(loaded.modified)),
        };
        self.interfaces.insert(name.to_string(), model.clone());
        Ok(model)
    }

    pub fn module(&mut self, name: &str) -> StencilResult<ModuleModel> {
        let (manifest, manifest_modified) = self.manifest(name)?;
        let outer = self.refs.take_newest();

        let mut headers = BTreeSet::new();
        let config = self.config(name, &manifest.config, &mut headers)?;
        let mut interfaces = HashMap::new();

        let mut provides = Vec::with_capacity(manifest.provides.len());
        for (id, provided) in &manifest.provides {
            validate_identifier(id, &format!("implementation of '{name}'"))?;
            let interface = self.interface(&provided.interface)?;
            headers.extend(interface.interface.type_headers.iter().cloned());
            interfaces.insert(provided.interface.clone(), interface);

            provides.push(ResolvedImplementation {
                id: id.clone(),
                interface: provided.interface.clone(),
                description: provided.description.clone(),
                config: self.config(&format!("{name}.{id}"), &provided.config, &mut headers)?,
            });
        }

        let mut requires = Vec::with_capacity(manifest.requires.len());
        for (raw_id, required) in &manifest.requires {
            let (id, prefixed) = match raw_id.strip_prefix(OPTIONAL_REQUIREMENT_PREFIX) {
                Some(id) => (id, true),
                None => (raw_id.as_str(), false),
            };
            validate_identifier(id, &format!("requirement of '{name}'"))?;
            let interface = self.interface(&required.interface)?;
            interfaces.insert(required.interface.clone(), interface);

            let min_connections = required.min_connections.unwrap_or(1);
            requires.push(ResolvedRequirement {
                id: id.to_string(),
                optional: prefixed || min_connections == 0,
                interface: required.interface.clone(),
                min_connections,
                max_connections: required.max_connections.unwrap_or(1),
            });
        }

        let config_types_modified = self.refs.take_newest();
        self.refs.note_newest(outer);

        Ok(ModuleModel {
            module: ResolvedModule {
                name: name.to_string(),
                description: manifest.description,
                config,
                provides,
                requires,
                type_headers: headers.into_iter().collect(),
            },
            modified: manifest_modified.max(config_types_modified.unwrap_or(manifest_modified)),
            interfaces,
        })
    }

    /// Resolve the type namespace `namespace` (`/`-separated).
    pub fn namespace(&mut self, namespace: &str) -> StencilResult<NamespaceModel> {
        let path = self.ctx.locate(
            ManifestKind::Types,
            namespace,
            vec![self.ctx.layout.type_file(namespace)],
        )?;
        let file = self.refs.type_file(&path)?;
        let outer = self.refs.take_newest();
        let resolved = TypeDependencyResolver::new(&mut self.refs).resolve_namespace(&file)?;
        let referenced = self.refs.take_newest();
        self.refs.note_newest(outer);

        let modified = self.ctx.modified(&path)?;
        Ok(NamespaceModel {
            namespace: resolved,
            modified: modified.max(referenced.unwrap_or(modified)),
        })
    }

    /// Every type namespace in the project, sorted.
    pub fn all_namespaces(&self) -> StencilResult<Vec<String>> {
        let files: Vec<PathBuf> = self
            .ctx
            .filesystem
            .list_files(&self.ctx.layout.types_dir(), "yaml")?;
        let mut namespaces = Vec::with_capacity(files.len());
        for path in files {
            let namespace =
                namespace_after_marker(&path).ok_or_else(|| DomainError::MalformedReference {
                    reference: path.display().to_string(),
                    reason: "type file is not below a 'types/' directory".into(),
                })?;
            namespaces.push(namespace.join("/"));
        }
        namespaces.sort();
        Ok(namespaces)
    }

    pub fn all_interfaces(&self) -> StencilResult<Vec<String>> {
        InterfaceChainResolver::new(self.ctx).all_names()
    }

    /// Module and implementation config: required unless a default is given.
    fn config(
        &mut self,
        owner: &str,
        entries: &IndexMap<String, Schema>,
        headers: &mut BTreeSet<String>,
    ) -> StencilResult<Vec<ResolvedProperty>> {
        let mut described =
            TypeDependencyResolver::new(&mut self.refs).describe_members(owner, entries, headers)?;
        for (property, (_, schema)) in described.iter_mut().zip(entries) {
            property.descriptor.required = schema.default.is_none();
        }
        Ok(described)
    }
}
