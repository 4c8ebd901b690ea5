//! Interface inheritance.

use std::time::SystemTime;
use tracing::debug;

use crate::application::ApplicationError;
use crate::application::services::context::RunContext;
use crate::domain::{DomainError, InterfaceDefinition, ManifestKind};
use crate::error::{StencilError, StencilResult};

/// An interface with its whole ancestor chain merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedInterface {
    pub definition: InterfaceDefinition,
    /// Newest modification time over the chain.
    pub modified: SystemTime,
    /// The interface followed by its ancestors, nearest first.
    pub chain: Vec<String>,
}

/// Loads interfaces and folds their parents into them.
pub struct InterfaceChainResolver<'a> {
    ctx: RunContext<'a>,
}

impl<'a> InterfaceChainResolver<'a> {
    pub fn new(ctx: RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// Load `name` and merge every ancestor into it (descendants win).
    pub fn load(&self, name: &str) -> StencilResult<LoadedInterface> {
        let (mut definition, mut modified) =
            self.load_single(name).map_err(|cause| wrap(name, None, cause))?;

        let mut chain = vec![name.to_string()];
        let mut next = definition.parent.take();

        while let Some(parent) = next {
            if chain.contains(&parent) {
                chain.push(parent);
                return Err(DomainError::CyclicInheritance { chain }.into());
            }

            let descendant = chain.last().cloned();
            let (mut ancestor, ancestor_modified) = self
                .load_single(&parent)
                .map_err(|cause| wrap(&parent, descendant, cause))?;

            debug!(interface = name, parent = %parent, "Merging parent interface");
            modified = modified.max(ancestor_modified);
            next = ancestor.parent.take();
            definition.absorb_parent(ancestor);
            chain.push(parent);
        }

        Ok(LoadedInterface {
            definition,
            modified,
            chain,
        })
    }

    /// Names of every interface definition in the project, sorted.
    pub fn all_names(&self) -> StencilResult<Vec<String>> {
        let dir = self.ctx.layout.interfaces_dir();
        let mut names = Vec::new();
        for ext in crate::application::layout::MANIFEST_EXTENSIONS {
            for path in self.ctx.filesystem.list_files(&dir, ext)? {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn load_single(&self, name: &str) -> StencilResult<(InterfaceDefinition, SystemTime)> {
        let path = self.ctx.locate(
            ManifestKind::Interface,
            name,
            self.ctx.layout.interface_candidates(name),
        )?;
        let definition = self
            .ctx
            .load(ManifestKind::Interface, &path)?
            .into_interface()?
            .with_name(name);
        let modified = self.ctx.modified(&path)?;
        Ok((definition, modified))
    }
}

fn wrap(interface: &str, descendant: Option<String>, cause: StencilError) -> StencilError {
    ApplicationError::InterfaceLoad {
        interface: interface.to_string(),
        descendant,
        cause: Box::new(cause),
    }
    .into()
}
