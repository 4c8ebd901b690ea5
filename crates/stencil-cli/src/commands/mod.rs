//! Command handlers. Each translates parsed arguments into a call on the
//! core [`GenerationService`] and hands the result to the [`OutputManager`].
//!
//! [`OutputManager`]: crate::output::OutputManager

use std::path::PathBuf;

use tracing::debug;

use stencil_adapters::{LocalFilesystem, SerdeValidator, TeraRenderer};
use stencil_core::application::{GenerationService, ProjectLayout, RunOptions};

use crate::{
    cli::{RunArgs, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod completions;
pub mod config;
pub mod headers;
pub mod helpers;
pub mod module;

/// Wire the local adapters into a generation service.
///
/// Flags take precedence over configuration; the project root defaults to
/// the current directory.
pub fn build_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<GenerationService> {
    let root = global
        .root
        .clone()
        .or_else(|| config.project.root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let templates = global
        .templates
        .clone()
        .or_else(|| config.templates.local_path.clone());

    debug!(root = %root.display(), templates = ?templates, "Building generation service");

    let renderer = match templates {
        Some(dir) if !dir.is_dir() => {
            return Err(CliError::InvalidInput {
                message: format!("template directory {} does not exist", dir.display()),
            });
        }
        Some(dir) => TeraRenderer::with_template_dir(&dir)?,
        None => TeraRenderer::new()?,
    };

    Ok(GenerationService::new(
        ProjectLayout::new(root),
        Box::new(SerdeValidator::new()),
        Box::new(renderer),
        Box::new(LocalFilesystem::new()),
    ))
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            force: args.force,
            dry_run: args.diff,
        }
    }
}
