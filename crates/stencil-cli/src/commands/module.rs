//! `stencil module create|update`.

use tracing::{info, instrument};

use stencil_core::application::ModuleRequest;
use stencil_core::domain::WHICH_FILTER;

use crate::{
    cli::{ModuleArgs, ModuleCommands, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::build_service;

pub fn execute(
    cmd: ModuleCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ModuleCommands::Create(args) => run(args, false, &global, &config, &output),
        ModuleCommands::Update(args) => run(args, true, &global, &config, &output),
    }
}

#[instrument(skip_all, fields(module = %args.name, update = update))]
fn run(
    args: ModuleArgs,
    update: bool,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let service = build_service(global, config)?;

    if args.only.as_deref() == Some(WHICH_FILTER) {
        for label in service.module_artifacts(&args.name)? {
            output.data(&label)?;
        }
        return Ok(());
    }

    let request = ModuleRequest {
        name: args.name,
        update,
        force: args.run.force,
        dry_run: args.run.diff,
        only: args.only,
    };
    let report = service.generate_module(&request)?;
    info!(written = report.written().count(), "Module done");

    output.report(&report, service.layout().root())?;
    Ok(())
}
