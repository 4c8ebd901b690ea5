//! `stencil interface generate-headers` and `stencil types generate-headers`.

use crate::{
    cli::{InterfaceCommands, TypesCommands, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::build_service;

pub fn interfaces(
    cmd: InterfaceCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let InterfaceCommands::GenerateHeaders(args) = cmd;
    let service = build_service(&global, &config)?;
    let report = service.generate_interface_headers(&args.names, args.run.into())?;
    output.report(&report, service.layout().root())?;
    Ok(())
}

pub fn types(
    cmd: TypesCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let TypesCommands::GenerateHeaders(args) = cmd;
    let service = build_service(&global, &config)?;
    let report = service.generate_type_headers(&args.namespaces, args.run.into())?;
    output.report(&report, service.layout().root())?;
    Ok(())
}
