//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Block-preserving code generation from module manifests",
    long_about = "Stencil generates C++ module skeletons, interface headers and type \
                  headers from YAML/JSON manifests. Hand-written code between marker \
                  lines survives every regeneration.",
    after_help = "EXAMPLES:\n\
        \x20 stencil module create EvseManager\n\
        \x20 stencil module update EvseManager --diff\n\
        \x20 stencil module update EvseManager --only module.hpp,cmakelists\n\
        \x20 stencil interface generate-headers\n\
        \x20 stencil types generate-headers evse_board_support\n\
        \x20 stencil completions bash > /usr/share/bash-completion/completions/stencil",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or update the files of a module.
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Generate the headers of interfaces.
    #[command(subcommand)]
    Interface(InterfaceCommands),

    /// Generate the headers of type namespaces.
    #[command(subcommand)]
    Types(TypesCommands),

    /// Small helpers for manifest and template authors.
    #[command(subcommand)]
    Helpers(HelpersCommands),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash >> ~/.bashrc\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Stencil configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ModuleCommands {
    /// Create every file of a new module.
    #[command(after_help = "EXAMPLES:\n\
        \x20 stencil module create EvseManager\n\
        \x20 stencil module create EvseManager --force --only which")]
    Create(ModuleArgs),

    /// Regenerate the files of an existing module, keeping marked regions.
    #[command(after_help = "EXAMPLES:\n\
        \x20 stencil module update EvseManager\n\
        \x20 stencil module update EvseManager --force --diff")]
    Update(ModuleArgs),
}

/// Arguments of `stencil module create|update`.
#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Module directory name below `modules/`.
    #[arg(value_name = "MODULE", help = "Module name")]
    pub name: String,

    #[command(flatten)]
    pub run: RunArgs,

    /// Comma separated artifact labels; `which` lists them.
    #[arg(
        long = "only",
        value_name = "LABELS",
        help = "Only generate these artifacts ('which' to list them)"
    )]
    pub only: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum InterfaceCommands {
    /// Generate implementation and exports headers.
    #[command(name = "generate-headers")]
    GenerateHeaders(InterfaceHeaderArgs),
}

#[derive(Debug, Args)]
pub struct InterfaceHeaderArgs {
    /// Interfaces to generate; all of them when omitted.
    #[arg(value_name = "INTERFACE")]
    pub names: Vec<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Subcommand)]
pub enum TypesCommands {
    /// Generate one header per type namespace.
    #[command(name = "generate-headers")]
    GenerateHeaders(TypeHeaderArgs),
}

#[derive(Debug, Args)]
pub struct TypeHeaderArgs {
    /// Namespaces such as `evse_board_support` or `a/b`; all when omitted.
    #[arg(value_name = "NAMESPACE")]
    pub namespaces: Vec<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Flags shared by every generating command.
#[derive(Debug, Clone, Copy, Args)]
pub struct RunArgs {
    /// Regenerate even when the target is newer than its sources, or
    /// overwrite on create.
    #[arg(short = 'f', long = "force", help = "Ignore modification times / overwrite")]
    pub force: bool,

    /// Show what would change without writing anything.
    #[arg(
        long = "diff",
        visible_alias = "dry-run",
        help = "Print a unified diff instead of writing"
    )]
    pub diff: bool,
}

#[derive(Debug, Subcommand)]
pub enum HelpersCommands {
    /// Print fresh v4 UUIDs, e.g. for new block markers.
    #[command(name = "generate-uuids")]
    GenerateUuids {
        /// How many UUIDs to print.
        #[arg(value_name = "COUNT", value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
}

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// `stencil config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.format`.
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the effective configuration.
    List,

    /// Print the path of the user configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn module_update_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "stencil", "module", "update", "EvseManager", "--force", "--dry-run", "--only",
            "module.hpp",
        ])
        .unwrap();
        let Commands::Module(ModuleCommands::Update(args)) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(args.name, "EvseManager");
        assert!(args.run.force);
        assert!(args.run.diff);
        assert_eq!(args.only.as_deref(), Some("module.hpp"));
    }

    #[test]
    fn header_commands_accept_empty_lists() {
        let cli = Cli::try_parse_from(["stencil", "types", "generate-headers"]).unwrap();
        let Commands::Types(TypesCommands::GenerateHeaders(args)) = cli.command else {
            panic!("wrong subcommand");
        };
        assert!(args.namespaces.is_empty());
    }

    #[test]
    fn uuid_count_must_be_positive() {
        assert!(Cli::try_parse_from(["stencil", "helpers", "generate-uuids", "0"]).is_err());
        assert!(Cli::try_parse_from(["stencil", "helpers", "generate-uuids", "3"]).is_ok());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stencil", "interface", "generate-headers", "powermeter", "-r", "/ws", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.root.as_deref(), Some(std::path::Path::new("/ws")));
        assert_eq!(cli.global.verbose, 2);
    }
}
