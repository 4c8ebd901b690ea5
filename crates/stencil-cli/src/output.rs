//! Output management and formatting.

use std::io::{self, IsTerminal};
use std::path::Path;

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use stencil_core::application::{ArtifactAction, ArtifactReport, RunReport};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => OutputFormat::from_config(&config.output.format),
            explicit => explicit,
        };
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// The command's result (UUIDs, config values, completions); never
    /// suppressed.
    pub fn data(&self, msg: &str) -> io::Result<()> {
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Serialise `value` as pretty JSON on stdout.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Print the outcome of a generation run, paths shown relative to `root`.
    pub fn report(&self, report: &RunReport, root: &Path) -> io::Result<()> {
        if self.format() == OutputFormat::Json {
            return self.json(report);
        }

        for artifact in &report.artifacts {
            self.artifact(artifact, root)?;
        }
        for warning in &report.warnings {
            self.warning(warning)?;
        }
        for skipped in &report.skipped {
            self.warning(&format!("Skipped {}: {}", skipped.name, skipped.reason))?;
        }

        let written = report.written().count();
        if written > 0 {
            self.success(&format!("{written} file(s) written"))?;
        } else if report.artifacts.iter().all(|a| !matches!(a.action, ArtifactAction::Diff { .. })) {
            self.info("Nothing to write")?;
        }
        Ok(())
    }

    fn artifact(&self, artifact: &ArtifactReport, root: &Path) -> io::Result<()> {
        let path = artifact.path.strip_prefix(root).unwrap_or(&artifact.path);
        let shown = path.display();
        match &artifact.action {
            ArtifactAction::Created => self.print(&format!("  created      {shown}")),
            ArtifactAction::Updated => self.print(&format!("  updated      {shown}")),
            ArtifactAction::Overwritten => self.print(&format!("  overwritten  {shown}")),
            ArtifactAction::Unchanged => self.print(&format!("  unchanged    {shown}")),
            ArtifactAction::Skipped { reason } => {
                self.print(&format!("  skipped      {shown} ({reason})"))
            }
            // A diff is the command's result even with --quiet.
            ArtifactAction::Diff { diff } => self.diff(diff),
        }
    }

    fn diff(&self, diff: &str) -> io::Result<()> {
        for line in diff.lines() {
            let styled = if !self.supports_color() {
                line.to_string()
            } else if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else {
                line.to_string()
            };
            self.term.write_line(&styled)?;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(quiet: bool, no_color: bool, format: OutputFormat) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            root: None,
            templates: None,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true, OutputFormat::Plain);
        assert!(out.print("hello").is_ok());
        assert!(out.data("still printed").is_ok());
    }

    #[test]
    fn plain_output_never_uses_color() {
        assert!(!make_manager(false, false, OutputFormat::Plain).supports_color());
        assert!(make_manager(false, false, OutputFormat::Human).supports_color());
        assert!(!make_manager(false, true, OutputFormat::Human).supports_color());
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: false,
            root: None,
            templates: None,
            config: None,
            output_format: OutputFormat::Auto,
        };
        let mut config = AppConfig::default();
        config.output.format = "json".into();
        assert_eq!(OutputManager::new(&args, &config).format(), OutputFormat::Json);
    }

    #[test]
    fn report_accepts_every_action() {
        let out = make_manager(false, true, OutputFormat::Plain);
        let report = RunReport {
            artifacts: vec![
                ArtifactReport {
                    label: "module.hpp".into(),
                    path: "/ws/modules/M/M.hpp".into(),
                    action: ArtifactAction::Updated,
                },
                ArtifactReport {
                    label: "cmakelists".into(),
                    path: "/ws/modules/M/CMakeLists.txt".into(),
                    action: ArtifactAction::Diff {
                        diff: "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n".into(),
                    },
                },
            ],
            skipped: Vec::new(),
            warnings: vec!["modules/M/M.hpp: block dropped".into()],
        };
        assert!(out.report(&report, Path::new("/ws")).is_ok());
    }
}
