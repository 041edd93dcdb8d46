use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Overlay: dialogs, menus and progress bars driven by a host process.
#[derive(Parser, Debug)]
#[command(name = "overlay", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error, or a filter directive).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the host channel on stdin/stdout (default).
    Run(RunArgs),
    /// Print the effective configuration as JSON.
    PrintConfig,
    /// Write a commented default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Resolve outbound calls locally instead of writing them to stdout.
    #[arg(long)]
    pub standalone: bool,

    /// JSON array of `{"action", "data"}` events to replay.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Delay before the script is replayed.
    #[arg(long, default_value_t = 1000)]
    pub script_delay_ms: u64,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            standalone: false,
            script: None,
            script_delay_ms: 1000,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

/// Turn `--log-level` into a tracing directive. Bare level names apply to
/// the overlay crates only.
pub fn log_directive(level: &str) -> String {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => format!("overlay={level}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let args = Args::parse_from(["overlay"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn run_flags() {
        let args = Args::parse_from([
            "overlay",
            "run",
            "--standalone",
            "--script",
            "demo.json",
            "--script-delay-ms",
            "250",
            "--log-level",
            "debug",
        ]);
        let Some(Command::Run(run)) = args.command else {
            panic!("expected run");
        };
        assert!(run.standalone);
        assert_eq!(run.script, Some(PathBuf::from("demo.json")));
        assert_eq!(run.script_delay_ms, 250);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn script_delay_defaults_to_one_second() {
        let args = Args::parse_from(["overlay", "run"]);
        let Some(Command::Run(run)) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.script_delay_ms, 1000);
        assert!(!run.standalone);
        assert_eq!(RunArgs::default().script_delay_ms, run.script_delay_ms);
    }

    #[test]
    fn bare_levels_are_scoped() {
        assert_eq!(log_directive("debug"), "overlay=debug");
        assert_eq!(log_directive("overlay_ui=trace"), "overlay_ui=trace");
    }
}
