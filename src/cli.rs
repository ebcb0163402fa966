use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mender",
    about = "Mender reruns a failing script and asks a language model to patch it.",
    long_about = "Mender runs the target script, and on failure sends the source and error output to a chat-completion API. Each proposed replacement is shown for explicit approval before the file is overwritten.",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Load configuration from PATH instead of ~/.config/mender.yml.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "PATH",
        help = "Load configuration from PATH instead of ~/.config/mender.yml."
    )]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    #[command(about = "Run FILE and propose model fixes for failures until one is accepted.")]
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Give up after N failed attempts (default 5).
        #[arg(long = "max-attempts", value_name = "N")]
        max_attempts: Option<u64>,

        /// Wait SECS between rejected attempts (default 2).
        #[arg(long = "delay-secs", value_name = "SECS")]
        delay_secs: Option<u64>,

        /// Append attempt records to PATH (default mender_log.txt).
        #[arg(long = "log", value_name = "PATH")]
        log: Option<PathBuf>,
    },
}
