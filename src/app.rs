use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::{Cli, CliCommand};
use crate::config::{load_config, validate_config, Config};
use crate::env_file::resolve_api_key;
use crate::fixer::OpenAiFixer;
use crate::interact::TerminalGate;
use crate::logger::AttemptLog;
use crate::run_loop::{quit, run_loop, LoopOutcome, Quit, RuntimeState};

const DEFAULT_CONFIG_REL: &str = ".config/mender.yml";

fn home_dir() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

/// Resolve the effective config: the `-c` flag must name an existing file;
/// the default path is used only when present; otherwise built-in defaults.
fn resolve_config(flag: Option<&Path>) -> Result<Config, String> {
    if let Some(path) = flag {
        if !path.is_file() {
            return Err(format!("Missing config file: {}", path.display()));
        }
        return Ok(load_config(path)?.config);
    }
    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_REL);
        if default_path.is_file() {
            return Ok(load_config(&default_path)?.config);
        }
    }
    Ok(Config::default())
}

fn apply_overrides(
    mut config: Config,
    max_attempts: Option<u64>,
    delay_secs: Option<u64>,
    log: Option<&Path>,
) -> Config {
    if let Some(max_attempts) = max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(delay_secs) = delay_secs {
        config.retry_delay_secs = delay_secs;
    }
    if let Some(log) = log {
        config.log_path = log.display().to_string();
    }
    config
}

fn run_with_cli(cli: Cli) -> Result<LoopOutcome, Quit> {
    let Some(CliCommand::Run {
        file,
        max_attempts,
        delay_secs,
        log,
    }) = cli.command
    else {
        eprintln!("Usage: mender run <FILE>");
        return Err(quit("missing_subcommand", 1));
    };

    let config = resolve_config(cli.config.as_deref()).map_err(|message| {
        eprintln!("{}", message);
        quit(&message, 1)
    })?;
    let config = apply_overrides(config, max_attempts, delay_secs, log.as_deref());
    if let Err(message) = validate_config(&config) {
        eprintln!("{}", message);
        return Err(quit(&message, 1));
    }

    // Checked before any subprocess or network activity.
    if !file.is_file() {
        eprintln!("File does not exist: {}", file.display());
        return Err(quit(&format!("missing_target:{}", file.display()), 1));
    }

    let api_key = resolve_api_key(&config.api_key_env, Path::new(&config.env_file))
        .map_err(|message| {
            eprintln!("{}", message);
            quit(&message, 1)
        })?;

    let interrupt_flag = Arc::new(AtomicBool::new(false));
    if let Err(err) = ctrlc::set_handler({
        let interrupt_flag = Arc::clone(&interrupt_flag);
        move || {
            interrupt_flag.store(true, Ordering::SeqCst);
        }
    }) {
        eprintln!("Failed to set interrupt handler: {}", err);
    }

    let fixer = OpenAiFixer::new(config.api_url.clone(), config.model.clone(), api_key);
    let mut gate = TerminalGate;
    let state = RuntimeState {
        logger: AttemptLog::new(PathBuf::from(&config.log_path)),
        config,
        target: file,
        interrupt_flag,
    };

    println!("🔍 Auto-debugging {}...", state.target.display());
    run_loop(&state, &fixer, &mut gate)
}

pub(crate) fn run_with_args(args: Vec<OsString>) -> Result<LoopOutcome, Quit> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            // clap's `Error::print()` uses termcolor and can bypass Rust's test output
            // capturing. Rendering it ourselves keeps CLI errors capture-friendly.
            eprintln!("{err}");
            let code = if err.exit_code() == 0 { 0 } else { 1 };
            return Err(Quit {
                code,
                reason: "cli_parse".to_string(),
            });
        }
    };
    run_with_cli(cli)
}

pub(crate) fn main_with_args(args: Vec<OsString>) -> ExitCode {
    match run_with_args(args) {
        Ok(outcome) => outcome.exit_code(),
        Err(quit) => quit.exit_code(),
    }
}

pub(crate) fn main() -> ExitCode {
    main_with_args(env::args_os().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(parts: &[&str]) -> Vec<OsString> {
        std::iter::once("mender")
            .chain(parts.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn missing_subcommand_exits_one() {
        let err = run_with_args(args(&[])).expect_err("expected usage error");
        assert_eq!(err.code, 1);
    }

    #[test]
    fn run_without_file_exits_one() {
        let err = run_with_args(args(&["run"])).expect_err("expected parse error");
        assert_eq!(err.code, 1);
    }

    #[test]
    fn help_exits_zero() {
        let err = run_with_args(args(&["--help"])).expect_err("help is an early exit");
        assert_eq!(err.code, 0);
    }

    #[test]
    fn missing_target_file_exits_one() {
        let dir = TempDir::new().expect("create temp dir");
        let config_path = dir.path().join("mender.yml");
        fs::write(&config_path, "interpreter: sh\n").expect("write config");
        let missing = dir.path().join("no_such_script.sh");

        let err = run_with_args(args(&[
            "-c",
            config_path.to_str().expect("utf8 path"),
            "run",
            missing.to_str().expect("utf8 path"),
        ]))
        .expect_err("expected missing-file error");
        assert_eq!(err.code, 1);
        assert!(err.reason.contains("missing_target"), "reason: {}", err.reason);
    }

    #[test]
    fn missing_config_flag_path_exits_one() {
        let dir = TempDir::new().expect("create temp dir");
        let absent = dir.path().join("absent.yml");
        let err = run_with_args(args(&[
            "-c",
            absent.to_str().expect("utf8 path"),
            "run",
            "whatever.sh",
        ]))
        .expect_err("expected missing-config error");
        assert_eq!(err.code, 1);
    }

    #[test]
    fn overrides_replace_config_values() {
        let config = apply_overrides(
            Config::default(),
            Some(7),
            Some(0),
            Some(Path::new("custom.log")),
        );
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.retry_delay_secs, 0);
        assert_eq!(config.log_path, "custom.log");
    }

    #[test]
    fn overrides_keep_config_values_when_absent() {
        let config = apply_overrides(Config::default(), None, None, None);
        assert_eq!(config.max_attempts, crate::config::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.log_path, crate::config::DEFAULT_LOG_PATH);
    }
}
