use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::display::highlight_source;
use crate::fixer::FixRequester;
use crate::interact::{Decision, Gate};
use crate::logger::{Attempt, AttemptLog};
use crate::runner::run_script;

#[derive(Debug)]
pub(crate) struct RuntimeState {
    pub(crate) config: Config,
    pub(crate) target: PathBuf,
    pub(crate) logger: AttemptLog,
    pub(crate) interrupt_flag: Arc<AtomicBool>,
}

#[derive(Debug)]
pub(crate) struct Quit {
    pub(crate) code: i32,
    #[allow(dead_code)]
    pub(crate) reason: String,
}

impl Quit {
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code as u8)
    }
}

pub(crate) fn quit(reason: &str, code: i32) -> Quit {
    Quit {
        code,
        reason: reason.to_string(),
    }
}

/// How a run ended. Each variant maps to a distinct exit code so callers can
/// tell "already working" from "file was rewritten" from "gave up".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopOutcome {
    /// The script exited zero; nothing was changed.
    Succeeded,
    /// The operator accepted a fix and the target file was overwritten.
    FixApplied,
    /// Every attempt failed and every fix was rejected.
    Exhausted,
}

impl LoopOutcome {
    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            LoopOutcome::Succeeded => ExitCode::SUCCESS,
            LoopOutcome::FixApplied => ExitCode::from(2),
            LoopOutcome::Exhausted => ExitCode::from(3),
        }
    }
}

fn check_interrupted(state: &RuntimeState) -> Result<(), Quit> {
    if state.interrupt_flag.load(Ordering::SeqCst) {
        return Err(quit("interrupted", 130));
    }
    Ok(())
}

pub(crate) fn run_loop(
    state: &RuntimeState,
    fixer: &dyn FixRequester,
    gate: &mut dyn Gate,
) -> Result<LoopOutcome, Quit> {
    for attempt_number in 1..=state.config.max_attempts {
        check_interrupted(state)?;

        let outcome = run_script(&state.config.interpreter, &state.target)
            .map_err(|err| quit(&err, 1))?;
        if outcome.success {
            println!("✅ Script ran successfully!");
            return Ok(LoopOutcome::Succeeded);
        }

        let error_text = String::from_utf8_lossy(&outcome.output).into_owned();
        println!(
            "❌ Attempt {}: error encountered (exit code {})",
            attempt_number, outcome.exit_code
        );
        println!("{}", error_text);

        let original_code = fs::read_to_string(&state.target).map_err(|err| {
            quit(
                &format!("Failed to read {}: {}", state.target.display(), err),
                1,
            )
        })?;

        check_interrupted(state)?;
        // API failures are fatal; the loop makes no attempt to retry them.
        let suggested_fix = fixer
            .request_fix(&original_code, &error_text)
            .map_err(|err| quit(&err, 1))?;

        println!("💡 Suggested fix:");
        print!("{}", highlight_source(&suggested_fix));
        println!();

        state.logger.log_attempt(&Attempt {
            number: attempt_number,
            original_code,
            error_output: outcome.output,
            suggested_fix: suggested_fix.clone(),
        });

        check_interrupted(state)?;
        match gate.confirm_fix().map_err(|err| quit(&err, 1))? {
            Decision::Accepted => {
                fs::write(&state.target, &suggested_fix).map_err(|err| {
                    quit(
                        &format!("Failed to write {}: {}", state.target.display(), err),
                        1,
                    )
                })?;
                println!("🔧 Applied the suggested fix.");
                return Ok(LoopOutcome::FixApplied);
            }
            Decision::Rejected => {
                println!("⚙️ Proceeding to the next attempt...");
                if attempt_number < state.config.max_attempts {
                    thread::sleep(Duration::from_secs(state.config.retry_delay_secs));
                }
            }
        }
    }

    println!(
        "⚠️ No accepted fix after {} attempts. Run mender again or repair the script by hand.",
        state.config.max_attempts
    );
    Ok(LoopOutcome::Exhausted)
}
