use std::path::Path;
use std::process::Command;

#[derive(Debug)]
pub(crate) struct ScriptOutcome {
    pub(crate) success: bool,
    pub(crate) exit_code: i32,
    pub(crate) output: Vec<u8>,
}

/// Run `interpreter <file>` and capture its output. Non-zero exit (or death
/// by signal, reported as exit code 1) is failure; the captured output is
/// then stderr followed by stdout so tracebacks come first.
pub(crate) fn run_script(interpreter: &str, file: &Path) -> Result<ScriptOutcome, String> {
    let output = Command::new(interpreter)
        .arg(file)
        .output()
        .map_err(|err| format!("Failed to run '{} {}': {}", interpreter, file.display(), err))?;

    let exit_code = output.status.code().unwrap_or(1);
    if output.status.success() {
        return Ok(ScriptOutcome {
            success: true,
            exit_code,
            output: output.stdout,
        });
    }

    let mut combined = output.stderr;
    combined.extend_from_slice(&output.stdout);
    Ok(ScriptOutcome {
        success: false,
        exit_code,
        output: combined,
    })
}
