use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) const ATTEMPT_SEPARATOR: &str = "-----------------------------------";

/// One run-fix-decide cycle, as recorded in the attempt log.
#[derive(Debug)]
pub(crate) struct Attempt {
    pub(crate) number: u64,
    pub(crate) original_code: String,
    pub(crate) error_output: Vec<u8>,
    pub(crate) suggested_fix: String,
}

impl Attempt {
    pub(crate) fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error_output).into_owned()
    }
}

#[derive(Debug)]
pub(crate) struct AttemptLog {
    path: PathBuf,
    disabled: AtomicBool,
}

impl AttemptLog {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            disabled: AtomicBool::new(false),
        }
    }

    /// Append one fixed-format block for a failed attempt. Log I/O failures
    /// warn once on stderr and disable further logging without aborting the
    /// run.
    pub(crate) fn log_attempt(&self, attempt: &Attempt) {
        if self.disabled.load(Ordering::Relaxed) {
            return;
        }
        let block = render_attempt_block(attempt, &Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
        let mut file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(err) => {
                self.disable_with_warning(&self.path, &err);
                return;
            }
        };
        if let Err(err) = file.write_all(block.as_bytes()) {
            self.disable_with_warning(&self.path, &err);
        }
    }

    fn disable_with_warning(&self, path: &Path, err: &std::io::Error) {
        // Keep the program running, but surface logging failures once and stop retrying.
        if self
            .disabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // Avoid `eprintln!` so tests can reliably capture stderr via fd redirection.
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(
                stderr,
                "Warning: attempt logging disabled log_path={} io_error={}",
                path.display(),
                err
            );
        }
    }
}

fn render_attempt_block(attempt: &Attempt, timestamp: &str) -> String {
    let mut block = String::new();
    block.push_str(&format!("Attempt {} {}\n", attempt.number, timestamp));
    block.push_str("Original Code:\n");
    block.push_str(&attempt.original_code);
    block.push_str("\nError Output:\n");
    block.push_str(&attempt.error_text());
    block.push_str("\nSuggested Fix:\n");
    block.push_str(&attempt.suggested_fix);
    block.push('\n');
    block.push_str(ATTEMPT_SEPARATOR);
    block.push('\n');
    block
}
