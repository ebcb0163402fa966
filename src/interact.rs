use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Accepted,
    Rejected,
}

pub(crate) trait Gate {
    fn confirm_fix(&mut self) -> Result<Decision, String>;
}

pub(crate) struct TerminalGate;

impl Gate for TerminalGate {
    fn confirm_fix(&mut self) -> Result<Decision, String> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        read_decision(&mut stdin.lock(), &mut stdout)
    }
}

/// Prompt for consent and read one line. Only an exact case-insensitive
/// "yes" accepts; anything else, including EOF, rejects.
pub(crate) fn read_decision(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Decision, String> {
    output
        .write_all(b"Do you want to apply the suggested fix? (yes/no): ")
        .map_err(|err| format!("Failed to write prompt: {}", err))?;
    output
        .flush()
        .map_err(|err| format!("Failed to flush prompt: {}", err))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|err| format!("Failed to read response: {}", err))?;
    if bytes == 0 {
        return Ok(Decision::Rejected);
    }
    if line.trim().eq_ignore_ascii_case("yes") {
        Ok(Decision::Accepted)
    } else {
        Ok(Decision::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decide(input: &str) -> Decision {
        let mut output = Vec::new();
        read_decision(&mut Cursor::new(input), &mut output).expect("read decision")
    }

    #[test]
    fn exact_yes_accepts() {
        assert_eq!(decide("yes\n"), Decision::Accepted);
    }

    #[test]
    fn yes_is_case_insensitive_and_trimmed() {
        assert_eq!(decide("  YES  \n"), Decision::Accepted);
        assert_eq!(decide("Yes\n"), Decision::Accepted);
    }

    #[test]
    fn anything_else_rejects() {
        assert_eq!(decide("no\n"), Decision::Rejected);
        assert_eq!(decide("y\n"), Decision::Rejected);
        assert_eq!(decide("yes please\n"), Decision::Rejected);
        assert_eq!(decide("\n"), Decision::Rejected);
    }

    #[test]
    fn eof_rejects() {
        assert_eq!(decide(""), Decision::Rejected);
    }

    #[test]
    fn prompt_is_written_before_reading() {
        let mut output = Vec::new();
        read_decision(&mut Cursor::new("no\n"), &mut output).expect("read decision");
        let prompt = String::from_utf8(output).expect("utf8 prompt");
        assert!(prompt.contains("apply the suggested fix"));
    }
}
