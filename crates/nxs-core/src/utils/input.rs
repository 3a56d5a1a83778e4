//! Interactive confirmation for destructive commands

use crate::error::{CliError, UtilsError};
use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// Refuses to guess when stdin is not a terminal; callers pass `--force`
/// in scripts.
pub fn confirm(question: &str) -> crate::Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(CliError::InvalidArguments(
            "stdin is not a terminal; use --force to skip confirmation".to_string(),
        )
        .into());
    }

    write_prompt(&mut io::stderr(), question)?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| UtilsError::InputProcessing {
            message: e.to_string(),
        })?;
    Ok(is_yes(&answer))
}

/// Prompt without a newline so the answer follows on the same line.
fn write_prompt<W: Write>(out: &mut W, question: &str) -> crate::Result<()> {
    write!(out, "{} [y/N] ", question)
        .and_then(|_| out.flush())
        .map_err(|e| {
            UtilsError::InputProcessing {
                message: e.to_string(),
            }
            .into()
        })
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_write_prompt() {
        let mut out = Vec::new();
        write_prompt(&mut out, "Remove Component 'slit1'?").expect("prompt");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Remove Component 'slit1'? [y/N] "
        );
    }
}
