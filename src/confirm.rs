use crate::constants::CONFIRM_PROMPT;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Asks for consent before any file is overwritten.
///
/// Accepts `yes` or `no` in any case and re-prompts on anything else. End of
/// input counts as `no`.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<bool> {
    let mut line = String::new();
    loop {
        write!(output, "{}", CONFIRM_PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        match line.trim().to_lowercase().as_str() {
            "yes" => return Ok(true),
            "no" => return Ok(false),
            _ => continue,
        }
    }
}
