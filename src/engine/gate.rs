// ABOUTME: Interactive debug gate consulted before a tick is committed
// ABOUTME: Console implementation dumps the message envelope and reads a Y/n answer

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use tracing::warn;

use crate::payload::ActivityMessage;

/// Confirmation checkpoint for payloads that opt into debug mode.
/// Returning `false` aborts the tick before commit.
pub trait DebugGate: Send {
    fn confirm(&mut self, message: &ActivityMessage) -> bool;
}

/// Continues every tick without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl DebugGate for AutoConfirm {
    fn confirm(&mut self, _message: &ActivityMessage) -> bool {
        true
    }
}

/// Text gate over any reader/writer pair. Only an answer starting with
/// `n` or `N` aborts; anything else, including end of input, continues.
pub struct ConsoleGate<R, W> {
    input: R,
    output: W,
}

impl ConsoleGate<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write_prompt(&mut self, message: &ActivityMessage) -> std::io::Result<()> {
        let envelope = message
            .envelope
            .to_json()
            .unwrap_or_else(|e| format!("<unprintable envelope: {}>", e));
        writeln!(self.output, "================ DEBUG  MODE =================")?;
        writeln!(self.output, "============== CURRENT PAYLOAD ===============")?;
        writeln!(self.output, "{}", envelope)?;
        write!(self.output, "\n\nContinue (Y/n) ")?;
        self.output.flush()
    }
}

impl<R, W> DebugGate for ConsoleGate<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&mut self, message: &ActivityMessage) -> bool {
        if let Err(e) = self.write_prompt(message) {
            warn!("Failed to write debug prompt: {}", e);
        }

        let mut answer = String::new();
        if let Err(e) = self.input.read_line(&mut answer) {
            warn!("Failed to read debug answer: {}", e);
            return true;
        }

        !matches!(answer.chars().next(), Some('n') | Some('N'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn message() -> ActivityMessage {
        let mut message = ActivityMessage::new("t");
        message.prepare();
        message.envelope.set_from("alice");
        message
    }

    fn answer(input: &str) -> (bool, String) {
        let mut gate = ConsoleGate::new(Cursor::new(input.to_string()), Vec::new());
        let confirmed = gate.confirm(&message());
        (confirmed, String::from_utf8(gate.into_output()).unwrap())
    }

    #[test]
    fn test_negative_answers_abort() {
        assert!(!answer("n\n").0);
        assert!(!answer("N\n").0);
        assert!(!answer("no thanks\n").0);
    }

    #[test]
    fn test_other_answers_continue() {
        assert!(answer("y\n").0);
        assert!(answer("\n").0);
        assert!(answer("").0);
        assert!(answer("maybe\n").0);
    }

    #[test]
    fn test_only_first_character_is_considered() {
        assert!(answer(" n\n").0);
        assert!(answer("\tN\n").0);
        assert!(answer("yn\n").0);
    }

    #[test]
    fn test_prompt_shows_envelope() {
        let (_, output) = answer("y\n");
        assert!(output.contains("DEBUG  MODE"));
        assert!(output.contains("\"from\":\"alice\""));
        assert!(output.ends_with("Continue (Y/n) "));
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm.confirm(&message()));
    }
}
