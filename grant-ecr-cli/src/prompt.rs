use std::io::{self, BufRead};

use grant_ecr_policy::{ConfirmationRequest, Operator, Progress};
use log::debug;

use crate::output;

/// Confirms on the controlling terminal.
///
/// Any line, including an empty one, confirms. A closed stdin declines.
pub(crate) struct TerminalOperator;

/// Read one line of acknowledgement from `input`
fn read_confirmation(mut input: impl BufRead) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => {
            debug!("stdin closed before confirmation");
            false
        }
        Ok(_) => true,
        Err(e) => {
            output::error(&format!("failed to read confirmation: {e}"));
            false
        }
    }
}

impl Operator for TerminalOperator {
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        output::print_confirmation(request);

        // Called from inside the runtime; keep the blocking read off the worker.
        tokio::task::block_in_place(|| read_confirmation(io::stdin().lock()))
    }

    fn progress(&self, progress: Progress) {
        output::print_progress(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_any_line_confirms() {
        assert!(read_confirmation(Cursor::new("\n")));
        assert!(read_confirmation(Cursor::new("no\n")));
        assert!(read_confirmation(Cursor::new("y")));
    }

    #[test]
    fn test_closed_input_declines() {
        assert!(!read_confirmation(Cursor::new("")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_read_runs_inside_runtime() {
        let confirmed = tokio::task::block_in_place(|| read_confirmation(Cursor::new("\n")));
        assert!(confirmed);
    }
}
