use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::api::ApiError;

pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to the server!";
pub const REJECTED_MESSAGE: &str = "The server rejected the request.";

/// Where user-facing outcomes go. The core never prints directly.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!(
            "{}{}{} {}",
            "[".bold().white(),
            "OK".bold().green(),
            "]".bold().white(),
            message
        );
    }

    fn error(&self, message: &str) {
        eprintln!(
            "{}{}{} {}",
            "[".bold().white(),
            "ERR".bold().red(),
            "]".bold().white(),
            message
        );
    }
}

/// A confirmation whose answer is already known (`--yes`, or read by the shell).
#[derive(Clone, Copy, Debug)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

pub async fn read_answer<R>(prompt: &str, lines: &mut Lines<R>) -> bool
where
    R: AsyncBufRead + Unpin,
{
    print!("{} [y/N] ", prompt.bold().yellow());
    let _ = std::io::stdout().flush();
    match lines.next_line().await {
        Ok(Some(answer)) => is_yes(&answer),
        _ => false,
    }
}

pub fn failure_message(err: &ApiError) -> String {
    match err.server_message() {
        Some(text) => text.to_string(),
        None if err.is_application() => REJECTED_MESSAGE.to_string(),
        None => CONNECT_FAILED_MESSAGE.to_string(),
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}
