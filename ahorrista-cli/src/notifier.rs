//! Blocking alerts in the terminal

use colored::Colorize;
use dialoguer::Input;

use ahorrista_core::ports::Notifier;

/// Prints the alert and, in an interactive session, waits for Enter
pub struct TerminalNotifier {
    wait_for_ack: bool,
}

impl TerminalNotifier {
    /// One-shot commands only print
    pub fn printing() -> Self {
        Self {
            wait_for_ack: false,
        }
    }

    /// The menu waits for acknowledgment when attached to a terminal
    pub fn interactive() -> Self {
        Self {
            wait_for_ack: atty::is(atty::Stream::Stdin),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", "!".red().bold(), message.bold());
        if self.wait_for_ack {
            let _ = Input::<String>::new()
                .with_prompt("Press Enter to continue")
                .allow_empty(true)
                .interact_text();
        }
    }
}
