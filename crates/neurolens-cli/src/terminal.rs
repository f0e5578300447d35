//! Notification output for a terminal session.

use std::io::{IsTerminal, Write};

use neurolens_core::notify::{Notification, Notifier, Permission, Severity};

/// Toasts and system notifications go to stderr; the chime is the
/// terminal bell. Permission is granted only when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    interactive: bool,
}

impl TerminalNotifier {
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stderr().is_terminal(),
        }
    }
}

fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Critical => "critical",
    }
}

impl Notifier for TerminalNotifier {
    fn request_permission(&mut self) -> Permission {
        if self.interactive {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn toast(&mut self, notification: &Notification) {
        eprintln!(
            "[{}] {}: {}",
            label(notification.severity),
            notification.title,
            notification.body
        );
    }

    fn system(&mut self, notification: &Notification) -> neurolens_core::error::Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "\x1b[1m{}\x1b[0m {}", notification.title, notification.body)?;
        Ok(())
    }

    fn chime(&mut self) {
        if self.interactive {
            eprint!("\x07");
        }
    }
}
