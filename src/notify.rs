/// file: src/notify.rs
/// description: transient success/error notifications shown to the user
use crate::formatter::Colors;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

/// Sink for toast notifications. Content only; presentation is up to the
/// implementation.
pub trait Notifier {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

/// Records every toast in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct ToastLog {
    toasts: Rc<RefCell<Vec<Toast>>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: ToastKind, message: &str) {
        self.toasts.borrow_mut().push(Toast {
            kind,
            message: message.to_string(),
            shown_at: Utc::now(),
        });
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.borrow().last().cloned()
    }

    pub fn has_errors(&self) -> bool {
        self.toasts
            .borrow()
            .iter()
            .any(|toast| toast.kind == ToastKind::Error)
    }

    pub fn len(&self) -> usize {
        self.toasts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.borrow().is_empty()
    }
}

impl Notifier for ToastLog {
    fn show_success(&self, message: &str) {
        self.push(ToastKind::Success, message);
    }

    fn show_error(&self, message: &str) {
        self.push(ToastKind::Error, message);
    }
}

/// Prints toasts to stdout and keeps a [`ToastLog`] of them.
#[derive(Debug, Clone, Default)]
pub struct TerminalNotifier {
    colored: bool,
    log: ToastLog,
}

impl TerminalNotifier {
    pub fn new(colored: bool) -> Self {
        Self {
            colored,
            log: ToastLog::new(),
        }
    }

    pub fn log(&self) -> &ToastLog {
        &self.log
    }

    fn print(&self, tag: &str, color: &str, message: &str) {
        if self.colored {
            println!(
                "{}{}[{}]{} {}",
                Colors::BOLD,
                color,
                tag,
                Colors::RESET,
                message
            );
        } else {
            println!("[{}] {}", tag, message);
        }
    }
}

impl Notifier for TerminalNotifier {
    fn show_success(&self, message: &str) {
        info!(toast = message, "Success notification");
        self.print("OK", Colors::BRIGHT_GREEN, message);
        self.log.show_success(message);
    }

    fn show_error(&self, message: &str) {
        warn!(toast = message, "Error notification");
        self.print("ERROR", Colors::BRIGHT_RED, message);
        self.log.show_error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_log_records_in_order() {
        let log = ToastLog::new();
        log.show_success("saved");
        log.show_error("denied");

        let toasts = log.toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].message, "denied");
        assert!(toasts[0].shown_at <= toasts[1].shown_at);
        assert!(log.has_errors());
    }

    #[test]
    fn test_terminal_notifier_keeps_log() {
        let notifier = TerminalNotifier::new(false);
        notifier.show_success("Password changed");

        assert_eq!(notifier.log().len(), 1);
        assert!(!notifier.log().has_errors());
    }
}
