//! Thread-safe note accumulator for pass reporting.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Severity of a [`Note`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    /// Informational progress note (e.g. "removed unused input").
    Info,
    /// Something suspicious that did not stop the pass.
    Warning,
    /// A failure; the emitting pass also returns an error.
    Error,
}

/// A single report entry.
#[derive(Clone, Debug)]
pub struct Note {
    /// Severity of the entry.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{tag}: {}", self.message)
    }
}

/// A thread-safe accumulator for pass notes.
///
/// Library passes never print; they emit notes here and the caller
/// decides how to render them. The error count is tracked atomically so
/// `has_errors` does not need the lock.
pub struct Reporter {
    notes: Mutex<Vec<Note>>,
    error_count: AtomicUsize,
}

impl Reporter {
    /// Creates a new empty reporter.
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits an informational note.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message.into());
    }

    /// Emits a warning.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message.into());
    }

    /// Emits an error note.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message.into());
    }

    fn emit(&self, severity: Severity, message: String) {
        if severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.notes.lock().unwrap().push(Note { severity, message });
    }

    /// Returns `true` if any error note has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Takes all accumulated notes, leaving the reporter empty.
    pub fn take_all(&self) -> Vec<Note> {
        std::mem::take(&mut *self.notes.lock().unwrap())
    }

    /// Returns a snapshot of all accumulated notes without draining.
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
