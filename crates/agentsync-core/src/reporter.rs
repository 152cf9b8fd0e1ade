//! User-facing progress reporting
//!
//! Components that talk to the user receive a [`Reporter`] at construction
//! instead of printing directly or going through a module-level default.
//! The CLI installs a terminal implementation; tests use [`MemoryReporter`]
//! to assert on emitted lines. Diagnostic logging stays on `tracing`.

use std::sync::Mutex;

/// Sink for user-facing progress and warning lines
pub trait Reporter {
    /// Emit a progress line
    fn info(&self, message: &str);

    /// Emit a warning line
    fn warn(&self, message: &str);

    /// Emit a preformatted block (diff output) verbatim
    fn block(&self, content: &str) {
        self.info(content);
    }
}

/// Reporter that discards everything
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Reporter that captures lines for assertions in tests
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, in emission order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("reporter lock poisoned").clone()
    }

    /// Whether any captured line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.lines
            .lock()
            .expect("reporter lock poisoned")
            .push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.lines
            .lock()
            .expect("reporter lock poisoned")
            .push(format!("warning: {message}"));
    }
}
