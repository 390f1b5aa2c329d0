use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session-wide, append-only console output.
///
/// Clones share the same log. Only [`OutputLog::clear`] removes lines.
#[derive(Clone, Debug, Default)]
pub struct OutputLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputLog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        // Every mutation is a single push or clear, so a poisoned log is still consistent.
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one line. The terminator is added when the log is rendered.
    pub fn append_line(&self, line: impl Into<String>) {
        self.guard().push(line.into());
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    /// Snapshot of the appended lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.guard().clone()
    }

    /// The log as displayed: every line followed by `\n`.
    pub fn text(&self) -> String {
        let lines = self.guard();
        let mut text = String::with_capacity(lines.iter().map(|line| line.len() + 1).sum());
        for line in lines.iter() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}
