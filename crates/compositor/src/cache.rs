use crate::document::{ComposedDocument, compose_buffers};
use buffers::{BufferSet, is_watched};
use log::debug;

/// Holds the last composed preview and recomposes it only after a watched
/// buffer changed.
#[derive(Clone, Debug, Default)]
pub struct PreviewCache {
    document: Option<ComposedDocument>,
}

impl PreviewCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that buffer `name` changed, was added or was removed.
    pub fn note_change(&mut self, name: &str) {
        if is_watched(name) {
            self.invalidate();
        }
    }

    /// Drop the cached document unconditionally (for example after a project load).
    #[inline]
    pub fn invalidate(&mut self) {
        self.document = None;
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.document.is_none()
    }

    /// The current preview, composing it first if needed.
    pub fn document(&mut self, buffers: &BufferSet) -> &ComposedDocument {
        self.document.get_or_insert_with(|| {
            debug!("Recomposing preview document");
            compose_buffers(buffers)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_watched_buffers_invalidate() {
        let mut buffers = BufferSet::from_pairs([("app.js", "a();")]);
        let mut cache = PreviewCache::new();
        assert!(cache.document(&buffers).as_str().contains("a();"));

        buffers.set_content("main.py", "print(1)");
        cache.note_change("main.py");
        assert!(!cache.is_stale());

        buffers.set_content("app.js", "b();");
        cache.note_change("app.js");
        assert!(cache.is_stale());
        assert!(cache.document(&buffers).as_str().contains("b();"));
    }
}
