use crate::prologue::console_prologue_js;
use crate::strip::strip_document_wrappers;
use buffers::{BufferSet, MARKUP_BUFFER, SCRIPT_BUFFER, STYLESHEET_BUFFER};
use core::fmt::{Display, Formatter, Result as FmtResult};

/// The three texts a preview is built from. Absent buffers are empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewSources<'text> {
    pub markup: &'text str,
    pub stylesheet: &'text str,
    pub script: &'text str,
}

impl<'text> PreviewSources<'text> {
    /// Read the watched buffers out of a buffer set.
    pub fn from_buffers(buffers: &'text BufferSet) -> Self {
        Self {
            markup: buffers.content_or_empty(MARKUP_BUFFER),
            stylesheet: buffers.content_or_empty(STYLESHEET_BUFFER),
            script: buffers.content_or_empty(SCRIPT_BUFFER),
        }
    }
}

/// A complete preview document, ready to load into a sandboxed frame or to
/// save as a standalone HTML file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedDocument(String);

impl ComposedDocument {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ComposedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ComposedDocument {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(&self.0)
    }
}

/// Build the preview document.
///
/// Layout: a fixed head with charset/viewport metadata and the stylesheet in a
/// `<style>` block, then a body holding the unwrapped markup, the console
/// prologue and finally the user script.
pub fn compose(sources: &PreviewSources<'_>) -> ComposedDocument {
    let body = strip_document_wrappers(sources.markup);
    let prologue = console_prologue_js();
    let html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"/>\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>\
<style>{stylesheet}</style></head><body>{body}\
\n<script>{prologue}</script>\n<script>\n{script}\n</script></body></html>",
        stylesheet = sources.stylesheet,
        script = sources.script,
    );
    ComposedDocument(html)
}

/// Compose straight from a buffer set.
#[inline]
pub fn compose_buffers(buffers: &BufferSet) -> ComposedDocument {
    compose(&PreviewSources::from_buffers(buffers))
}
