//! Preview document composition.
//!
//! The preview frame renders a single self-contained document built from the
//! markup, stylesheet and script buffers. Composition is a pure function of
//! those three texts and never fails.

pub mod cache;
pub mod document;
pub mod prologue;
pub mod strip;

pub use cache::PreviewCache;
pub use document::{ComposedDocument, PreviewSources, compose, compose_buffers};
pub use prologue::console_prologue_js;
pub use strip::strip_document_wrappers;
