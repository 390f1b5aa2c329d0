//! Named text buffers edited by the IDE session.
//!
//! A [`BufferSet`] is the single owner of every source file in a project.
//! Lookups are by name; iteration follows insertion order, which decides the
//! next active buffer after a deletion and the key order of saved projects.

pub mod buffer;
pub mod project;
pub mod set;

pub use buffer::{Buffer, SyntaxMode};
pub use project::{default_project, from_project_json, to_project_json};
pub use set::{BufferError, BufferSet};

/// Markup buffer watched by the preview compositor.
pub const MARKUP_BUFFER: &str = "index.html";
/// Stylesheet buffer watched by the preview compositor.
pub const STYLESHEET_BUFFER: &str = "styles.css";
/// Script buffer watched by the preview compositor.
pub const SCRIPT_BUFFER: &str = "app.js";
/// Conventional entry point for the secondary runtime.
pub const DEFAULT_PYTHON_BUFFER: &str = "main.py";

/// Returns true if `name` is one of the buffers the preview is composed from.
#[inline]
pub fn is_watched(name: &str) -> bool {
    matches!(name, MARKUP_BUFFER | STYLESHEET_BUFFER | SCRIPT_BUFFER)
}
