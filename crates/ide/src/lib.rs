//! Editing session tying the buffers, the preview compositor, the console
//! bridge and the runtime loader together.

pub mod config;
pub mod session;

pub use config::{DEFAULT_EXPORT_FILE, DEFAULT_PROJECT_FILE, IdeConfig};
pub use session::{IdeSession, RunOutcome};
