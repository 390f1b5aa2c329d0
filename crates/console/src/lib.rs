//! Console relay between isolated execution contexts and the host.
//!
//! Isolated code (the preview frame, the secondary runtime) cannot call into
//! the host. It can only post messages. Console output is posted as text
//! carrying [`CONSOLE_TAG`]; a single [`ConsoleListener`] filters the inbox by
//! that tag and appends the payload to the shared [`OutputLog`].

pub mod bridge;
pub mod message;
pub mod output;
pub mod writer;

pub use bridge::{BridgeSender, ConsoleListener, console_bridge};
pub use message::{CONSOLE_TAG, HostMessage, console_payload, tag_console_text};
pub use output::OutputLog;
pub use writer::ConsoleWriter;
