use crate::host::SecondaryRuntime;
use anyhow::{Context as _, Result};
use console::{BridgeSender, CONSOLE_TAG};

/// Return the Python snippet that replaces `sys.stdout` and `sys.stderr`
/// with a stream posting `<tag><text>` to the host for every write. Posting
/// errors are swallowed inside the runtime; `flush` does nothing.
pub fn stdio_redirect_prelude() -> String {
    format!(
        "import sys
from js import window

class _HostConsole:
    def write(self, text):
        try:
            window.postMessage('{CONSOLE_TAG}' + str(text), '*')
        except Exception:
            pass

    def flush(self):
        pass

sys.stdout = _HostConsole()
sys.stderr = _HostConsole()
"
    )
}

/// Route the runtime's standard streams through the console bridge.
///
/// # Errors
/// Fails if the runtime rejects the host channel or the prelude raises.
pub async fn install_stdio_redirect(runtime: &dyn SecondaryRuntime, sender: BridgeSender) -> Result<()> {
    runtime
        .expose_host_channel(sender)
        .context("Runtime refused the host channel")?;
    runtime
        .run(&stdio_redirect_prelude())
        .await
        .context("Failed to redirect runtime stdout/stderr")
}
