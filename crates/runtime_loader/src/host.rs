//! Capabilities the host realm provides to load and run the runtime.
//!
//! Keep these traits small so the embedding (a browser host, a native shell,
//! a test double) can be swapped without touching the loader.

use anyhow::Result;
use console::BridgeSender;
use futures::future::BoxFuture;
use std::sync::Arc;
use url::Url;

/// Shared handle to an initialized runtime. Cloning is cheap.
pub type RuntimeHandle = Arc<dyn SecondaryRuntime>;

/// An initialized alternate-language engine.
pub trait SecondaryRuntime: Send + Sync {
    /// Make the host inbox reachable from code inside the runtime (the
    /// `window.postMessage` used by the stdio redirect prelude).
    fn expose_host_channel(&self, sender: BridgeSender) -> Result<()>;

    /// Run `source` to completion. Errors raised by the code are returned.
    fn run<'call>(&'call self, source: &'call str) -> BoxFuture<'call, Result<()>>;
}

/// Settings passed to a runtime factory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Where the runtime finds its packages and support files.
    pub index_url: Url,
}

/// Entry point that creates runtimes (the loaded module's export, or the
/// global installed by the classic script).
pub trait RuntimeFactory: Send + Sync {
    fn instantiate<'call>(
        &'call self,
        config: &'call RuntimeConfig,
    ) -> BoxFuture<'call, Result<RuntimeHandle>>;
}

/// The host realm that evaluates fetched runtime code.
pub trait ScriptHost: Send + Sync {
    /// Evaluate `source` as an ES module loaded from `url` and return its
    /// exported factory.
    fn import_module<'call>(
        &'call self,
        url: &'call Url,
        source: String,
    ) -> BoxFuture<'call, Result<Arc<dyn RuntimeFactory>>>;

    /// Evaluate `source` as a classic script in the host document.
    fn eval_classic_script(&self, url: &Url, source: &str) -> Result<()>;

    /// Look up a factory installed as a global by a classic script.
    fn global_factory(&self, name: &str) -> Option<Arc<dyn RuntimeFactory>>;
}
