//! The two ways of obtaining a runtime factory from the hosted distribution.

use crate::fetch::ResourceFetcher;
use crate::host::{RuntimeConfig, RuntimeFactory, RuntimeHandle, ScriptHost};
use crate::locations::RuntimeLocations;
use crate::redirect::install_stdio_redirect;
use anyhow::{Context as _, Result, anyhow};
use console::BridgeSender;
use futures::future::BoxFuture;
use log::{debug, info};
use std::sync::Arc;

/// Global installed by the classic runtime script.
pub const GLOBAL_FACTORY: &str = "loadPyodide";

/// One way of producing an initialized runtime.
pub trait AcquireStrategy: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Produce a runtime with stdout/stderr already redirected to the host.
    fn acquire(&self) -> BoxFuture<'_, Result<RuntimeHandle>>;
}

/// Everything the built-in strategies need from the session.
#[derive(Clone)]
pub struct StrategyContext {
    pub host: Arc<dyn ScriptHost>,
    pub fetcher: Arc<dyn ResourceFetcher>,
    pub locations: RuntimeLocations,
    pub bridge: BridgeSender,
}

impl StrategyContext {
    /// Instantiate through `factory` and hook the runtime's streams up to the
    /// console bridge.
    async fn boot(&self, factory: &dyn RuntimeFactory) -> Result<RuntimeHandle> {
        let config = RuntimeConfig {
            index_url: self.locations.index_url().clone(),
        };
        let runtime = factory
            .instantiate(&config)
            .await
            .context("Runtime factory failed")?;
        install_stdio_redirect(runtime.as_ref(), self.bridge.clone()).await?;
        Ok(runtime)
    }
}

/// Imports the ES module build and calls its exported factory.
pub struct ModuleStrategy {
    context: StrategyContext,
}

impl ModuleStrategy {
    #[inline]
    pub fn new(context: StrategyContext) -> Self {
        Self { context }
    }
}

impl AcquireStrategy for ModuleStrategy {
    fn name(&self) -> &'static str {
        "module"
    }

    fn acquire(&self) -> BoxFuture<'_, Result<RuntimeHandle>> {
        Box::pin(async move {
            let module_url = self.context.locations.module_url();
            debug!("Importing runtime module {module_url}");
            let source = self.context.fetcher.fetch_text(module_url).await?;
            let factory = self
                .context
                .host
                .import_module(module_url, source)
                .await
                .with_context(|| format!("Failed to import {module_url}"))?;
            let runtime = self.context.boot(factory.as_ref()).await?;
            info!("Runtime loaded from module {module_url}");
            Ok(runtime)
        })
    }
}

/// Loads the classic script build, which installs [`GLOBAL_FACTORY`] on the
/// host, then calls that global. The fetch is skipped when the global is
/// already present.
pub struct ScriptGlobalStrategy {
    context: StrategyContext,
}

impl ScriptGlobalStrategy {
    #[inline]
    pub fn new(context: StrategyContext) -> Self {
        Self { context }
    }

    async fn factory(&self) -> Result<Arc<dyn RuntimeFactory>> {
        let host = &self.context.host;
        if let Some(factory) = host.global_factory(GLOBAL_FACTORY) {
            debug!("{GLOBAL_FACTORY} already installed; skipping script fetch");
            return Ok(factory);
        }
        let script_url = self.context.locations.script_url();
        debug!("Loading runtime script {script_url}");
        let source = self.context.fetcher.fetch_text(script_url).await?;
        host.eval_classic_script(script_url, &source)
            .with_context(|| format!("Failed to evaluate {script_url}"))?;
        host.global_factory(GLOBAL_FACTORY)
            .ok_or_else(|| anyhow!("{script_url} did not install {GLOBAL_FACTORY}"))
    }
}

impl AcquireStrategy for ScriptGlobalStrategy {
    fn name(&self) -> &'static str {
        "script"
    }

    fn acquire(&self) -> BoxFuture<'_, Result<RuntimeHandle>> {
        Box::pin(async move {
            let factory = self.factory().await?;
            let runtime = self.context.boot(factory.as_ref()).await?;
            info!("Runtime loaded from script global {GLOBAL_FACTORY}");
            Ok(runtime)
        })
    }
}

/// Module import first, classic script as fallback.
pub fn default_strategies(context: &StrategyContext) -> Vec<Arc<dyn AcquireStrategy>> {
    let module: Arc<dyn AcquireStrategy> = Arc::new(ModuleStrategy::new(context.clone()));
    let script: Arc<dyn AcquireStrategy> = Arc::new(ScriptGlobalStrategy::new(context.clone()));
    vec![module, script]
}
