//! In-memory doubles for the host realm, the fetcher and the runtime, shared
//! by this crate's tests and by the IDE session tests.
//!
//! [`ScriptedRuntime`] understands just enough Python to drive the console
//! path: `print(...)` with string or number literals, `raise Name('msg')`,
//! comments, and the stdio redirect prelude. Every other line is ignored.

use crate::fetch::ResourceFetcher;
use crate::host::{RuntimeConfig, RuntimeFactory, RuntimeHandle, ScriptHost, SecondaryRuntime};
use crate::strategy::{AcquireStrategy, GLOBAL_FACTORY};
use anyhow::{Result, anyhow};
use console::{BridgeSender, ConsoleWriter};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// Serves fixed texts by URL and counts requests.
#[derive(Default)]
pub struct StaticFetcher {
    resources: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `url`.
    #[must_use]
    pub fn with(mut self, url: &Url, text: &str) -> Self {
        self.resources.insert(url.to_string(), text.to_owned());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ResourceFetcher for StaticFetcher {
    fn fetch_text<'call>(&'call self, url: &'call Url) -> BoxFuture<'call, Result<String>> {
        Box::pin(async move {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(url.to_string());
            self.resources
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| anyhow!("Failed to fetch URL: {url} (Status: 404 Not Found)"))
        })
    }
}

/// Runtime executing the tiny Python subset described in the module docs.
#[derive(Default)]
pub struct ScriptedRuntime {
    channel: Mutex<Option<BridgeSender>>,
    stdout: Mutex<Option<ConsoleWriter>>,
    runs: AtomicUsize,
    refuse_channel: bool,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `run` calls, including the redirect prelude.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::Acquire)
    }

    /// True once the redirect prelude has run.
    pub fn is_redirected(&self) -> bool {
        self.stdout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn redirect(&self) -> Result<()> {
        let channel = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| anyhow!("NameError: name 'window' is not defined"))?;
        *self.stdout.lock().unwrap_or_else(PoisonError::into_inner) = Some(channel.console_writer());
        Ok(())
    }

    fn write(&self, text: &str) -> Result<()> {
        if let Some(stdout) = self.stdout.lock().unwrap_or_else(PoisonError::into_inner).as_mut() {
            stdout.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn run_line(&self, line: &str) -> Result<()> {
        if let Some(arguments) = line.strip_prefix("print(").and_then(|rest| rest.strip_suffix(')')) {
            let rendered = parse_literals(arguments)?.join(" ");
            self.write(&rendered)?;
            return self.write("\n");
        }
        if let Some(raised) = line.strip_prefix("raise ") {
            let (name, message) = raised
                .split_once('(')
                .map_or((raised, ""), |(name, rest)| (name, rest.trim_end_matches(')')));
            let message = parse_literals(message)?.join(" ");
            return Err(anyhow!("{name}: {message}"));
        }
        Ok(())
    }
}

/// Split `print` arguments into rendered literals.
fn parse_literals(arguments: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    let mut rest = arguments.trim();
    while !rest.is_empty() {
        let quote = rest.chars().next().filter(|first| *first == '\'' || *first == '"');
        let (value, remainder) = match quote {
            Some(quote) => {
                let body = rest.get(1..).unwrap_or_default();
                let end = body
                    .find(quote)
                    .ok_or_else(|| anyhow!("SyntaxError: unterminated string literal"))?;
                (body.get(..end).unwrap_or_default(), body.get(end + 1..).unwrap_or_default())
            }
            None => rest.split_once(',').unwrap_or((rest, "")),
        };
        values.push(value.trim().to_owned());
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }
    Ok(values)
}

impl SecondaryRuntime for ScriptedRuntime {
    fn expose_host_channel(&self, sender: BridgeSender) -> Result<()> {
        if self.refuse_channel {
            return Err(anyhow!("host channel is not reachable from this runtime"));
        }
        *self.channel.lock().unwrap_or_else(PoisonError::into_inner) = Some(sender);
        Ok(())
    }

    fn run<'call>(&'call self, source: &'call str) -> BoxFuture<'call, Result<()>> {
        Box::pin(async move {
            self.runs.fetch_add(1, Ordering::AcqRel);
            if source.contains("sys.stdout =") {
                return self.redirect();
            }
            for line in source.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                self.run_line(line)?;
            }
            Ok(())
        })
    }
}

/// Factory handing out [`ScriptedRuntime`]s. Optionally waits on a gate
/// before finishing so tests can observe the `Loading` state.
#[derive(Default)]
pub struct ScriptedFactory {
    instantiations: AtomicUsize,
    gate: Option<Arc<Notify>>,
    last: Mutex<Option<Arc<ScriptedRuntime>>>,
    configs: Mutex<Vec<RuntimeConfig>>,
    refuse_channel: bool,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory that blocks in `instantiate` until the returned gate is notified.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let factory = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (factory, gate)
    }

    /// A factory whose runtimes reject the host channel, so the stdio
    /// redirect cannot be installed.
    pub fn refusing_host_channel() -> Self {
        Self {
            refuse_channel: true,
            ..Self::default()
        }
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations.load(Ordering::Acquire)
    }

    /// The most recently created runtime.
    pub fn last_runtime(&self) -> Option<Arc<ScriptedRuntime>> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Configs passed to `instantiate`, in order.
    pub fn configs(&self) -> Vec<RuntimeConfig> {
        self.configs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RuntimeFactory for ScriptedFactory {
    fn instantiate<'call>(
        &'call self,
        config: &'call RuntimeConfig,
    ) -> BoxFuture<'call, Result<RuntimeHandle>> {
        Box::pin(async move {
            self.instantiations.fetch_add(1, Ordering::AcqRel);
            self.configs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(config.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let runtime = Arc::new(ScriptedRuntime {
                refuse_channel: self.refuse_channel,
                ..ScriptedRuntime::default()
            });
            *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&runtime));
            let handle: RuntimeHandle = runtime;
            Ok(handle)
        })
    }
}

/// How [`ScriptedHost::import_module`] behaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleBehavior {
    /// Return the factory.
    Export,
    /// Fail as if the host cannot load modules.
    Reject(String),
}

/// Host realm double. Classic scripts install the factory as
/// [`GLOBAL_FACTORY`] unless configured otherwise.
pub struct ScriptedHost {
    factory: Arc<ScriptedFactory>,
    module_factory: Option<Arc<ScriptedFactory>>,
    module: ModuleBehavior,
    script_installs_global: bool,
    globals: Mutex<HashMap<String, Arc<dyn RuntimeFactory>>>,
    imports: AtomicUsize,
    script_evals: AtomicUsize,
}

impl ScriptedHost {
    pub fn new(factory: Arc<ScriptedFactory>) -> Self {
        Self {
            factory,
            module_factory: None,
            module: ModuleBehavior::Export,
            script_installs_global: true,
            globals: Mutex::new(HashMap::new()),
            imports: AtomicUsize::new(0),
            script_evals: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_module_behavior(mut self, behavior: ModuleBehavior) -> Self {
        self.module = behavior;
        self
    }

    /// Export `factory` from the module instead of the shared one.
    #[must_use]
    pub fn with_module_factory(mut self, factory: Arc<ScriptedFactory>) -> Self {
        self.module_factory = Some(factory);
        self
    }

    /// Classic scripts evaluate without installing the global.
    #[must_use]
    pub fn without_script_global(mut self) -> Self {
        self.script_installs_global = false;
        self
    }

    /// Pretend the classic script already ran.
    pub fn preinstall_global(&self) {
        let factory: Arc<dyn RuntimeFactory> = Arc::clone(&self.factory) as Arc<dyn RuntimeFactory>;
        self.globals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(GLOBAL_FACTORY.to_owned(), factory);
    }

    pub fn imports(&self) -> usize {
        self.imports.load(Ordering::Acquire)
    }

    pub fn script_evals(&self) -> usize {
        self.script_evals.load(Ordering::Acquire)
    }
}

impl ScriptHost for ScriptedHost {
    fn import_module<'call>(
        &'call self,
        url: &'call Url,
        _source: String,
    ) -> BoxFuture<'call, Result<Arc<dyn RuntimeFactory>>> {
        Box::pin(async move {
            self.imports.fetch_add(1, Ordering::AcqRel);
            match &self.module {
                ModuleBehavior::Export => {
                    let factory = self.module_factory.as_ref().unwrap_or(&self.factory);
                    Ok(Arc::clone(factory) as Arc<dyn RuntimeFactory>)
                }
                ModuleBehavior::Reject(reason) => Err(anyhow!("Cannot import {url}: {reason}")),
            }
        })
    }

    fn eval_classic_script(&self, _url: &Url, _source: &str) -> Result<()> {
        self.script_evals.fetch_add(1, Ordering::AcqRel);
        if self.script_installs_global {
            self.preinstall_global();
        }
        Ok(())
    }

    fn global_factory(&self, name: &str) -> Option<Arc<dyn RuntimeFactory>> {
        self.globals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Arc::clone)
    }
}

/// Strategy double with a fixed outcome and a call counter.
pub struct ScriptedStrategy {
    name: &'static str,
    factory: Option<Arc<ScriptedFactory>>,
    calls: AtomicUsize,
    panic_first: bool,
}

impl ScriptedStrategy {
    /// Succeeds with runtimes from `factory`.
    pub fn succeeding(name: &'static str, factory: Arc<ScriptedFactory>) -> Self {
        Self {
            name,
            factory: Some(factory),
            calls: AtomicUsize::new(0),
            panic_first: false,
        }
    }

    /// Panics on the first call, then succeeds with runtimes from `factory`.
    pub fn panicking_once(name: &'static str, factory: Arc<ScriptedFactory>) -> Self {
        Self {
            panic_first: true,
            ..Self::succeeding(name, factory)
        }
    }

    /// Always fails.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            factory: None,
            calls: AtomicUsize::new(0),
            panic_first: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

impl AcquireStrategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    #[expect(clippy::panic, reason = "exercises a strategy that unwinds")]
    fn acquire(&self) -> BoxFuture<'_, Result<RuntimeHandle>> {
        Box::pin(async move {
            let earlier = self.calls.fetch_add(1, Ordering::AcqRel);
            if self.panic_first && earlier == 0 {
                panic!("{} host binding crashed", self.name);
            }
            let factory = self
                .factory
                .as_ref()
                .ok_or_else(|| anyhow!("{} unavailable", self.name))?;
            let config = RuntimeConfig {
                index_url: Url::parse("memory://runtime/")?,
            };
            factory.instantiate(&config).await
        })
    }
}
