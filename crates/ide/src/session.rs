//! One editing session: the project's buffers, the active buffer, the shared
//! console and the lazily loaded secondary runtime.

use crate::config::IdeConfig;
use anyhow::{Context as _, Result};
use buffers::{
    Buffer, BufferError, BufferSet, MARKUP_BUFFER, SyntaxMode, default_project, from_project_json,
    to_project_json,
};
use compositor::{ComposedDocument, PreviewCache};
use console::{BridgeSender, ConsoleListener, OutputLog, console_bridge};
use log::{debug, info, warn};
use runtime_loader::{
    AcquireError, HttpFetcher, ResourceFetcher, RuntimeLoader, RuntimeLocations, RuntimeStatus,
    SELF_TEST_SOURCE, ScriptHost, StrategyContext, default_strategies, select_source,
};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// What [`IdeSession::run`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The web preview was rebuilt; load this document into the preview frame.
    Preview(ComposedDocument),
    /// The active Python buffer (or `main.py`) ran in the secondary runtime.
    Runtime,
}

pub struct IdeSession {
    config: IdeConfig,
    buffers: BufferSet,
    active: String,
    log: OutputLog,
    bridge: BridgeSender,
    listener: ConsoleListener,
    loader: RuntimeLoader,
    preview: PreviewCache,
}

impl IdeSession {
    /// Open a session on the starter project.
    ///
    /// `host` evaluates the runtime code; `fetcher` downloads it.
    ///
    /// # Errors
    /// Fails if the configured runtime base is not a usable URL.
    pub fn new(
        config: IdeConfig,
        host: Arc<dyn ScriptHost>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Result<Self> {
        let locations = RuntimeLocations::parse(&config.runtime_base)?;
        let log = OutputLog::new();
        let (bridge, listener) = console_bridge(log.clone());
        let context = StrategyContext {
            host,
            fetcher,
            locations,
            bridge: bridge.clone(),
        };
        let loader = RuntimeLoader::new(default_strategies(&context), log.clone(), bridge.clone());
        Ok(Self {
            config,
            buffers: default_project(),
            active: MARKUP_BUFFER.to_owned(),
            log,
            bridge,
            listener,
            loader,
            preview: PreviewCache::new(),
        })
    }

    /// Open a session that downloads the runtime over HTTP.
    ///
    /// This is the entry point for embedders. `host` is the embedder's binding
    /// to the realm that evaluates the downloaded runtime: it must import the
    /// fetched module and return its exported factory, evaluate the classic
    /// script so that it installs the `loadPyodide` global, and look that
    /// global up. The factories it returns must produce runtimes that accept
    /// the host channel before the stdio redirect prelude runs.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built or the runtime base is invalid.
    pub fn with_http(config: IdeConfig, host: Arc<dyn ScriptHost>) -> Result<Self> {
        let fetcher: Arc<dyn ResourceFetcher> = Arc::new(HttpFetcher::new()?);
        Self::new(config, host, fetcher)
    }

    #[inline]
    pub fn config(&self) -> &IdeConfig {
        &self.config
    }

    #[inline]
    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    /// Name of the buffer being edited.
    #[inline]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Editor mode for the active buffer.
    #[inline]
    pub fn syntax_mode(&self) -> SyntaxMode {
        SyntaxMode::for_name(&self.active)
    }

    #[inline]
    pub fn runtime_status(&self) -> RuntimeStatus {
        self.loader.status()
    }

    /// Make `name` the active buffer. Returns false if there is no such buffer.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.buffers.contains(name) {
            return false;
        }
        name.clone_into(&mut self.active);
        true
    }

    /// Replace a buffer's text, creating the buffer if needed.
    pub fn set_content(&mut self, name: &str, content: impl Into<String>) {
        self.buffers.set_content(name, content);
        self.preview.note_change(name);
    }

    /// Add an empty buffer and switch to it.
    ///
    /// # Errors
    /// Fails if the name is blank or already taken; nothing changes then.
    pub fn add_buffer(&mut self, name: &str) -> Result<(), BufferError> {
        self.buffers.add(name)?;
        self.preview.note_change(name);
        name.clone_into(&mut self.active);
        debug!("Added buffer {name}");
        Ok(())
    }

    /// Remove a buffer. The first remaining buffer becomes active; when none
    /// remain the active name is left as it was.
    pub fn delete_buffer(&mut self, name: &str) -> Option<Buffer> {
        let removed = self.buffers.remove(name)?;
        self.preview.note_change(name);
        if let Some(first) = self.buffers.first_name() {
            first.clone_into(&mut self.active);
        }
        debug!("Deleted buffer {name}");
        Some(removed)
    }

    /// The composed preview document, recomposed only after a watched buffer
    /// changed.
    pub fn preview(&mut self) -> &ComposedDocument {
        self.preview.document(&self.buffers)
    }

    /// Run the active buffer: Python buffers go to the secondary runtime,
    /// everything else rebuilds the web preview.
    ///
    /// # Errors
    /// Returns runtime acquisition failures.
    pub async fn run(&mut self) -> Result<RunOutcome, AcquireError> {
        if self.syntax_mode().runs_in_secondary_runtime() {
            self.run_python().await?;
            return Ok(RunOutcome::Runtime);
        }
        Ok(RunOutcome::Preview(self.run_web()))
    }

    /// Clear the console and hand out the document to load into the preview
    /// frame. The frame's own console output arrives through [`Self::bridge_sender`].
    pub fn run_web(&mut self) -> ComposedDocument {
        self.pump_console();
        self.log.clear();
        self.preview().clone()
    }

    /// Run the active Python buffer, `main.py`, or a placeholder notice.
    ///
    /// Errors raised by the code become a console line. Acquisition failures
    /// are added to the console too and returned.
    ///
    /// # Errors
    /// Returns the acquisition error when the runtime could not be loaded.
    pub async fn run_python(&mut self) -> Result<(), AcquireError> {
        let source = select_source(&self.buffers, Some(self.active.as_str())).to_owned();
        self.execute(&source).await
    }

    /// Run a one-line smoke test in the runtime.
    ///
    /// # Errors
    /// Returns the acquisition error when the runtime could not be loaded.
    pub async fn test_runtime(&mut self) -> Result<(), AcquireError> {
        self.execute(SELF_TEST_SOURCE).await
    }

    async fn execute(&mut self, source: &str) -> Result<(), AcquireError> {
        self.pump_console();
        self.log.clear();
        let outcome = self.loader.execute(source).await;
        self.pump_console();
        if let Err(err) = &outcome {
            warn!("Python run aborted: {err}");
            self.log.append_line(err.to_string());
        }
        outcome
    }

    pub fn clear_console(&mut self) {
        self.pump_console();
        self.log.clear();
    }

    /// The console as shown to the user: every line followed by a newline.
    pub fn console_text(&mut self) -> String {
        self.pump_console();
        self.log.text()
    }

    /// Relay every queued inbox message into the console.
    pub fn pump_console(&mut self) -> usize {
        self.listener.pump()
    }

    /// Sender to hand to preview frames so their console output reaches this
    /// session.
    #[inline]
    pub fn bridge_sender(&self) -> BridgeSender {
        self.bridge.clone()
    }

    /// Save the project to the configured project file.
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub async fn save_project(&self) -> Result<()> {
        let path = self.config.project_file.clone();
        self.save_project_to(&path).await
    }

    /// # Errors
    /// Fails if the file cannot be written.
    pub async fn save_project_to(&self, path: &Path) -> Result<()> {
        let text = to_project_json(&self.buffers)?;
        fs::write(path, text)
            .await
            .with_context(|| format!("Failed to write project {}", path.display()))?;
        info!("Saved {} buffers to {}", self.buffers.len(), path.display());
        Ok(())
    }

    /// Load the project from the configured project file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not a project.
    pub async fn load_project(&mut self) -> Result<()> {
        let path = self.config.project_file.clone();
        self.load_project_from(&path).await
    }

    /// Replace every buffer with the project at `path` and activate its first
    /// buffer. On error the session is left untouched.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not a project.
    pub async fn load_project_from(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read project {}", path.display()))?;
        self.load_project_text(&text)
    }

    /// Replace every buffer with the project in `text`.
    ///
    /// # Errors
    /// Fails if `text` is not a project; the session is left untouched.
    pub fn load_project_text(&mut self, text: &str) -> Result<()> {
        let loaded = from_project_json(text)?;
        if let Some(first) = loaded.first_name() {
            first.clone_into(&mut self.active);
        }
        self.buffers = loaded;
        self.preview.invalidate();
        info!("Loaded project with {} buffers", self.buffers.len());
        Ok(())
    }

    /// Export the preview to the configured export file.
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub async fn export_html(&mut self) -> Result<()> {
        let path = self.config.export_file.clone();
        self.export_html_to(&path).await
    }

    /// Write the composed preview as a standalone HTML file.
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub async fn export_html_to(&mut self, path: &Path) -> Result<()> {
        let document = self.preview().clone();
        fs::write(path, document.as_str())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Exported preview to {}", path.display());
        Ok(())
    }
}
