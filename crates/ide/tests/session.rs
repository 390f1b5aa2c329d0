//! End-to-end behavior of an editing session with an in-memory runtime host.

use anyhow::{Result, anyhow};
use buffers::{BufferError, SyntaxMode};
use ide::{IdeConfig, IdeSession, RunOutcome};
use runtime_loader::test_support::{ScriptedFactory, ScriptedHost, StaticFetcher};
use runtime_loader::{ResourceFetcher, RuntimeLocations, RuntimeStatus, ScriptHost};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::runtime::Runtime;

const BASE: &str = "https://cdn.example.test/runtime/v1/full/";

fn config() -> IdeConfig {
    IdeConfig::new(BASE, "project.json", "export.html")
}

/// A session whose runtime loads from memory, or fails to load when
/// `reachable` is false.
fn session(reachable: bool) -> Result<IdeSession> {
    let _ = env_logger::builder().is_test(true).try_init();
    let locations = RuntimeLocations::parse(BASE)?;
    let mut fetcher = StaticFetcher::new();
    if reachable {
        fetcher = fetcher.with(locations.module_url(), "export {}");
    }
    let host: Arc<dyn ScriptHost> = Arc::new(ScriptedHost::new(Arc::new(ScriptedFactory::new())));
    let fetcher: Arc<dyn ResourceFetcher> = Arc::new(fetcher);
    IdeSession::new(config(), host, fetcher)
}

#[test]
fn starts_on_the_markup_buffer() -> Result<()> {
    let ide = session(true)?;
    assert_eq!(ide.active(), "index.html");
    assert_eq!(ide.syntax_mode(), SyntaxMode::Html);
    let names: Vec<&str> = ide.buffers().names().collect();
    assert_eq!(names, ["index.html", "styles.css", "app.js", "main.py"]);
    assert_eq!(ide.runtime_status(), RuntimeStatus::Absent);
    Ok(())
}

#[test]
fn add_and_select_buffers() -> Result<()> {
    let mut ide = session(true)?;

    ide.add_buffer("utils.py")?;
    assert_eq!(ide.active(), "utils.py");
    assert_eq!(ide.syntax_mode(), SyntaxMode::Python);
    assert_eq!(ide.buffers().content("utils.py"), Some(""));

    assert_eq!(
        ide.add_buffer("app.js"),
        Err(BufferError::BufferExists("app.js".to_owned()))
    );
    assert_eq!(ide.active(), "utils.py");

    assert!(ide.select("styles.css"));
    assert!(!ide.select("missing.txt"));
    assert_eq!(ide.active(), "styles.css");
    Ok(())
}

#[test]
fn deleting_reassigns_the_active_buffer() -> Result<()> {
    let mut ide = session(true)?;
    ide.load_project_text(r#"{"a.txt": "1", "b.txt": "2", "c.txt": "3"}"#)?;
    assert_eq!(ide.active(), "a.txt");

    assert!(ide.delete_buffer("a.txt").is_some());
    assert_eq!(ide.active(), "b.txt");
    assert!(ide.delete_buffer("missing").is_none());

    assert!(ide.delete_buffer("c.txt").is_some());
    assert!(ide.delete_buffer("b.txt").is_some());
    assert!(ide.buffers().is_empty());
    assert_eq!(ide.active(), "b.txt");
    Ok(())
}

#[test]
fn preview_follows_watched_edits() -> Result<()> {
    let mut ide = session(true)?;
    let before = ide.preview().clone();

    ide.set_content("notes.md", "# not part of the preview");
    assert_eq!(*ide.preview(), before);

    ide.set_content("styles.css", "p { color: red; }");
    assert!(ide.preview().as_str().contains("<style>p { color: red; }</style>"));
    Ok(())
}

#[test]
fn web_run_clears_the_console_and_returns_the_document() -> Result<()> {
    let mut ide = session(true)?;
    let frame = ide.bridge_sender();
    frame.post_console("old output");
    assert_eq!(ide.console_text(), "old output\n");

    let outcome = Runtime::new()?.block_on(ide.run())?;
    let RunOutcome::Preview(document) = outcome else {
        return Err(anyhow!("markup buffer should rebuild the preview"));
    };
    assert!(document.as_str().contains(r#"<div id="app">Hello from HTML</div>"#));
    assert_eq!(ide.console_text(), "");

    frame.post_console("JS is running!");
    frame.post("unrelated message");
    assert_eq!(ide.console_text(), "JS is running!\n");
    Ok(())
}

#[test]
fn python_run_prints_to_the_console() -> Result<()> {
    let mut ide = session(true)?;
    let rt = Runtime::new()?;
    ide.set_content("main.py", "print('Hello from Python')");

    assert_eq!(rt.block_on(ide.run())?, RunOutcome::Preview(ide.preview().clone()));
    assert!(ide.select("main.py"));
    assert_eq!(rt.block_on(ide.run())?, RunOutcome::Runtime);

    assert_eq!(ide.runtime_status(), RuntimeStatus::Ready);
    assert_eq!(ide.console_text(), "Hello from Python\n\n\n");
    Ok(())
}

#[test]
fn python_errors_do_not_break_the_session() -> Result<()> {
    let mut ide = session(true)?;
    let rt = Runtime::new()?;
    ide.add_buffer("broken.py")?;
    ide.set_content("broken.py", "raise RuntimeError('bad')");

    rt.block_on(ide.run_python())?;
    assert_eq!(ide.console_text(), "RuntimeError: bad\n");

    rt.block_on(ide.test_runtime())?;
    assert_eq!(ide.console_text(), "pyodide-test\n\n\n");
    Ok(())
}

#[test]
fn unreachable_runtime_is_reported_and_retried() -> Result<()> {
    let mut ide = session(false)?;
    let rt = Runtime::new()?;
    assert!(ide.select("main.py"));

    assert!(rt.block_on(ide.run()).is_err());
    assert_eq!(ide.runtime_status(), RuntimeStatus::Failed);
    let text = ide.console_text();
    assert!(text.starts_with("Failed to load runtime"), "{text}");
    assert_eq!(text.lines().count(), 1);

    assert!(rt.block_on(ide.test_runtime()).is_err());
    assert_eq!(ide.console_text().lines().count(), 1);
    Ok(())
}

#[test]
fn save_load_and_export_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let project = dir.path().join("project.json");
    let export = dir.path().join("export.html");
    let rt = Runtime::new()?;

    let mut ide = session(true)?;
    ide.add_buffer("notes.md")?;
    ide.set_content("notes.md", "remember");
    rt.block_on(ide.save_project_to(&project))?;
    rt.block_on(ide.export_html_to(&export))?;

    let mut reopened = session(true)?;
    rt.block_on(reopened.load_project_from(&project))?;
    let names: Vec<&str> = reopened.buffers().names().collect();
    assert_eq!(names, ["index.html", "styles.css", "app.js", "main.py", "notes.md"]);
    assert_eq!(reopened.buffers().content("notes.md"), Some("remember"));
    assert_eq!(reopened.active(), "index.html");

    let exported = fs::read_to_string(&export)?;
    assert_eq!(exported, reopened.preview().as_str());
    Ok(())
}

#[test]
fn invalid_project_leaves_the_session_untouched() -> Result<()> {
    let dir = tempdir()?;
    let project = dir.path().join("broken.json");
    fs::write(&project, "{ not json")?;
    let rt = Runtime::new()?;

    let mut ide = session(true)?;
    assert!(ide.select("app.js"));
    let before = ide.buffers().clone();

    let err = rt
        .block_on(ide.load_project_from(&project))
        .err()
        .ok_or_else(|| anyhow!("broken project should not load"))?;
    assert!(format!("{err:#}").contains("Invalid project file"));
    assert_eq!(*ide.buffers(), before);
    assert_eq!(ide.active(), "app.js");

    assert!(rt.block_on(ide.load_project_from(&dir.path().join("missing.json"))).is_err());
    assert_eq!(*ide.buffers(), before);

    ide.load_project_text("{}")?;
    assert!(ide.buffers().is_empty());
    assert_eq!(ide.active(), "app.js");
    Ok(())
}
