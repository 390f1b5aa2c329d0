//! Composition of whole projects into preview documents.

use buffers::{BufferSet, default_project};
use compositor::{ComposedDocument, compose_buffers};

/// Composing the same buffers twice gives byte-identical documents.
#[test]
fn composition_is_idempotent() {
    let _ = env_logger::builder().is_test(true).try_init();

    let project = default_project();
    let first = compose_buffers(&project);
    let second = compose_buffers(&project);
    assert_eq!(first, second);
}

/// With none of the watched buffers present, the result is still a complete
/// page with an empty style block and an empty user script.
#[test]
fn absent_buffers_compose_to_an_empty_page() {
    let document = compose_buffers(&BufferSet::from_pairs([("main.py", "print(1)")]));
    let html = document.as_str();

    assert!(html.starts_with("<!DOCTYPE html><html><head>"));
    assert!(html.contains("<style></style>"));
    assert!(html.ends_with("<script>\n\n</script></body></html>"));
    assert!(!html.contains("print(1)"));
}

/// The starter markup loses its own document wrappers; the default head
/// content stays inside the preview body.
#[test]
fn default_project_markup_is_unwrapped() {
    let document: ComposedDocument = compose_buffers(&default_project());
    let html = document.to_string();

    assert_eq!(html.matches("<html").count(), 1);
    assert_eq!(html.matches("</html>").count(), 1);
    assert_eq!(html.matches("<body").count(), 1);
    assert_eq!(html.matches("</body>").count(), 1);
    assert!(html.contains("<div id=\"app\">Hello from HTML</div>"));
    assert!(html.contains("console.log('JS is running!');"));
    assert!(html.contains("#app { padding: 1rem;"));
}
