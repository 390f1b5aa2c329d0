//! Save/load behavior of the project JSON format.

use anyhow::Result;
use buffers::{BufferSet, default_project, from_project_json, to_project_json};

/// A saved project loads back buffer-for-buffer, in the same order.
#[test]
fn saved_project_loads_back_identically() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut project = default_project();
    project.set_content("zeta.py", "print('z')\n");
    project.set_content("notes.md", "unicode: \u{1F40D} and \"quotes\"");

    let json = to_project_json(&project)?;
    let loaded = from_project_json(&json)?;

    assert_eq!(loaded, project);
    assert_eq!(loaded.first_name(), Some("index.html"));
    Ok(())
}

/// Key order in the file decides buffer order, not alphabetical order.
#[test]
fn document_key_order_is_preserved() -> Result<()> {
    let loaded = from_project_json(r#"{"z.js": "1", "a.css": "2", "m.html": "3"}"#)?;
    assert_eq!(loaded.names().collect::<Vec<_>>(), ["z.js", "a.css", "m.html"]);
    Ok(())
}

/// An empty object is a valid, empty project.
#[test]
fn empty_object_is_an_empty_project() -> Result<()> {
    let loaded = from_project_json("{}")?;
    assert_eq!(loaded, BufferSet::new());
    Ok(())
}
