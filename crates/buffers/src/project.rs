//! Project file format: a JSON object mapping buffer names to their text.
//!
//! There is no schema version. Keys are written in buffer order and read back
//! in document order, so a save/load cycle reproduces the same set.

use crate::set::BufferSet;
use crate::{DEFAULT_PYTHON_BUFFER, MARKUP_BUFFER, SCRIPT_BUFFER, STYLESHEET_BUFFER};
use anyhow::{Context as _, Result};
use log::debug;

const DEFAULT_MARKUP: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Preview</title>
    <link rel="stylesheet" href="styles.css" />
  </head>
  <body>
    <div id="app">Hello from HTML</div>
    <script src="app.js"></script>
  </body>
</html>"#;

const DEFAULT_STYLESHEET: &str = "body { margin: 0; padding: 2rem; font-family: system-ui, sans-serif; }
#app { padding: 1rem; border: 2px dashed #aaa; border-radius: 1rem; }
";

const DEFAULT_SCRIPT: &str = "const app = document.getElementById('app');
app.innerHTML = 'Hello from <strong>JavaScript</strong>!';
console.log('JS is running!');
";

const DEFAULT_PYTHON: &str = "# Runs inside the embedded Python runtime
print('Hello from Python')
for i in range(3):
    print('Line', i + 1)
";

/// The starter project every new session opens with.
pub fn default_project() -> BufferSet {
    BufferSet::from_pairs([
        (MARKUP_BUFFER, DEFAULT_MARKUP),
        (STYLESHEET_BUFFER, DEFAULT_STYLESHEET),
        (SCRIPT_BUFFER, DEFAULT_SCRIPT),
        (DEFAULT_PYTHON_BUFFER, DEFAULT_PYTHON),
    ])
}

/// Serialize a buffer set as pretty-printed project JSON.
///
/// # Errors
/// Returns an error only if serialization itself fails.
pub fn to_project_json(buffers: &BufferSet) -> Result<String> {
    serde_json::to_string_pretty(buffers).context("Failed to serialize project")
}

/// Parse project JSON into a buffer set.
///
/// # Errors
/// Returns an error if the text is not JSON or is not an object of strings.
pub fn from_project_json(text: &str) -> Result<BufferSet> {
    let buffers: BufferSet = serde_json::from_str(text).context("Invalid project file")?;
    debug!("Parsed project with {} buffers", buffers.len());
    Ok(buffers)
}
