use buffers::{BufferSet, DEFAULT_PYTHON_BUFFER, SyntaxMode};

/// Source run when the project has nothing for the runtime.
pub const PLACEHOLDER_SOURCE: &str = "print('Nothing to run: add main.py')";

/// Pick what the runtime should execute: the active buffer if it is a Python
/// file, otherwise `main.py`, otherwise a placeholder notice.
pub fn select_source<'set>(buffers: &'set BufferSet, active: Option<&str>) -> &'set str {
    active
        .filter(|name| SyntaxMode::for_name(name).runs_in_secondary_runtime())
        .and_then(|name| buffers.content(name))
        .or_else(|| buffers.content(DEFAULT_PYTHON_BUFFER))
        .unwrap_or(PLACEHOLDER_SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> BufferSet {
        BufferSet::from_pairs([
            ("index.html", "<p></p>"),
            ("main.py", "print('main')"),
            ("utils.py", "print('utils')"),
        ])
    }

    #[test]
    fn active_python_buffer_wins() {
        assert_eq!(select_source(&project(), Some("utils.py")), "print('utils')");
    }

    #[test]
    fn non_python_active_buffer_falls_back_to_main() {
        assert_eq!(select_source(&project(), Some("index.html")), "print('main')");
        assert_eq!(select_source(&project(), None), "print('main')");
    }

    #[test]
    fn placeholder_when_no_main() {
        let buffers = BufferSet::from_pairs([("app.js", "x")]);
        assert_eq!(select_source(&buffers, Some("app.js")), PLACEHOLDER_SOURCE);
    }
}
