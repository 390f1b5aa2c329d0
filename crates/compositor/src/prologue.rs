//! Instrumentation evaluated in the preview frame before user script.

use console::CONSOLE_TAG;

/// Return a small JavaScript snippet that wraps `console.log` inside the
/// preview frame. Each call serializes its arguments (`JSON.stringify` for
/// objects, `String()` otherwise), space-joins them, posts
/// `<tag><joined-args>` to the parent, then runs the original `console.log`.
pub fn console_prologue_js() -> String {
    format!(
        "
  (function(){{
    var original = console.log;
    console.log = function(){{
      try {{
        var parts = [];
        for (var i = 0; i < arguments.length; i++) {{
          var value = arguments[i];
          parts.push(typeof value === 'object' ? JSON.stringify(value) : String(value));
        }}
        parent.postMessage('{CONSOLE_TAG}' + parts.join(' '), '*');
      }} catch (_) {{ /* ignore */ }}
      return original.apply(console, arguments);
    }};
  }})();
"
    )
}
