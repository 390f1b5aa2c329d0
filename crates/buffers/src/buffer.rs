use core::fmt::{Display, Formatter, Result as FmtResult};

/// Editor language selected from a buffer's file suffix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyntaxMode {
    Html,
    Css,
    JavaScript,
    Python,
    PlainText,
}

impl SyntaxMode {
    /// Pick the mode for a buffer name. Unknown suffixes are plain text.
    #[inline]
    pub fn for_name(name: &str) -> Self {
        if name.ends_with(".html") {
            Self::Html
        } else if name.ends_with(".css") {
            Self::Css
        } else if name.ends_with(".js") {
            Self::JavaScript
        } else if name.ends_with(".py") {
            Self::Python
        } else {
            Self::PlainText
        }
    }

    /// Identifier understood by the editor widget.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::PlainText => "plaintext",
        }
    }

    /// True for buffers executed by the secondary runtime rather than the preview.
    #[inline]
    pub const fn runs_in_secondary_runtime(self) -> bool {
        matches!(self, Self::Python)
    }
}

impl Display for SyntaxMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

/// One named source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    name: String,
    content: String,
}

impl Buffer {
    #[inline]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn syntax_mode(&self) -> SyntaxMode {
        SyntaxMode::for_name(&self.name)
    }

    /// Replace the buffer text.
    #[inline]
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}
