use syntect::parsing::SyntaxSet;

use super::text_ops::label_extension;

pub const PLAIN_TEXT: &str = "Plain Text";

/// Maps label names to the syntax hint handed to the buffer.
pub struct SyntaxCatalog {
    syntax_set: SyntaxSet,
}

impl SyntaxCatalog {
    pub fn load_defaults() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Detect the syntax for a label based on its extension.
    pub fn detect(&self, label: &str) -> Option<&str> {
        let ext = label_extension(label)?;
        let syntax = self.syntax_set.find_syntax_by_extension(ext)?;
        if syntax.name == PLAIN_TEXT {
            return None;
        }
        Some(syntax.name.as_str())
    }

    /// Like [`detect`](Self::detect) but falls back to plain text.
    pub fn hint_for(&self, label: &str) -> &str {
        self.detect(label).unwrap_or(PLAIN_TEXT)
    }
}

impl Default for SyntaxCatalog {
    fn default() -> Self {
        Self::load_defaults()
    }
}
