use serde::{Deserialize, Serialize};

/// How documents are rendered to text.
///
/// Defaults to 4-space pretty printing. Missing fields fall back to their
/// defaults, so `{"pretty": false}` is a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFormat {
    pub pretty: bool,
    /// Spaces per nesting level. Only meaningful when `pretty` is set.
    pub indent: usize,
}

impl DocumentFormat {
    /// Single-line output with no whitespace.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
        }
    }

    /// Pretty output with the given indent width.
    pub fn pretty(indent: usize) -> Self {
        Self {
            pretty: true,
            indent,
        }
    }
}

impl Default for DocumentFormat {
    fn default() -> Self {
        Self::pretty(4)
    }
}
