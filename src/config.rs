//! Start-up options threaded from the CLI into the editor.

use std::path::PathBuf;

/// Prefix used for newly allocated ids when none is given.
pub const DEFAULT_PREFIX: &str = "prefix";

/// Width of the numeric part of newly allocated ids.
pub const DEFAULT_ID_DIGITS: usize = 4;

/// Resolved start-up configuration. Passed explicitly into the TUI; there is
/// no ambient mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Hints file to open at start, when present on disk.
    pub path: Option<PathBuf>,
    /// Prefix for newly allocated entry and item ids.
    pub prefix: String,
    /// Width of the numeric part of new ids.
    pub id_digits: usize,
    /// Save before each interaction and again at shutdown.
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            prefix: DEFAULT_PREFIX.to_string(),
            id_digits: DEFAULT_ID_DIGITS,
            autosave: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.prefix, "prefix");
        assert_eq!(cfg.id_digits, 4);
        assert!(!cfg.autosave);
        assert!(cfg.path.is_none());
    }
}
