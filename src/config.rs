use crate::decimal::Decimal;
use std::path::PathBuf;

/// Environment variable naming the history file when `--history` is not given.
pub const HISTORY_ENV: &str = "DECICALC_HISTORY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Print `14` instead of `14.0000000000`.
    pub trim_trailing_zeros: bool,
    /// Where interactive history is loaded from and saved to.
    pub history_file: Option<PathBuf>,
    pub prompt: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trim_trailing_zeros: false,
            history_file: None,
            prompt: "> ".to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn render(&self, value: &Decimal) -> String {
        if self.trim_trailing_zeros {
            value.to_trimmed_string()
        } else {
            value.to_string()
        }
    }

    /// `log` filter for the binary's logger.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }
}
