use std::env;
use std::path::PathBuf;

pub const DEFAULT_LEDGER_FILE: &str = "transactions.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ledger_file: PathBuf,
}

impl Config {
    /// Reads `LEDGER_FILE`, falling back to `transactions.csv` in the working directory.
    pub fn from_env() -> Self {
        Self {
            ledger_file: env::var("LEDGER_FILE")
                .unwrap_or_else(|_| DEFAULT_LEDGER_FILE.to_string())
                .into(),
        }
    }

    pub fn with_ledger_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_file = path.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_file: PathBuf::from(DEFAULT_LEDGER_FILE),
        }
    }
}
