use std::env;
use std::fmt;
use std::path::PathBuf;

use loan_engine_core::comparison::DEFAULT_MAX_OPTIONS;

const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_HISTORY_FILE: &str = "loan_history.jsonl";

/// Settings read from the environment (and `.env`) before flags apply.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: String,
    pub max_options: usize,
    pub history_file: PathBuf,
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `load` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("LOAN_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let max_options = match lookup("LOAN_MAX_OPTIONS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidMaxOptions(raw)),
            },
            None => DEFAULT_MAX_OPTIONS,
        };

        let history_file = lookup("LOAN_HISTORY_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));

        Ok(Self {
            log_level,
            max_options,
            history_file,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidMaxOptions(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxOptions(raw) => {
                write!(f, "LOAN_MAX_OPTIONS must be a positive integer, got '{raw}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
