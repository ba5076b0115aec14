//! Command implementations
//!
//! Each subcommand lives in its own module and returns an [`ExitCode`].

pub mod completions;
pub mod records;
pub mod tables;

use clap::Subcommand;

use ab_core::{Base, Config, ConfigManager, Error};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tables of a base
    Tables(tables::TablesArgs),

    /// Read and write records
    #[command(subcommand)]
    Records(records::RecordsCommands),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Connection settings taken from the global flags
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub api_key: Option<String>,
    pub debug: bool,
}

impl Connection {
    /// Config file, then environment, then flags
    fn resolve(&self) -> ab_core::Result<Config> {
        let mut config = ConfigManager::new()?.load()?.apply_env();
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        config.debug |= self.debug;
        Ok(config)
    }
}

/// Open a base, reporting setup failures through `formatter`
pub fn open_base(base_id: &str, connection: &Connection, formatter: &Formatter) -> Result<Base, ExitCode> {
    let config = match connection.resolve() {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("Failed to load config: {e}"));
            return Err(ExitCode::UsageError);
        }
    };

    if config.api_key.is_none() {
        formatter.error("No API key configured (use --api-key or set AIRTABLE_API_KEY)");
        return Err(ExitCode::UsageError);
    }

    tracing::debug!(base = base_id, base_url = %config.base_url, "Connecting");
    match ab_http::connect(&config) {
        Ok(pipeline) => Ok(Base::new(pipeline, base_id)),
        Err(e) => Err(fail(formatter, "Failed to create client", &e)),
    }
}

/// Report `error` and map it to an exit code
pub fn fail(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from_error(error)
}
