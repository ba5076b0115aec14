//! ab - command-line client for Airtable bases

mod commands;
mod exit_code;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use commands::{Commands, Connection};
use output::OutputConfig;

#[derive(Parser, Debug)]
#[command(name = "ab", version, about = "Command-line client for Airtable bases", propagate_version = true)]
struct Cli {
    /// Output strict JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log every outgoing request (API key redacted)
    #[arg(long, global = true)]
    debug: bool,

    /// API key; takes precedence over the config file
    #[arg(long, global = true, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };
    let connection = Connection {
        api_key: cli.api_key,
        debug: cli.debug,
    };

    let code = match cli.command {
        Commands::Tables(args) => commands::tables::execute(args, &connection, output_config).await,
        Commands::Records(cmd) => commands::records::execute(cmd, &connection, output_config).await,
        Commands::Completions(args) => commands::completions::execute(args, Cli::command()),
    };

    code.into()
}

/// Logs go to stderr; `RUST_LOG` overrides the defaults
fn init_tracing(debug: bool) {
    let default = if debug {
        "warn,ab_core=debug,ab_http=debug,airbased::wire=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}
