use clap::Parser;
use tracing_subscriber::EnvFilter;

use logharbor_cli::cli::{Cli, Commands};
use logharbor_cli::commands;
use logharbor_cli::error::CliError;
use logharbor_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable in JSON mode
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Logs(args) => commands::logs::execute(args, &cli.config, &writer).await,
        Commands::Send(args) => commands::send::execute(args, &cli.config, &writer).await,
        Commands::Parse(args) => commands::parse::execute(args, &writer),
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
