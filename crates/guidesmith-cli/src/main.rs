//! Guidesmith CLI - turn style guides into Word templates.

use anyhow::Context;
use clap::Parser;
use guidesmith_cli::commands;
use guidesmith_cli::{Cli, CliError, Command, Config, Formatter};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    config
        .apply_overrides(cli.provider.as_deref(), cli.model.as_deref(), cli.api_key.as_deref())
        .context("applying command-line overrides")?;

    let format = cli.format.map(Into::into).unwrap_or(config.cli.format);
    let color_enabled = !cli.no_color && config.cli.color;
    let formatter = Formatter::new(format, color_enabled);

    if let Err(e) = run(cli.command, &config, &formatter).await {
        error!(error = %e, "Command failed");
        eprintln!("{}", formatter.error(&e.user_message()));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, config: &Config, formatter: &Formatter) -> Result<(), CliError> {
    match command {
        Command::Extract(args) => commands::execute_extract(args, config, formatter).await,
        Command::Generate(args) => commands::execute_generate(args, config, formatter).await,
        Command::Render(args) => commands::execute_render(args, config, formatter),
        Command::Defaults => commands::execute_defaults(formatter),
        Command::Sample(args) => commands::execute_sample(args, formatter),
    }
}

/// Log to stderr; `RUST_LOG` wins unless `-v` is given
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
