//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use habitvox_cli::{Cli, CliError, Commands, bootstrap, env, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::load_default_env();

    let mut cli = Cli::parse();
    if let Some(path) = cli.env_file.clone() {
        env::load_env_file(&path)?;
        // Re-read so env fallbacks see the new variables.
        cli = Cli::parse();
    }

    init_tracing(cli.verbose)?;

    let Some(command) = cli.command.take() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Err(err) = run(command, &cli).await {
        tracing::debug!(error = ?err, "Command failed");
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "habitvox=debug" } else { "habitvox=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

async fn run(command: Commands, cli: &Cli) -> Result<(), CliError> {
    let settings = cli.settings();

    // Config works without a reachable backend or audio device.
    if matches!(command, Commands::Config) {
        return handlers::config::execute(&settings);
    }

    let ctx = bootstrap(settings).await?;
    match command {
        Commands::Checkin => handlers::checkin::execute(&ctx).await,
        Commands::Goals => handlers::goals::execute(&ctx).await,
        Commands::Say { text } => handlers::say::execute(&ctx, &text).await,
        Commands::Voices => handlers::voices::execute(&ctx).await,
        Commands::Config => Ok(()),
    }
}
