use clap::Parser;
use mocking_cli::{launcher::run_app, logging, Cli, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config first: the log file lives in the state directory it names
    let config = CliConfig::resolve(cli.config.as_deref())?.with_api_url(cli.api_url.clone());
    logging::init(&config.log_path(), cli.verbose);

    tracing::info!("mocking {} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    run_app(cli, config).await
}
