use clap::Parser;
use trade_stats_etl::server::run_server;
use trade_stats_etl::utils::{logger, validation::Validate};
use trade_stats_etl::CliConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // Logging first so config failures are reported.
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trade-stats-etl server");

    // Resolve flags over the config file, then validate.
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    if let Err(e) = run_server(&config).await {
        tracing::error!("❌ Server stopped: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    Ok(())
}
