use anyhow::Context;
use clap::Parser;
use trade_stats_etl::core::{ConfigProvider, Credential, TradeField, TradeQuery};
use trade_stats_etl::utils::{logger, validation::Validate};
use trade_stats_etl::{CliConfig, Result, TradePipeline};

/// Fetches one query from the trade API and prints the per-year summary.
#[derive(Debug, Parser)]
#[command(name = "trade_summary")]
struct SummaryArgs {
    #[arg(long, help = "First month, YYYYMM")]
    start: String,

    #[arg(long, help = "Last month, YYYYMM")]
    end: String,

    #[arg(long, help = "Country code, e.g. US")]
    country: String,

    #[arg(long, help = "HS commodity code")]
    hs: Option<String>,

    #[arg(long, default_value = "expDlr", help = "Column to total across all rows")]
    field: String,

    #[command(flatten)]
    cli: CliConfig,
}

async fn run(args: &SummaryArgs) -> Result<()> {
    let config = args.cli.resolve()?;
    config.validate()?;

    let field: TradeField = args.field.parse()?;
    let query = TradeQuery::new(
        args.start.clone(),
        args.end.clone(),
        args.country.clone(),
        args.hs.clone(),
        Credential::new(config.service_key()),
    )?;

    let pipeline = TradePipeline::from_config(&config)?;
    let report = pipeline.report(&query, field).await?;

    println!("{}", serde_json::to_string_pretty(&report.summaries)?);
    println!("Total {} (all rows): {}", report.field, report.total);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SummaryArgs::parse();
    logger::init_cli_logger(args.cli.verbose);

    run(&args).await.with_context(|| {
        format!(
            "trade summary for {} {}..{} failed",
            args.country, args.start, args.end
        )
    })
}
