//! `portfolio-digest`: value a portfolio, analyze its news and send the report

mod input;
mod summary;

use anyhow::Context;
use clap::Parser;
use digest_llm::providers::OpenAIProvider;
use digest_report::api::{LlmNarrator, NewsApiClient, NewsApiConfig, YahooMarketData};
use digest_report::{
    DigestConfig, FileDelivery, PortfolioInput, PortfolioStore, ReportDelivery, ReportPipeline,
    RunOutcome, SmtpConfig, SmtpDelivery, SvgBarChart,
};
use digest_utils::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const NOTHING_TO_SEND: &str = "No content to send.";

#[derive(Parser, Debug)]
#[command(name = "portfolio-digest")]
#[command(about = "Email a portfolio valuation and AI news analysis report", long_about = None)]
struct Args {
    /// Held position, as TICKER=UNITS (repeatable)
    #[arg(long = "holding", value_name = "TICKER=UNITS", value_parser = input::parse_holding)]
    holdings: Vec<(String, String)>,

    /// Ticker to analyze without a position (repeatable)
    #[arg(long = "watch", value_name = "TICKER")]
    watch: Vec<String>,

    /// Prompt for tickers on stdin
    #[arg(short, long, conflicts_with_all = ["holdings", "watch"])]
    interactive: bool,

    /// Saved portfolio, used as the default input and overwritten after each run
    #[arg(long, default_value = "portfolio.csv")]
    portfolio_file: PathBuf,

    /// Write the HTML report to this file instead of emailing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Email subject
    #[arg(long, default_value = "Weekly Portfolio Update")]
    subject: String,

    /// Tickers analyzed in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log output format (pretty or json)
    #[arg(long, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn collect_input(args: &Args, store: &PortfolioStore) -> anyhow::Result<PortfolioInput> {
    let saved = store.load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable {}: {e}", store.path().display());
        PortfolioInput::new()
    });
    let (saved_portfolio, saved_watchlist) = saved.into_parts();

    if args.interactive {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        return input::read_interactive(stdin.lock(), &mut stdout, (&saved_portfolio, &saved_watchlist))
            .context("failed to read tickers from stdin");
    }

    if !args.holdings.is_empty() || !args.watch.is_empty() {
        return Ok(input::from_flags(&args.holdings, &args.watch));
    }

    Ok(input::from_saved(&saved_portfolio, &saved_watchlist))
}

fn build_pipeline(config: DigestConfig) -> anyhow::Result<ReportPipeline> {
    let market = YahooMarketData::new(config.request_timeout)?;

    let news_config = NewsApiConfig::from_env()?
        .with_page_size(config.news_page_size)
        .with_rate_limit(config.news_rate_limit)
        .with_timeout(config.request_timeout);
    let news = NewsApiClient::new(news_config)?;

    let provider = OpenAIProvider::from_env()?;
    let narrator = LlmNarrator::new(Arc::new(provider), config.model.clone()).with_temperature(config.temperature);

    let pipeline = ReportPipeline::builder()
        .market(Arc::new(market))
        .news(Arc::new(news))
        .narrator(Arc::new(narrator))
        .chart(Arc::new(SvgBarChart::new(config.currency.clone())))
        .config(config)
        .build()?;
    Ok(pipeline)
}

fn build_delivery(output: Option<&PathBuf>) -> anyhow::Result<Box<dyn ReportDelivery>> {
    match output {
        Some(path) => Ok(Box::new(FileDelivery::new(path))),
        None => {
            let smtp = SmtpConfig::from_env().context("email delivery is not configured")?;
            Ok(Box::new(SmtpDelivery::new(&smtp)?))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    digest_utils::load_dotenv();
    let args = Args::parse();
    digest_utils::init_tracing(args.log_format);

    let store = PortfolioStore::new(&args.portfolio_file);
    let (portfolio, watchlist) = collect_input(&args, &store)?.into_parts();

    if portfolio.is_empty() && watchlist.is_empty() {
        println!("{NOTHING_TO_SEND}");
        return Ok(());
    }

    if let Err(e) = store.save(&portfolio, &watchlist) {
        warn!("Could not save portfolio to {}: {e}", store.path().display());
    }

    let mut config = DigestConfig::from_env()?;
    config.subject.clone_from(&args.subject);
    if let Some(n) = args.concurrency {
        config.max_concurrency = n;
    }
    config.validate()?;
    let currency = config.currency.clone();

    let delivery = build_delivery(args.output.as_ref())?;
    let pipeline = build_pipeline(config)?;

    info!(
        held = portfolio.len(),
        watched = watchlist.len(),
        delivery = delivery.name(),
        "Generating report"
    );

    match pipeline.run_and_deliver(&portfolio, &watchlist, delivery.as_ref()).await? {
        RunOutcome::Empty => println!("{NOTHING_TO_SEND}"),
        RunOutcome::Undeliverable(report) => {
            println!("{}", summary::render(&report, &currency));
            println!("{NOTHING_TO_SEND}");
        }
        RunOutcome::Delivered(report) => {
            println!("{}", summary::render(&report, &currency));
            match &args.output {
                Some(path) => println!("Report written to {}", path.display()),
                None => println!("Email sent successfully!"),
            }
        }
    }

    Ok(())
}
