mod category;
mod fetcher;
mod logging;
mod output;
mod parser;
mod pipeline;
mod record;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use tracing::{error, info, warn};

use category::Category;
use fetcher::HttpFetcher;
use output::OutputFormat;
use parser::ListingExtractor;
use pipeline::{Pipeline, RunOutcome};
use settings::Settings;

#[derive(Parser)]
#[command(name = "deface_tracker", about = "Defacement scraper for Zone-Xsec")]
struct Cli {
    /// Country code to scrape (e.g. MZ), or "archive" for everything
    #[arg(short, long, default_value = "archive", conflicts_with = "domain")]
    tld: String,
    /// Search for a fully qualified domain instead (e.g. example.com)
    #[arg(short, long)]
    domain: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Output file (default: <DDMMYYYY>_<tld|domain>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Number of pages to scrape
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=5))]
    pages: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    logging::init(&settings.log_file)?;

    let t0 = Instant::now();

    let category = match &cli.domain {
        Some(domain) => Category::from_domain(domain)?,
        None => Category::from_tld(&cli.tld)?,
    };
    let output_path = cli.output.clone().unwrap_or_else(|| {
        let today = chrono::Local::now().date_naive();
        PathBuf::from(output::default_filename(today, &category, cli.format))
    });

    let base = Url::parse(&settings.base_url)
        .with_context(|| format!("Invalid base URL {}", settings.base_url))?;
    let fetcher = HttpFetcher::new(&settings).context("Failed to build HTTP client")?;
    let extractor = ListingExtractor::new(base);

    info!("Starting the scraping process");
    let report = Pipeline::new(&fetcher, &extractor).run(&category, cli.pages);

    match &report.outcome {
        RunOutcome::Completed(reason) => {
            info!(?reason, pages = report.pages_fetched, "Scraping finished")
        }
        RunOutcome::Aborted { page, error } => error!(
            "Run aborted on page {}: {}; keeping {} entries from earlier pages",
            page,
            error,
            report.records.len()
        ),
    }
    if report.records.is_empty() {
        warn!("No entries scraped; writing an empty {} file", cli.format.extension());
    }

    output::save(&output_path, &report.records, cli.format)
        .with_context(|| format!("Failed to write data to {}", output_path.display()))?;

    info!("Total number of entries scraped: {}", report.records.len());
    if report.skipped > 0 {
        info!("Entries dropped as incomplete: {}", report.skipped);
    }
    info!("Total running time: {}", format_duration(t0.elapsed()));
    println!("{}", output_path.display());

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
