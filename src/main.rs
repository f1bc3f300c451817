use offer_scraper_lib::{input_loader, logger};
use offer_scraper_lib::{CrawlerConfig, Extractor, LinkCollector, OfferJob, Scraper};

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use clap::{Parser, Subcommand};
use log::{info, warn};

/// Collects job offer links from listing pages and grabs each offer's requirements
#[derive(Parser, Debug)]
#[command(name = "offer-scraper")]
#[command(about = "Two-stage job offer crawler with resumable checkpoints")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Number of listing pages to walk
    #[arg(short = 'p', long = "pages", global = true)]
    pages: Option<u32>,

    /// Listing URL the page number gets appended to
    #[arg(long = "query-url", global = true)]
    query_url: Option<String>,

    /// Directory holding grabbed_offers_*.csv checkpoints
    #[arg(short = 'd', long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Links file written by `collect` and read by `grab`
    #[arg(short = 'l', long = "links-file", global = true)]
    links_file: Option<PathBuf>,

    /// Pause after every offer request, in milliseconds
    #[arg(long = "delay-ms", global = true)]
    delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Command {
    /// Walk listing pages and write the links file
    Collect,
    /// Grab offer details for links not yet checkpointed
    Grab,
    /// Collect, then grab
    Run,
}

impl Cli {
    fn into_config(self) -> CrawlerConfig {
        let mut config = CrawlerConfig::default();
        if let Some(pages) = self.pages {
            config.page_count = pages;
        }
        if let Some(url) = self.query_url {
            config.listing_base_url = url;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(file) = self.links_file {
            config.links_file = file;
        }
        if let Some(ms) = self.delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);
    let config = cli.into_config();
    config.validate()?;

    info!("Starting offer scraper ({:?})...", command);

    let scraper_instance = Scraper::new(&config)?;
    let extractor = Extractor::new(&config)?;

    if matches!(command, Command::Collect | Command::Run) {
        LinkCollector::new(&config, &scraper_instance, &extractor).collect(config.page_count)?;
    }

    if matches!(command, Command::Grab | Command::Run) {
        let links = input_loader::load_links(&config.links_file)?;
        if links.is_empty() {
            warn!("No offer URLs in {:?}; nothing to grab.", config.links_file);
        }

        let summary = OfferJob::new(&config, &scraper_instance, &extractor).run(&links)?;
        info!(
            "Grabbing completed. Processed {} offers ({} failed to fetch).",
            summary.processed, summary.fetch_failures
        );
        summary.log();
    }

    Ok(())
}
