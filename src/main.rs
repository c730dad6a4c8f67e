use chrono::Local;
use spareroom_scraper::config::{parse_args, resolve_config, AppConfig};
use spareroom_scraper::crawler::fetcher::search_requests;
use spareroom_scraper::crawler::{Crawler, RobotsTxt, ScraperImpl};
use spareroom_scraper::parser::SpareRoomParser;
use spareroom_scraper::pipeline::ListingPipeline;
use spareroom_scraper::storage::JsonSink;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    // Load configuration from file and command line
    let config: AppConfig = match parse_args(std::env::args().skip(1)).and_then(|args| resolve_config(&args)) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            eprintln!("Usage: spareroom-scraper [--config <path>] [location]");
            return;
        }
    };

    let scraper = match ScraperImpl::new(&config.user_agent) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    let parser = match SpareRoomParser::new() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to build parser: {}", e);
            return;
        }
    };

    let started_at = Local::now();
    let output = JsonSink::run_path(&config.output_dir, &config.location, started_at);
    let sink = match JsonSink::open(&output) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open output {}: {}", output.display(), e);
            return;
        }
    };
    let pipeline = ListingPipeline::new(config.schema.clone(), sink);

    let robots = if config.obey_robots {
        Crawler::load_robots(&scraper).await
    } else {
        RobotsTxt::default()
    };
    let crawler = Crawler::new(&scraper, &parser, robots, &config);

    info!(
        "Crawling {} ({} search pages, {} concurrent requests)",
        config.location, config.pages, config.concurrent_requests
    );
    let requests = search_requests(&config.location, config.pages);
    let summary = crawler.crawl(&requests, &pipeline).await;
    let stats = pipeline.stats();

    info!(
        "Search pages: {} fetched, {} failed",
        summary.search_pages_fetched, summary.search_pages_failed
    );
    info!(
        "Listings: {} found, {} fetched, {} failed",
        summary.listings_found, summary.listings_fetched, summary.listings_failed
    );
    info!(
        "Stored {} listings in {} (dropped: {} without ad ref, {} malformed; {} write errors)",
        stats.stored,
        output.display(),
        stats.dropped_missing_ref,
        stats.dropped_malformed,
        stats.sink_failed
    );
}
