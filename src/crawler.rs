pub mod fetcher;
pub mod robots;
pub mod traits;

pub use fetcher::ScraperImpl;
pub use robots::RobotsTxt;
pub use traits::Scraper;

use crate::config::AppConfig;
use crate::model::{ScraperError, SearchRequest};
use crate::parser::Parser;
use crate::pipeline::{ItemOutcome, ListingPipeline};
use crate::utils::jittered_delay;
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub search_pages_fetched: usize,
    pub search_pages_failed: usize,
    pub listings_found: usize,
    pub listings_fetched: usize,
    pub listings_failed: usize,
    pub listings_stored: usize,
}

/// Walks the search pages, then every listing found on them, with at most
/// `concurrent_requests` requests in flight. Request starts are spaced by the
/// download delay across all in-flight requests, not per request.
pub struct Crawler<'a> {
    scraper: &'a dyn Scraper,
    parser: &'a dyn Parser,
    robots: RobotsTxt,
    user_agent: String,
    concurrent_requests: usize,
    download_delay_ms: u64,
    next_slot: Mutex<Instant>,
}

impl<'a> Crawler<'a> {
    pub fn new(
        scraper: &'a dyn Scraper,
        parser: &'a dyn Parser,
        robots: RobotsTxt,
        config: &AppConfig,
    ) -> Self {
        Self {
            scraper,
            parser,
            robots,
            user_agent: config.user_agent.clone(),
            concurrent_requests: config.concurrent_requests.max(1),
            download_delay_ms: config.download_delay_ms,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Site robots.txt; an unreachable file allows everything.
    pub async fn load_robots(scraper: &dyn Scraper) -> RobotsTxt {
        let url = format!("{}/robots.txt", fetcher::BASE_URL);
        match scraper.fetch(&url).await {
            Ok(content) => RobotsTxt::parse(&content),
            Err(e) => {
                warn!("Could not load robots.txt, crawling without it: {}", e);
                RobotsTxt::default()
            }
        }
    }

    fn is_allowed(&self, url: &str) -> Result<bool, ScraperError> {
        Url::parse(url).map_err(|_| ScraperError::InvalidUrl(url.to_string()))?;
        Ok(self.robots.is_allowed(&self.user_agent, url))
    }

    /// Waits for this request's start slot and books the next one.
    async fn wait_turn(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + jittered_delay(self.download_delay_ms);
            slot
        };
        sleep_until(slot).await;
    }

    async fn get(&self, url: &str) -> Result<String, ScraperError> {
        if !self.is_allowed(url)? {
            return Err(ScraperError::Disallowed(url.to_string()));
        }
        self.wait_turn().await;
        self.scraper.fetch(url).await
    }

    /// Listing urls from all search pages, first sighting order, no repeats.
    pub async fn discover_listings(
        &self,
        requests: &[SearchRequest],
        summary: &mut CrawlSummary,
    ) -> Vec<String> {
        let mut pages = stream::iter(requests.iter().map(fetcher::build_url))
            .map(|url| async move {
                let result = self.get(&url).await;
                (url, result)
            })
            .buffered(self.concurrent_requests);

        let mut seen = HashSet::new();
        let mut listings = Vec::new();
        while let Some((url, result)) = pages.next().await {
            match result {
                Ok(html) => {
                    summary.search_pages_fetched += 1;
                    let links = self.parser.parse_links(&html);
                    debug!("{} listing links on {}", links.len(), url);
                    for link in links {
                        if seen.insert(link.clone()) {
                            listings.push(link);
                        }
                    }
                }
                Err(e) => {
                    summary.search_pages_failed += 1;
                    warn!("Search page {} failed: {}", url, e);
                }
            }
        }

        summary.listings_found = listings.len();
        listings
    }

    /// Fetches every listing and hands it to the pipeline as soon as it
    /// arrives.
    pub async fn crawl(
        &self,
        requests: &[SearchRequest],
        pipeline: &ListingPipeline,
    ) -> CrawlSummary {
        let mut summary = CrawlSummary::default();

        let listings = self.discover_listings(requests, &mut summary).await;
        info!(
            "Found {} listings on {} search pages",
            listings.len(),
            summary.search_pages_fetched
        );

        let mut results = stream::iter(listings)
            .map(|url| async move {
                match self.get(&url).await {
                    Ok(html) => {
                        let raw = self.parser.parse_listing(&url, &html);
                        Ok(pipeline.process_item(raw).await)
                    }
                    Err(e) => Err((url, e)),
                }
            })
            .buffer_unordered(self.concurrent_requests);

        while let Some(result) = results.next().await {
            match result {
                Ok(outcome) => {
                    summary.listings_fetched += 1;
                    if outcome == ItemOutcome::Stored {
                        summary.listings_stored += 1;
                    }
                }
                Err((url, e)) => {
                    summary.listings_failed += 1;
                    warn!("Listing {} failed: {}", url, e);
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ListingSchema;
    use crate::parser::SpareRoomParser;
    use crate::storage::JsonSink;
    use std::collections::HashMap;
    use std::fs;

    struct FakeScraper {
        pages: HashMap<String, String>,
    }

    #[async_trait::async_trait]
    impl Scraper for FakeScraper {
        async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScraperError::InvalidResponse {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn listing_page(ad_ref: &str) -> String {
        format!(
            r#"<html><body>
              <ul class="key-features">
                <li class="key-features__feature">Flatshare</li>
                <li class="key-features__feature">Derby</li>
                <li class="key-features__feature">DE1</li>
              </ul>
              <section class="feature feature--price_room_only">
                <ul><li class="room-list__room"><strong>£500 pcm</strong> <small>(single)</small></li></ul>
              </section>
              <section class="feature feature--extra-cost">
                <dl class="feature-list"><dt>Deposit</dt><dd>£400</dd></dl>
              </section>
              <p id="listing_ref">{ad_ref}</p>
            </body></html>"#
        )
    }

    fn site() -> FakeScraper {
        let detail = |id: u32| format!("{}/flatshare/flatshare_detail.pl?flatshare_id={}", fetcher::BASE_URL, id);
        let search = |page: u32| {
            fetcher::build_url(&SearchRequest {
                location: "derby".into(),
                page,
            })
        };

        let mut pages = HashMap::new();
        pages.insert(
            search(1),
            r#"<figure><a href="/flatshare/flatshare_detail.pl?flatshare_id=1">1</a></figure>
               <figure><a href="/flatshare/flatshare_detail.pl?flatshare_id=2">2</a></figure>"#
                .to_string(),
        );
        pages.insert(
            search(2),
            r#"<figure><a href="/flatshare/flatshare_detail.pl?flatshare_id=2">2</a></figure>
               <figure><a href="/flatshare/flatshare_detail.pl?flatshare_id=3">3</a></figure>
               <figure><a href="/private/4">4</a></figure>"#
                .to_string(),
        );
        pages.insert(detail(1), listing_page("Ad ref#1"));
        pages.insert(detail(2), listing_page("no reference"));
        FakeScraper { pages }
    }

    #[tokio::test]
    async fn crawls_search_pages_and_listings() {
        let dir = std::env::temp_dir().join(format!("spareroom-crawl-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut config = AppConfig::for_location("derby");
        config.download_delay_ms = 0;
        config.concurrent_requests = 2;

        let scraper = site();
        let parser = SpareRoomParser::new().unwrap();
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /private\n");
        let crawler = Crawler::new(&scraper, &parser, robots, &config);
        let pipeline = ListingPipeline::new(
            ListingSchema::default(),
            JsonSink::open(dir.join("run.jsonl")).unwrap(),
        );

        let requests = fetcher::search_requests("derby", 3);
        let summary = crawler.crawl(&requests, &pipeline).await;

        assert_eq!(
            summary,
            CrawlSummary {
                search_pages_fetched: 2,
                search_pages_failed: 1,
                listings_found: 4,
                listings_fetched: 2,
                listings_failed: 2,
                listings_stored: 1,
            }
        );
        assert_eq!(pipeline.stats().dropped_missing_ref, 1);

        let content = fs::read_to_string(dir.join("run.jsonl")).unwrap();
        let stored: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(stored["ad_ref"], "Ad ref#1");
        assert_eq!(stored["room_price"][0]["deposit"], "£400");
        assert_eq!(stored["room_price"][0]["bills_included"], serde_json::Value::Null);

        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn request_starts_are_spaced_across_concurrent_requests() {
        let mut config = AppConfig::for_location("derby");
        config.download_delay_ms = 40;
        config.concurrent_requests = 4;

        let scraper = FakeScraper {
            pages: HashMap::new(),
        };
        let parser = SpareRoomParser::new().unwrap();
        let crawler = Crawler::new(&scraper, &parser, RobotsTxt::default(), &config);

        let started = Instant::now();
        futures::future::join_all((0..4).map(|_| crawler.wait_turn())).await;

        // Three gaps of at least half the delay each.
        assert!(started.elapsed() >= std::time::Duration::from_millis(60));
    }

    #[tokio::test]
    async fn unreachable_robots_allows_everything() {
        let scraper = FakeScraper {
            pages: HashMap::new(),
        };
        let robots = Crawler::load_robots(&scraper).await;
        assert!(robots.is_allowed("spareroom-scraper", "https://www.spareroom.co.uk/flatshare/derby"));
    }
}
