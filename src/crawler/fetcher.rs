use crate::crawler::traits::Scraper;
use crate::model::{ScraperError, SearchRequest};
use crate::utils::to_kebab_case;

use reqwest::Client;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.spareroom.co.uk";

pub struct ScraperImpl {
    client: Client,
}

impl ScraperImpl {
    pub fn new(user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

/// Search results page, newest listings first.
pub fn build_url(req: &SearchRequest) -> String {
    format!(
        "{}/flatshare/{}&sort_by=last_updated/page{}",
        BASE_URL,
        to_kebab_case(&req.location),
        req.page
    )
}

/// One request per results page, `1..=pages`.
pub fn search_requests(location: &str, pages: u32) -> Vec<SearchRequest> {
    (1..=pages)
        .map(|page| SearchRequest {
            location: location.to_string(),
            page,
        })
        .collect()
}

#[async_trait::async_trait]
impl Scraper for ScraperImpl {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ScraperError::InvalidResponse {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
