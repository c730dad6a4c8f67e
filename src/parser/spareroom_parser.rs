// SpareRoom-specific HTML parsing
use crate::crawler::fetcher::BASE_URL;
use crate::model::{ParserError, RawListing};
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

pub trait Parser {
    /// Absolute listing urls found on a search results page.
    fn parse_links(&self, html: &str) -> Vec<String>;
    /// Raw text tokens of every listing section, unprocessed.
    fn parse_listing(&self, url: &str, html: &str) -> RawListing;
}

pub struct SpareRoomParser {
    link: Selector,
    ad_ref: Selector,
    listing_type: Selector,
    room_price: Selector,
    property_price: Selector,
    room_available: Selector,
    room_deposit: Selector,
    amenities: Selector,
    current_household: Selector,
    household_preferences: Selector,
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::HtmlParseError {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn feature_list(section: &str) -> String {
    format!(r#"section[class="feature feature--{section}"] dl[class="feature-list"]"#)
}

impl SpareRoomParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            link: selector("figure > a[href]")?,
            ad_ref: selector(r#"p[id="listing_ref"]"#)?,
            listing_type: selector(
                r#"ul[class="key-features"] li[class="key-features__feature"]"#,
            )?,
            room_price: selector(
                r#"section[class^="feature feature--price"] li[class="room-list__room"]"#,
            )?,
            property_price: selector(r#"section[class^="feature feature--price-whole-property"]"#)?,
            room_available: selector(&feature_list("availability"))?,
            room_deposit: selector(&feature_list("extra-cost"))?,
            amenities: selector(&feature_list("amenities"))?,
            current_household: selector(&feature_list("current-household"))?,
            household_preferences: selector(&feature_list("household-preferences"))?,
        })
    }
}

/// Every text node under every match, in document order.
fn texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .map(str::to_string)
        .collect()
}

impl Parser for SpareRoomParser {
    fn parse_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(base) = Url::parse(BASE_URL) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.link) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            // Rooms that are no longer available link to a javascript alert.
            let Ok(url) = base.join(href.trim()) else {
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }
            let url = url.to_string();
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }

        links
    }

    fn parse_listing(&self, url: &str, html: &str) -> RawListing {
        let document = Html::parse_document(html);

        RawListing {
            url: url.to_string(),
            ad_ref: texts(&document, &self.ad_ref),
            listing_type: texts(&document, &self.listing_type),
            room_price: texts(&document, &self.room_price),
            property_price: texts(&document, &self.property_price),
            room_available: texts(&document, &self.room_available),
            room_deposit: texts(&document, &self.room_deposit),
            amenities: texts(&document, &self.amenities),
            current_household: texts(&document, &self.current_household),
            household_preferences: texts(&document, &self.household_preferences),
        }
    }
}
