// Core structs: RawListing, NormalizedListing and the error types
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected key -> value (or null) for one keyed section of a listing.
pub type KeyedFields = BTreeMap<String, Option<String>>;

/// Text tokens scraped from one listing page, one list per page region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub url: String,
    pub ad_ref: Vec<String>,
    pub listing_type: Vec<String>,
    pub room_price: Vec<String>,
    pub property_price: Vec<String>,
    pub room_available: Vec<String>,
    pub room_deposit: Vec<String>,
    pub amenities: Vec<String>,
    pub current_household: Vec<String>,
    pub household_preferences: Vec<String>,
}

impl RawListing {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Applies `f` to every token field, keeping the url.
    pub fn map_fields<F>(self, mut f: F) -> Self
    where
        F: FnMut(Vec<String>) -> Vec<String>,
    {
        Self {
            url: self.url,
            ad_ref: f(self.ad_ref),
            listing_type: f(self.listing_type),
            room_price: f(self.room_price),
            property_price: f(self.property_price),
            room_available: f(self.room_available),
            room_deposit: f(self.room_deposit),
            amenities: f(self.amenities),
            current_household: f(self.current_household),
            household_preferences: f(self.household_preferences),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingType {
    pub list_type: String,
    pub location: String,
    pub postcode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPrice {
    pub price: Option<String>,
    pub description: Option<String>,
    pub deposit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPrice {
    pub price: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub deposit: Option<String>,
    pub bills_included: Option<String>,
}

impl RoomPrice {
    pub fn new(price: impl Into<String>, room_type: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            room_type: room_type.into(),
            deposit: None,
            bills_included: None,
        }
    }
}

/// The record handed to the sink, one per accepted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    pub ad_ref: String,
    pub listing_type: ListingType,
    pub property_price: PropertyPrice,
    pub room_price: Vec<RoomPrice>,
    pub room_available: KeyedFields,
    pub amenities: KeyedFields,
    pub household_preferences: KeyedFields,
    pub current_household: KeyedFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub location: String,
    pub page: u32,
}

/// A positional lookup that did not find what the page layout promised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{field}`: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing ad ref in listing {url}")]
    MissingIdentifier { url: String },
    #[error("malformed positional field {source} in listing {url}")]
    MalformedPositionalField { url: String, source: FieldError },
}

impl NormalizeError {
    pub fn url(&self) -> &str {
        match self {
            NormalizeError::MissingIdentifier { url } => url,
            NormalizeError::MalformedPositionalField { url, .. } => url,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    InvalidResponse { url: String, status: u16 },
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("disallowed by robots.txt: {0}")]
    Disallowed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("invalid selector `{selector}`: {reason}")]
    HtmlParseError { selector: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}
