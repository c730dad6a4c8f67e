// Per-listing processing: normalize, then store or drop.
use crate::model::{NormalizeError, RawListing};
use crate::normalizer::{normalize_listing, ListingSchema};
use crate::storage::JsonSink;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Stored,
    DroppedMissingRef,
    DroppedMalformed,
    SinkFailed,
}

#[derive(Debug, Default)]
struct Counters {
    stored: AtomicUsize,
    missing_ref: AtomicUsize,
    malformed: AtomicUsize,
    sink_failed: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub stored: usize,
    pub dropped_missing_ref: usize,
    pub dropped_malformed: usize,
    pub sink_failed: usize,
}

pub struct ListingPipeline {
    schema: ListingSchema,
    sink: Mutex<JsonSink>,
    counters: Counters,
}

impl ListingPipeline {
    pub fn new(schema: ListingSchema, sink: JsonSink) -> Self {
        Self {
            schema,
            sink: Mutex::new(sink),
            counters: Counters::default(),
        }
    }

    /// Normalizes one listing and appends it to the sink. A failure only
    /// affects this listing.
    pub async fn process_item(&self, raw: RawListing) -> ItemOutcome {
        let outcome = match normalize_listing(raw, &self.schema) {
            Ok(listing) => match self.sink.lock().await.write(&listing) {
                Ok(()) => {
                    debug!("Stored {}", listing.ad_ref);
                    ItemOutcome::Stored
                }
                Err(e) => {
                    error!("Failed to store {}: {}", listing.ad_ref, e);
                    ItemOutcome::SinkFailed
                }
            },
            Err(e @ NormalizeError::MissingIdentifier { .. }) => {
                warn!("Dropping listing: {}", e);
                ItemOutcome::DroppedMissingRef
            }
            Err(e @ NormalizeError::MalformedPositionalField { .. }) => {
                warn!("Dropping listing, page layout may have changed: {}", e);
                ItemOutcome::DroppedMalformed
            }
        };

        let counter = match outcome {
            ItemOutcome::Stored => &self.counters.stored,
            ItemOutcome::DroppedMissingRef => &self.counters.missing_ref,
            ItemOutcome::DroppedMalformed => &self.counters.malformed,
            ItemOutcome::SinkFailed => &self.counters.sink_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        outcome
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            stored: self.counters.stored.load(Ordering::Relaxed),
            dropped_missing_ref: self.counters.missing_ref.load(Ordering::Relaxed),
            dropped_malformed: self.counters.malformed.load(Ordering::Relaxed),
            sink_failed: self.counters.sink_failed.load(Ordering::Relaxed),
        }
    }

    pub async fn output_path(&self) -> std::path::PathBuf {
        self.sink.lock().await.path().to_path_buf()
    }
}
