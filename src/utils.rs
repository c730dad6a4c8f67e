// Utility functions
use rand::Rng;
use std::time::Duration;

/// Converts a string to kebab-case, e.g. a search location for a url.
pub fn to_kebab_case(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "-")
}

/// Base delay scaled by a random factor in `[0.5, 1.5)`.
pub fn jittered_delay(base_ms: u64) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let factor: f64 = rand::rng().random_range(0.5..1.5);
    Duration::from_millis((base_ms as f64 * factor).round() as u64)
}
