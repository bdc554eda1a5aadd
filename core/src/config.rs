// core/src/config.rs

use std::time::Duration;

pub const DEFAULT_BRAND: &str = "Burmes & Co";

/// Retry policy for the stock-reservation transaction. Mirrors the document
/// database default of five attempts with exponential backoff.
#[derive(Debug, Clone)]
pub struct ReservationConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl ReservationConfig {
    /// Delay before attempt `attempt + 1` (attempts count from 1).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub default_brand: String,
    pub reservation: ReservationConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            default_brand: DEFAULT_BRAND.to_string(),
            reservation: ReservationConfig::default(),
        }
    }
}
