//! City-name geocoding.
//!
//! [`Geocoder`] is the seam used by [`crate::enrich`]; [`HereGeocoder`] is
//! the HERE Geocoding & Search implementation.

mod here;

pub use here::HereGeocoder;

use anyhow::Result;

use crate::records::Position;

/// Resolves a free-text city name into a best-effort position.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match; `Err` only when the lookup
    /// itself failed.
    async fn locate(&self, city: &str) -> Result<Option<Position>>;
}
