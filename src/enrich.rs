//! Concurrent geocoding of aggregated cities.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info, warn};

use crate::config::{EnrichSettings, EnrichmentPolicy};
use crate::geocode::Geocoder;
use crate::records::{CityAggregate, Position};

/// Attaches a position to every city, one lookup per city.
///
/// At most `settings.concurrency` lookups are in flight and each is bounded
/// by `settings.timeout`. The function returns only after every lookup has
/// settled; the output keeps the input order. No match and timeouts leave
/// the position `None`. Lookup failures follow `settings.policy`.
#[tracing::instrument(skip_all, fields(cities = cities.len(), policy = ?settings.policy))]
pub async fn enrich(
    cities: Vec<CityAggregate>,
    geocoder: Arc<dyn Geocoder>,
    settings: &EnrichSettings,
) -> Result<Vec<CityAggregate>> {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut tasks = Vec::with_capacity(cities.len());

    for city in &cities {
        let sem = semaphore.clone();
        let geocoder = geocoder.clone();
        let name = city.city.clone();
        let timeout = settings.timeout;

        let span = tracing::info_span!("geocode_city", city = %name);
        let task = tokio::spawn(locate_bounded(geocoder, name, sem, timeout).instrument(span));
        tasks.push(task);
    }

    let mut enriched = Vec::with_capacity(cities.len());
    let mut first_failure = None;
    let mut located = 0usize;

    for (mut city, task) in cities.into_iter().zip(tasks) {
        let outcome: Result<Option<Position>> = match task.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("geocoding task aborted: {e}")),
        };

        match outcome {
            Ok(position) => {
                if position.is_none() {
                    debug!(city = %city.city, "No geocoding match");
                } else {
                    located += 1;
                }
                city.set_position(position);
            }
            Err(e) => match settings.policy {
                EnrichmentPolicy::Degrade => {
                    warn!(city = %city.city, error = %e, "Geocoding failed, leaving position empty");
                    city.set_position(None);
                }
                EnrichmentPolicy::Propagate => {
                    if first_failure.is_none() {
                        first_failure = Some(e.context(format!("geocoding '{}' failed", city.city)));
                    }
                }
            },
        }
        enriched.push(city);
    }

    if let Some(e) = first_failure {
        return Err(e);
    }

    info!(located, total = enriched.len(), "Geocoding complete");
    Ok(enriched)
}

async fn locate_bounded(
    geocoder: Arc<dyn Geocoder>,
    city: String,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
) -> Result<Option<Position>> {
    let _permit = semaphore.acquire_owned().await?;
    match tokio::time::timeout(timeout, geocoder.locate(&city)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Geocoding timed out");
            Ok(None)
        }
    }
}
