//! Fetch → join → aggregate → (optional) geocode.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::aggregate::count_by_city;
use crate::config::PipelineConfig;
use crate::enrich::enrich;
use crate::fetch::{HttpClient, fetch_json, with_row_limit};
use crate::geocode::Geocoder;
use crate::join::{join, restrict_specs};
use crate::records::{
    CityAggregate, CityReport, JoinedFacility, RawCapacitySpec, RawFacilityRecord,
};

/// Everything one run produces. Handed to consumers explicitly.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub facilities: Vec<JoinedFacility>,
    pub cities: Vec<CityAggregate>,
    pub unresolved_city: usize,
}

impl PipelineOutput {
    pub fn report(&self) -> CityReport {
        CityReport {
            generated_at: Utc::now(),
            facility_count: self.facilities.len(),
            unresolved_city: self.unresolved_city,
            cities: self.cities.clone(),
        }
    }
}

/// Fetches both datasets concurrently and decodes them.
///
/// # Errors
///
/// Any fetch or decode failure is fatal: there is no fallback dataset.
pub async fn fetch_sources<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
) -> Result<(Vec<RawFacilityRecord>, Vec<RawCapacitySpec>)> {
    let specs_url = with_row_limit(&config.specs_url, config.spec_limit)?;

    let (facilities, specs) = tokio::try_join!(
        fetch_records::<_, RawFacilityRecord>(client, &config.facilities_url),
        fetch_records::<_, RawCapacitySpec>(client, &specs_url),
    )?;

    info!(
        facilities = facilities.len(),
        specs = specs.len(),
        "Sources fetched"
    );
    Ok((facilities, specs))
}

async fn fetch_records<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<Vec<T>> {
    let value = fetch_json(client, url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    serde_json::from_value(value).with_context(|| format!("unexpected record shape from {url}"))
}

/// The count-free variant: joined facilities only.
#[tracing::instrument(skip_all, fields(facilities_url = %config.facilities_url))]
pub async fn join_only<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
) -> Result<Vec<JoinedFacility>> {
    let (facilities, specs) = fetch_sources(client, config).await?;
    let specs = restrict_specs(&facilities, specs);
    Ok(join(&facilities, &specs))
}

/// Runs the whole pipeline. Geocoding happens only when a geocoder is given.
#[tracing::instrument(skip_all, fields(geocode = geocoder.is_some()))]
pub async fn run<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    geocoder: Option<Arc<dyn Geocoder>>,
) -> Result<PipelineOutput> {
    let facilities = join_only(client, config).await?;
    let counts = count_by_city(&facilities);

    info!(
        cities = counts.cities.len(),
        unresolved_city = counts.unresolved,
        "Facilities grouped by city"
    );

    let cities = match geocoder {
        Some(geocoder) => enrich(counts.cities, geocoder, &config.enrich).await?,
        None => counts.cities,
    };

    Ok(PipelineOutput {
        facilities,
        cities,
        unresolved_city: counts.unresolved,
    })
}
