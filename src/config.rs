//! Endpoints, defaults and run settings.

use std::time::Duration;

/// RDW open data: P+R facilities.
pub const DEFAULT_FACILITIES_URL: &str = "https://opendata.rdw.nl/resource/6wzd-evwu.json";

/// RDW open data: parking specifications (capacity per area).
pub const DEFAULT_SPECS_URL: &str = "https://opendata.rdw.nl/resource/b3us-f26s.json";

/// The specification dataset is larger than Socrata's default page of 1000.
pub const DEFAULT_SPEC_LIMIT: u32 = 1600;

pub const DEFAULT_GEOCODE_URL: &str = "https://geocode.search.hereapi.com/v1/geocode";

/// Appended to every geocoding query as `"{city}, NL"`.
pub const DEFAULT_COUNTRY_SUFFIX: &str = "NL";

/// Capacity assigned to a facility without a usable capacity spec. Non-zero
/// so every facility still gets a slice in a proportional chart.
pub const DEFAULT_CAPACITY: u32 = 1;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_GEOCODE_CONCURRENCY: usize = 8;

/// What a failed (not merely empty) geocoding lookup does to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnrichmentPolicy {
    /// The city keeps a `None` position and the run continues.
    #[default]
    Degrade,
    /// All lookups still finish, then the first failure is returned.
    Propagate,
}

#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub concurrency: usize,
    /// Per lookup. A timed-out lookup counts as "not found".
    pub timeout: Duration,
    pub policy: EnrichmentPolicy,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_GEOCODE_CONCURRENCY,
            timeout: DEFAULT_GEOCODE_TIMEOUT,
            policy: EnrichmentPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub facilities_url: String,
    pub specs_url: String,
    /// Applied to `specs_url` as the Socrata `$limit` parameter.
    pub spec_limit: Option<u32>,
    pub enrich: EnrichSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            facilities_url: DEFAULT_FACILITIES_URL.to_string(),
            specs_url: DEFAULT_SPECS_URL.to_string(),
            spec_limit: Some(DEFAULT_SPEC_LIMIT),
            enrich: EnrichSettings::default(),
        }
    }
}
