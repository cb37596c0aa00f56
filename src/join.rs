//! Left-outer join of facilities with capacity specs, plus field derivation.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::DEFAULT_CAPACITY;
use crate::records::{JoinedFacility, RawCapacitySpec, RawFacilityRecord};

static CITY_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("static regex"));

/// Returns the text inside the first non-empty pair of parentheses.
///
/// `extract_city("P+R Hemriksein (Leeuwarden)") == Some("Leeuwarden")`
pub fn extract_city(description: &str) -> Option<&str> {
    CITY_IN_PARENS
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parses the leading `YYYY` of a `YYYYMMDD...` stamp.
pub fn extract_year(stamp: &str) -> Option<i32> {
    stamp.get(..4)?.parse().ok()
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

/// Drops specs whose `areaid` does not belong to any facility. Order is kept.
///
/// Joining against the restricted list gives the same result as joining
/// against the full one.
pub fn restrict_specs(
    facilities: &[RawFacilityRecord],
    specs: Vec<RawCapacitySpec>,
) -> Vec<RawCapacitySpec> {
    let ids: HashSet<&str> = facilities
        .iter()
        .filter_map(|f| f.area_id.as_deref())
        .collect();

    specs
        .into_iter()
        .filter(|s| s.area_id.as_deref().is_some_and(|id| ids.contains(id)))
        .collect()
}

/// Joins every facility with the first spec sharing its `areaid`.
///
/// The output has one record per facility, in input order. Without a match,
/// or when the matched capacity is missing or not an integer, capacity is
/// [`DEFAULT_CAPACITY`]. Duplicate spec ids are not checked: the earliest
/// one wins.
pub fn join(facilities: &[RawFacilityRecord], specs: &[RawCapacitySpec]) -> Vec<JoinedFacility> {
    let mut first_by_id: HashMap<&str, &RawCapacitySpec> = HashMap::with_capacity(specs.len());
    for spec in specs {
        if let Some(id) = spec.area_id.as_deref() {
            first_by_id.entry(id).or_insert(spec);
        }
    }

    let mut unmatched = 0usize;
    let joined: Vec<JoinedFacility> = facilities
        .iter()
        .map(|facility| {
            let spec = facility
                .area_id
                .as_deref()
                .and_then(|id| first_by_id.get(id));

            let capacity = match spec {
                Some(spec) => spec
                    .capacity
                    .as_deref()
                    .and_then(|c| c.trim().parse().ok())
                    .unwrap_or_else(|| {
                        debug!(area_id = ?facility.area_id, raw = ?spec.capacity, "Unusable capacity, using default");
                        DEFAULT_CAPACITY
                    }),
                None => {
                    unmatched += 1;
                    DEFAULT_CAPACITY
                }
            };

            let location = facility.location.as_ref();
            let description = facility.area_desc.as_deref().filter(|d| !d.is_empty());

            JoinedFacility {
                area_id: facility.area_id.clone(),
                name: description.map(str::to_string),
                lat: parse_coordinate(location.and_then(|l| l.latitude.as_deref())),
                lng: parse_coordinate(location.and_then(|l| l.longitude.as_deref())),
                city: description.and_then(extract_city).map(str::to_string),
                opening_year: facility.start_date.as_deref().and_then(extract_year),
                capacity,
            }
        })
        .collect();

    debug!(
        facilities = facilities.len(),
        specs = specs.len(),
        unmatched,
        "Join complete"
    );

    joined
}
