//! Per-city histogram of joined facilities and the chart-facing selections
//! built on it.

use std::collections::HashMap;

use crate::records::{CityAggregate, JoinedFacility};

/// Result of grouping joined facilities by city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityCounts {
    /// One entry per distinct city, in order of first appearance.
    pub cities: Vec<CityAggregate>,
    /// Facilities whose city could not be derived from the description.
    pub unresolved: usize,
}

/// Counts facilities per city using exact string equality.
///
/// `cities.iter().map(|c| c.pr_locations).sum() + unresolved == joined.len()`
pub fn count_by_city(joined: &[JoinedFacility]) -> CityCounts {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut cities: Vec<CityAggregate> = Vec::new();
    let mut unresolved = 0;

    for city in joined.iter().map(|j| j.city.as_deref()) {
        let Some(city) = city else {
            unresolved += 1;
            continue;
        };

        match position.get(city) {
            Some(&idx) => cities[idx].pr_locations += 1,
            None => {
                position.insert(city, cities.len());
                cities.push(CityAggregate::new(city, 1));
            }
        }
    }

    CityCounts { cities, unresolved }
}

/// Cities with strictly more than `min` and strictly fewer than `max`
/// facilities. An absent bound does not filter.
pub fn within_location_range(
    cities: &[CityAggregate],
    min: Option<usize>,
    max: Option<usize>,
) -> Vec<CityAggregate> {
    cities
        .iter()
        .filter(|c| min.is_none_or(|min| c.pr_locations > min))
        .filter(|c| max.is_none_or(|max| c.pr_locations < max))
        .cloned()
        .collect()
}

/// Most facilities first; ties keep their first-seen order.
pub fn sort_by_locations_desc(cities: &mut [CityAggregate]) {
    cities.sort_by(|a, b| b.pr_locations.cmp(&a.pr_locations));
}

/// The facilities of a single city, e.g. to chart their capacity shares.
pub fn facilities_in_city<'a>(joined: &'a [JoinedFacility], city: &str) -> Vec<&'a JoinedFacility> {
    joined
        .iter()
        .filter(|j| j.city.as_deref() == Some(city))
        .collect()
}
