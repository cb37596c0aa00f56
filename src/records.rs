//! Record types for the two RDW source datasets and the derived entities.
//!
//! Source records mirror the Socrata JSON exactly: every value is a string
//! and every field may be missing, so each is an `Option<String>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the P+R facility dataset (`6wzd-evwu`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFacilityRecord {
    #[serde(rename = "areaid")]
    pub area_id: Option<String>,
    /// e.g. `"P+R Hemriksein (Leeuwarden)"`; the city sits in the parentheses.
    #[serde(rename = "areadesc")]
    pub area_desc: Option<String>,
    #[serde(rename = "areamanagerid")]
    pub area_manager_id: Option<String>,
    pub location: Option<RawLocation>,
    /// Opening date stamp, `YYYYMMDD`.
    #[serde(rename = "startdataarea")]
    pub start_date: Option<String>,
    #[serde(rename = "enddataarea")]
    pub end_date: Option<String>,
    #[serde(rename = "usageid")]
    pub usage_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// One row of the parking specification dataset (`b3us-f26s`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCapacitySpec {
    #[serde(rename = "areaid")]
    pub area_id: Option<String>,
    #[serde(rename = "areamanagerid")]
    pub area_manager_id: Option<String>,
    pub capacity: Option<String>,
    #[serde(rename = "chargingpointcapacity")]
    pub charging_point_capacity: Option<String>,
    #[serde(rename = "disabledaccess")]
    pub disabled_access: Option<String>,
    #[serde(rename = "maximumvehicleheight")]
    pub maximum_vehicle_height: Option<String>,
    #[serde(rename = "startdatespecifications")]
    pub start_date: Option<String>,
    #[serde(rename = "enddatespecifications")]
    pub end_date: Option<String>,
}

/// A facility left-joined with its first matching capacity spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedFacility {
    pub area_id: Option<String>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub opening_year: Option<i32>,
    pub capacity: u32,
}

/// Number of P+R facilities in one city, optionally geocoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityAggregate {
    pub city: String,
    pub pr_locations: usize,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CityAggregate {
    pub fn new(city: impl Into<String>, pr_locations: usize) -> Self {
        Self {
            city: city.into(),
            pr_locations,
            lat: None,
            lng: None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        Some(Position {
            lat: self.lat?,
            lng: self.lng?,
        })
    }

    pub fn set_position(&mut self, position: Option<Position>) {
        self.lat = position.map(|p| p.lat);
        self.lng = position.map(|p| p.lng);
    }
}

/// WGS84 coordinates as returned by the geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// Serialisable summary of one pipeline run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityReport {
    pub generated_at: DateTime<Utc>,
    pub facility_count: usize,
    pub unresolved_city: usize,
    pub cities: Vec<CityAggregate>,
}
