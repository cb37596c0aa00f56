//! Output formatting and export of pipeline results.
//!
//! Supports JSON logging, JSON reports and CSV tables.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` to `path` as pretty-printed JSON, replacing the file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    create_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Writes `rows` to `path` as CSV with a header row, replacing the file.
///
/// An empty slice produces an empty file.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    create_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path, rows = rows.len(), "CSV written");
    Ok(())
}

fn create_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CityAggregate, JoinedFacility};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn facility(city: &str, capacity: u32) -> JoinedFacility {
        JoinedFacility {
            area_id: Some("80_PRHEM".to_string()),
            name: Some(format!("P+R Hemriksein ({city})")),
            lat: Some(53.165117644),
            lng: None,
            city: Some(city.to_string()),
            opening_year: Some(2015),
            capacity,
        }
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&vec![CityAggregate::new("Leeuwarden", 1)]).unwrap();
    }

    #[test]
    fn test_write_csv_writes_header_once() {
        let path = temp_path("rdw_parkride_test_header.csv");
        let _ = fs::remove_file(&path);

        write_csv(&path, &[facility("Leeuwarden", 120), facility("Leeuwarden", 40)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "areaId,name,lat,lng,city,openingYear,capacity");
        assert_eq!(
            lines[1],
            "80_PRHEM,P+R Hemriksein (Leeuwarden),53.165117644,,Leeuwarden,2015,120"
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_replaces_existing_file() {
        let path = temp_path("rdw_parkride_test_replace.csv");
        let _ = fs::remove_file(&path);

        write_csv(&path, &[CityAggregate::new("A", 1), CityAggregate::new("B", 2)]).unwrap();
        write_csv(&path, &[CityAggregate::new("C", 3)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("C,3,,"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = temp_path("rdw_parkride_test_json");
        let path = format!("{dir}/nested/report.json");
        let _ = fs::remove_dir_all(&dir);

        write_json(&path, &vec![CityAggregate::new("Utrecht", 4)]).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["prLocations"], 4);

        fs::remove_dir_all(&dir).unwrap();
    }
}
