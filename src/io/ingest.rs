//! Observation CSV ingest.
//!
//! The file is a header row followed by one observation per line:
//!
//! ```text
//! distal,pendant,log_like
//! 0.0,0.01,-2843.1
//! ```
//!
//! Column order is free; header names are matched case-insensitively and a
//! UTF-8 BOM on the first header is ignored. Extra columns are ignored.
//! Any bad row aborts the load.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Observation;
use crate::error::{ErrorKind, FitError};
use crate::fit::check_point;

const REQUIRED_COLUMNS: [&str; 3] = ["distal", "pendant", "log_like"];

/// Load observations from a CSV file.
pub fn load_points(path: &Path) -> Result<Vec<Observation>, FitError> {
    let file = File::open(path).map_err(|e| {
        FitError::new(
            ErrorKind::Io,
            format!("Failed to open points CSV '{}': {e}", path.display()),
        )
    })?;
    read_points(file)
}

/// Parse observations from any CSV reader.
pub fn read_points<R: Read>(input: R) -> Result<Vec<Observation>, FitError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| FitError::new(ErrorKind::Io, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(FitError::new(
                ErrorKind::Format,
                format!("Missing required column: `{name}`"),
            ));
        }
    }

    let mut points = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| {
            FitError::new(ErrorKind::Format, format!("Line {line}: CSV parse error: {e}"))
        })?;

        let point = parse_row(&record, &header_map)
            .map_err(|msg| FitError::new(ErrorKind::Format, format!("Line {line}: {msg}")))?;
        check_point(points.len(), &point).map_err(|e| {
            FitError::new(e.kind(), format!("Line {line}: {}", e.message()))
        })?;
        points.push(point);
    }

    Ok(points)
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Observation, String> {
    let distal = parse_f64(get_required(record, header_map, "distal")?, "distal")?;
    let pendant = parse_f64(get_required(record, header_map, "pendant")?, "pendant")?;
    let log_like = parse_f64(get_required(record, header_map, "log_like")?, "log_like")?;
    Ok(Observation::new(distal, pendant, log_like))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: {s:?}"))
}
