//! CSV ingest and validation for the two feeds.
//!
//! This module turns the CDC daily case export and the census population
//! table into validated record vectors the pipeline can trust.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no guessing beyond the documented column rules)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CaseRecord, PopulationRecord};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Case-feed ingest output: validated records + summary stats + row errors.
#[derive(Debug, Clone)]
pub struct CaseIngest {
    pub records: Vec<CaseRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    /// Distinct state codes seen in the usable rows.
    pub n_codes: usize,
}

impl CaseIngest {
    /// Wrap already-validated records (used by the demo generator).
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        let rows = records.len();
        Self::build(records, Vec::new(), rows)
    }

    fn build(records: Vec<CaseRecord>, row_errors: Vec<RowError>, rows_read: usize) -> Self {
        let mut date_min: Option<NaiveDate> = None;
        let mut date_max: Option<NaiveDate> = None;
        let mut codes = HashSet::new();
        for record in &records {
            date_min = Some(date_min.map_or(record.date, |d| d.min(record.date)));
            date_max = Some(date_max.map_or(record.date, |d| d.max(record.date)));
            codes.insert(record.state_code.as_str());
        }
        let n_codes = codes.len();
        let rows_used = records.len();

        Self {
            records,
            row_errors,
            rows_read,
            rows_used,
            date_min,
            date_max,
            n_codes,
        }
    }
}

/// Population-feed ingest output.
#[derive(Debug, Clone)]
pub struct PopulationIngest {
    pub records: Vec<PopulationRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl PopulationIngest {
    /// Wrap already-validated records (used by the demo generator).
    pub fn from_records(records: Vec<PopulationRecord>) -> Self {
        let rows = records.len();
        Self {
            rows_used: records.len(),
            records,
            row_errors: Vec::new(),
            rows_read: rows,
        }
    }
}

/// Load the CDC daily case feed.
///
/// Required columns: `submission_date` (MM/DD/YYYY), `state` (code),
/// `new_case`, `new_death` (numeric text, possibly negative). Extra columns
/// are ignored. Bad rows are skipped and reported; only an unreadable file,
/// a missing column, or zero usable rows fail the load.
pub fn load_case_records(path: &Path) -> Result<CaseIngest, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open case CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read case CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in ["submission_date", "state", "new_case", "new_death"] {
        if !header_map.contains_key(name) {
            return Err(AppError::new(
                2,
                format!("Case CSV is missing required column: `{name}`"),
            ));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_case_row(&record, &header_map) {
            Ok(case) => records.push(case),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::new(3, "No valid case rows remain after validation."));
    }

    Ok(CaseIngest::build(records, row_errors, rows_read))
}

/// Load the census population feed.
///
/// Required columns: `state` (full name) and a population column headed by a
/// 4-digit year with comma-grouped digits. A column literally named `2019`
/// is preferred; otherwise the largest year header present is used.
pub fn load_population_records(path: &Path) -> Result<PopulationIngest, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open population CSV '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read population CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key("state") {
        return Err(AppError::new(
            2,
            "Population CSV is missing required column: `state`",
        ));
    }
    let year_column = resolve_year_column(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_population_row(&record, &header_map, &year_column) {
            Ok(pop) => records.push(pop),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::new(
            3,
            "No valid population rows remain after validation.",
        ));
    }

    Ok(PopulationIngest {
        rows_used: records.len(),
        records,
        row_errors,
        rows_read,
    })
}

fn parse_case_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<CaseRecord, String> {
    let state_code = get_required(record, header_map, "state")?.to_string();
    let date = parse_case_date(get_required(record, header_map, "submission_date")?)?;
    let new_cases = parse_count(get_required(record, header_map, "new_case")?)?;
    let new_deaths = parse_count(get_required(record, header_map, "new_death")?)?;

    Ok(CaseRecord {
        state_code,
        date,
        new_cases,
        new_deaths,
    })
}

fn parse_population_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    year_column: &str,
) -> Result<PopulationRecord, String> {
    let state_name = get_required(record, header_map, "state")?.to_string();
    let population = parse_grouped_u64(get_required(record, header_map, year_column)?)?;

    Ok(PopulationRecord {
        state_name,
        population,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿state"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Pick the population year column: `2019` if present, else the largest
/// 4-digit-year header.
fn resolve_year_column(header_map: &HashMap<String, usize>) -> Result<String, AppError> {
    if header_map.contains_key("2019") {
        return Ok("2019".to_string());
    }

    let mut best: Option<&String> = None;
    for name in header_map.keys() {
        if name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit()) {
            if best.map_or(true, |b| name > b) {
                best = Some(name);
            }
        }
    }

    best.cloned().ok_or_else(|| {
        AppError::new(
            2,
            "Population CSV has no year column (expected a 4-digit header such as `2019`).",
        )
    })
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

/// The case feed uses a single fixed date format.
fn parse_case_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .map_err(|_| format!("Invalid date '{s}'. Expected MM/DD/YYYY."))
}

/// Case/death counts: plain numeric text. Negative values are legitimate
/// corrections and pass through unchanged.
fn parse_count(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid count '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite count '{s}'."));
    }
    Ok(v)
}

/// Census population figures: digits with optional comma grouping.
fn parse_grouped_u64(s: &str) -> Result<u64, String> {
    let cleaned = s.replace(',', "");
    cleaned
        .parse::<u64>()
        .map_err(|_| format!("Invalid population '{s}'."))
}
