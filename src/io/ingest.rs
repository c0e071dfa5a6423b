//! CSV ingest.
//!
//! This module is responsible for turning a borrower CSV into a typed
//! `Dataset` that is safe to score.
//!
//! Design goals:
//! - **Strict schema** for required columns (checked once, on the header)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Lossless extras**: unknown columns are carried through to the report

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{BorrowerRecord, Column, Dataset, REGION_COLUMN};
use crate::error::PipelineError;
use crate::risk::validate;

/// Ingest options.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Keep rows whose `loan_amount` is zero instead of rejecting them.
    pub allow_zero_loan: bool,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed dataset + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Open and parse a borrower CSV.
pub fn load_dataset(path: &Path, options: IngestOptions) -> Result<IngestedData, PipelineError> {
    let file = File::open(path)
        .map_err(|e| PipelineError::Parse(format!("cannot open '{}': {e}", path.display())))?;
    let ingest = parse_dataset(file, options)?;
    info!(
        path = %path.display(),
        rows_read = ingest.rows_read,
        rows_used = ingest.rows_used,
        "loaded borrower dataset"
    );
    Ok(ingest)
}

/// Parse a borrower CSV from any reader.
pub fn parse_dataset<R: Read>(reader: R, options: IngestOptions) -> Result<IngestedData, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Parse(format!("cannot read header row: {e}")))?
        .clone();

    let columns = build_columns(&headers);
    let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
    validate(&keys)?;

    let header_map: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.key.as_str(), idx))
        .rev() // first occurrence wins on duplicate headers
        .collect();

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, which is line 1.
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

        match parse_row(&record, &columns, &header_map, options) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, "skipped row: {}", err.message);
    }

    let rows_used = records.len();
    if rows_used == 0 && rows_read > 0 {
        return Err(PipelineError::NoValidRows { rows_read });
    }

    Ok(IngestedData {
        dataset: Dataset { columns, records },
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_columns(headers: &StringRecord) -> Vec<Column> {
    headers
        .iter()
        .map(|name| Column {
            name: name.trim_start_matches('\u{feff}').to_string(),
            key: normalize_header_name(name),
        })
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "\u{feff}age"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    columns: &[Column],
    header_map: &HashMap<&str, usize>,
    options: IngestOptions,
) -> Result<BorrowerRecord, String> {
    let age = parse_required_f64(record, header_map, "age")?;
    let income = parse_required_f64(record, header_map, "income")?;
    let loan_amount = parse_required_f64(record, header_map, "loan_amount")?;

    if loan_amount == 0.0 && !options.allow_zero_loan {
        return Err("`loan_amount` is zero (income-to-loan ratio undefined).".to_string());
    }

    let region = get_optional(record, header_map, REGION_COLUMN).map(str::to_string);

    let mut extras = BTreeMap::new();
    for (idx, column) in columns.iter().enumerate() {
        if header_map.get(column.key.as_str()) == Some(&idx) && is_typed_column(&column.key) {
            continue;
        }
        let value = record.get(idx).unwrap_or("").to_string();
        extras.entry(column.name.clone()).or_insert(value);
    }

    Ok(BorrowerRecord {
        age,
        income,
        loan_amount,
        region,
        extras,
    })
}

fn is_typed_column(key: &str) -> bool {
    matches!(key, "age" | "income" | "loan_amount" | REGION_COLUMN)
}

fn parse_required_f64(
    record: &StringRecord,
    header_map: &HashMap<&str, usize>,
    name: &str,
) -> Result<f64, String> {
    let raw = get_optional(record, header_map, name)
        .ok_or_else(|| format!("Missing required value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}' (expected a number)."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{raw}'."));
    }
    Ok(v)
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<&str, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<IngestedData, PipelineError> {
        parse_dataset(csv.as_bytes(), IngestOptions::default())
    }

    #[test]
    fn parses_required_and_optional_columns() {
        let data = parse("age,income,loan_amount,region,name\n30,1000,2000,Accra,Ama\n45,5000,1000,,Kofi\n")
            .unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 2);
        assert!(data.dataset.has_region());

        let first = &data.dataset.records[0];
        assert_eq!(first.age, 30.0);
        assert_eq!(first.income, 1000.0);
        assert_eq!(first.loan_amount, 2000.0);
        assert_eq!(first.region.as_deref(), Some("Accra"));
        assert_eq!(first.extras.get("name").map(String::as_str), Some("Ama"));
        assert!(!first.extras.contains_key("age"));

        assert_eq!(data.dataset.records[1].region, None);
    }

    #[test]
    fn missing_income_column_stops_before_rows() {
        let err = parse("age,loan_amount\n30,2000\n").unwrap_err();
        match err {
            PipelineError::MissingColumns(e) => assert_eq!(e.missing, vec!["income".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_matching_ignores_bom_case_and_whitespace() {
        let data = parse("\u{feff}Age , INCOME,Loan_Amount\n30,1000,2000\n").unwrap();
        assert_eq!(data.rows_used, 1);
        let names: Vec<&str> = data.dataset.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Age", "INCOME", "Loan_Amount"]);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let data = parse("age,income,loan_amount\n30,1000,2000\nabc,1000,2000\n40,,500\n50,100,0\n").unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 1);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(data.row_errors[2].message.contains("zero"));
    }

    #[test]
    fn zero_loan_kept_when_allowed() {
        let data = parse_dataset(
            "age,income,loan_amount\n30,1000,0\n".as_bytes(),
            IngestOptions { allow_zero_loan: true },
        )
        .unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.dataset.records[0].loan_amount, 0.0);
    }

    #[test]
    fn all_rows_rejected_is_an_error() {
        let err = parse("age,income,loan_amount\nx,y,z\n").unwrap_err();
        assert!(matches!(err, PipelineError::NoValidRows { rows_read: 1 }));
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let data = parse("age,income,loan_amount\n").unwrap();
        assert!(data.dataset.is_empty());
    }
}
