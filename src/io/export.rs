//! Export the scored dataset to CSV.
//!
//! The report keeps the uploaded columns (original spelling and order) and
//! appends `income_to_loan_ratio`, `risk_score`, `risk_level`. If the upload
//! already carried one of those columns (e.g. a re-uploaded report), the fresh
//! value replaces it in place instead of being appended twice.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::{DERIVED_COLUMNS, REGION_COLUMN, ScoredBorrower, ScoredDataset};
use crate::error::AppError;

/// Write the report CSV to a file.
pub fn write_report_csv(path: &Path, dataset: &ScoredDataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report CSV '{}': {e}", path.display())))?;
    write_report(file, dataset)?;
    info!(path = %path.display(), rows = dataset.len(), "wrote risk report");
    Ok(())
}

/// Write the report CSV to any writer.
pub fn write_report<W: Write>(writer: W, dataset: &ScoredDataset) -> Result<(), AppError> {
    let layout = report_layout(dataset);

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(layout.iter().map(|slot| slot.header(dataset)))
        .map_err(|e| AppError::new(4, format!("Failed to write report CSV header: {e}")))?;

    for row in &dataset.rows {
        out.write_record(layout.iter().map(|slot| slot.value(dataset, row)))
            .map_err(|e| AppError::new(4, format!("Failed to write report CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush report CSV: {e}")))?;
    Ok(())
}

/// Where each report cell comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// First occurrence of a typed input column (`age`, `income`, `loan_amount`, `region`).
    Typed(usize),
    /// Any other input column, read from the record's extras.
    Extra(usize),
    /// One of `DERIVED_COLUMNS` (by position), optionally replacing input column `Some(idx)`.
    Derived(usize, Option<usize>),
}

impl Slot {
    fn header(self, dataset: &ScoredDataset) -> String {
        match self {
            Slot::Typed(idx) | Slot::Extra(idx) | Slot::Derived(_, Some(idx)) => {
                dataset.columns[idx].name.clone()
            }
            Slot::Derived(d, None) => DERIVED_COLUMNS[d].to_string(),
        }
    }

    fn value(self, dataset: &ScoredDataset, row: &ScoredBorrower) -> String {
        match self {
            Slot::Typed(idx) => match dataset.columns[idx].key.as_str() {
                "age" => row.record.age.to_string(),
                "income" => row.record.income.to_string(),
                "loan_amount" => row.record.loan_amount.to_string(),
                _ => row.record.region.clone().unwrap_or_default(),
            },
            Slot::Extra(idx) => row
                .record
                .extras
                .get(&dataset.columns[idx].name)
                .cloned()
                .unwrap_or_default(),
            Slot::Derived(0, _) => row.income_to_loan_ratio.to_string(),
            Slot::Derived(1, _) => row.risk_score.to_string(),
            Slot::Derived(_, _) => row.risk_level.map(|l| l.label().to_string()).unwrap_or_default(),
        }
    }
}

fn report_layout(dataset: &ScoredDataset) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(dataset.columns.len() + DERIVED_COLUMNS.len());
    let mut placed = [false; DERIVED_COLUMNS.len()];

    for (idx, column) in dataset.columns.iter().enumerate() {
        let first = !dataset.columns[..idx].iter().any(|c| c.key == column.key);
        let typed = matches!(column.key.as_str(), "age" | "income" | "loan_amount" | REGION_COLUMN);
        let derived = DERIVED_COLUMNS.iter().position(|d| *d == column.key);

        let slot = match derived {
            Some(d) if first => {
                placed[d] = true;
                Slot::Derived(d, Some(idx))
            }
            _ if first && typed => Slot::Typed(idx),
            _ => Slot::Extra(idx),
        };
        slots.push(slot);
    }

    for (d, done) in placed.iter().enumerate() {
        if !done {
            slots.push(Slot::Derived(d, None));
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::{IngestOptions, parse_dataset};
    use crate::risk::score;

    fn scored(csv: &str) -> ScoredDataset {
        let ingest = parse_dataset(csv.as_bytes(), IngestOptions::default()).unwrap();
        score(&ingest.dataset)
    }

    fn export(dataset: &ScoredDataset) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, dataset).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_appends_derived_columns() {
        let ds = scored("age,income,loan_amount\n30,1000,2000\n");
        let csv = export(&ds);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("age,income,loan_amount,income_to_loan_ratio,risk_score,risk_level")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("30,1000,2000,0.5,"));
        assert!(row.ends_with(",Medium"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn report_keeps_input_column_order_and_extras() {
        let ds = scored("name,region,loan_amount,income,age\nAma,Accra,2000,1000,30\nKofi,,100,100,-100\n");
        let csv = export(&ds);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "name,region,loan_amount,income,age,income_to_loan_ratio,risk_score,risk_level"
        );
        assert!(lines[1].starts_with("Ama,Accra,2000,1000,30,"));
        // Zero score: no level, written as an empty cell.
        assert_eq!(lines[2], "Kofi,,100,100,-100,1,0,");
    }

    #[test]
    fn round_trip_preserves_values() {
        let ds = scored(
            "age,income,loan_amount,region\n30,1000,2000,Accra\n52,12345.67,3000.5,Kumasi\n19,250,9000,Tamale\n",
        );
        let csv = export(&ds);

        let reparsed = parse_dataset(csv.as_bytes(), IngestOptions::default()).unwrap();
        assert_eq!(reparsed.rows_used, ds.len());

        for (orig, back) in ds.rows.iter().zip(&reparsed.dataset.records) {
            assert_eq!(orig.record.age, back.age);
            assert_eq!(orig.record.income, back.income);
            assert_eq!(orig.record.loan_amount, back.loan_amount);
            assert_eq!(orig.record.region, back.region);

            let ratio: f64 = back.extras["income_to_loan_ratio"].parse().unwrap();
            let risk: f64 = back.extras["risk_score"].parse().unwrap();
            assert_eq!(ratio, orig.income_to_loan_ratio);
            assert_eq!(risk, orig.risk_score);
            assert_eq!(
                back.extras["risk_level"],
                orig.risk_level.map(|l| l.label().to_string()).unwrap_or_default()
            );
        }
    }

    #[test]
    fn re_exporting_a_report_does_not_duplicate_derived_columns() {
        let first = export(&scored("age,income,loan_amount\n30,1000,2000\n"));
        let second = export(&scored(&first));
        assert_eq!(first, second);
    }
}
