//! Column-set validation for uploads.

use crate::domain::REQUIRED_COLUMNS;
use crate::error::MissingColumnsError;

/// Check that every required column is present.
///
/// `columns` are normalized header keys (see `io::ingest`). Value types, ranges
/// and empty cells are not checked here; row parsing handles those.
pub fn validate<S: AsRef<str>>(columns: &[S]) -> Result<(), MissingColumnsError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_ref() == **required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingColumnsError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_required_columns_in_any_order() {
        assert!(validate(&["loan_amount", "region", "age", "income"]).is_ok());
    }

    #[test]
    fn reports_exactly_the_missing_income_column() {
        let err = validate(&["age", "loan_amount"]).unwrap_err();
        assert_eq!(err.missing, vec!["income".to_string()]);
    }

    #[test]
    fn reports_all_missing_columns_in_canonical_order() {
        let err = validate(&["loan", "region"]).unwrap_err();
        assert_eq!(err.missing, vec!["age", "income", "loan_amount"]);
    }

    #[test]
    fn empty_header_misses_everything() {
        let empty: [&str; 0] = [];
        let err = validate(&empty).unwrap_err();
        assert_eq!(err.missing.len(), 3);
    }
}
