//! Interactive CSV picker.
//!
//! Used when `score`/`dashboard` run without `-f`: list the borrower CSVs found
//! under the current directory and let the user choose one (the terminal
//! counterpart of a file upload box).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// How deep to recurse when looking for CSV files.
const SEARCH_DEPTH: usize = 3;

/// Directories never worth scanning.
const SKIP_DIRS: [&str; 3] = [".git", "target", "node_modules"];

/// Prompt on stdin/stdout for a CSV path.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found here. Pass one with `-f <borrowers.csv>`.",
        ));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    pick(&files, &mut stdin.lock(), &mut stdout)
}

/// Selection loop, generic over the streams so it can be driven from tests.
///
/// Accepts a list number or a literal path; `q` (or end of input) cancels.
fn pick<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::new(2, format!("Prompt I/O failed: {e}"));

    writeln!(out, "Borrower CSV files:").map_err(io_err)?;
    for (i, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", i + 1, display_path(path)).map_err(io_err)?;
    }

    loop {
        write!(out, "Pick 1-{} or enter a path (q to quit): ", files.len()).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::new(2, "No selection made."));
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        let candidate = match answer.parse::<usize>() {
            Ok(n) if (1..=files.len()).contains(&n) => files[n - 1].clone(),
            Ok(n) => {
                writeln!(out, "No file numbered {n}.").map_err(io_err)?;
                continue;
            }
            Err(_) => PathBuf::from(answer),
        };

        match validate_csv_path(&candidate) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(io_err)?,
        }
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.is_file() {
        return Err(AppError::new(2, format!("Not a file: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file, got {}", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Every `*.csv` below `root`, sorted by display path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    walk(root, 0, &mut found);
    found.sort_by_key(|p| display_path(p));
    found
}

fn walk(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(kind) = entry.file_type() else {
            continue;
        };
        if kind.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !SKIP_DIRS.contains(&name) {
                walk(&path, depth + 1, found);
            }
        } else if kind.is_file() && has_csv_extension(&path) {
            found.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_extension_is_case_insensitive() {
        assert!(has_csv_extension(Path::new("a/B.CSV")));
        assert!(!has_csv_extension(Path::new("a/b.tsv")));
        assert!(!has_csv_extension(Path::new("a/csv")));
    }

    #[test]
    fn display_path_strips_leading_dot() {
        assert_eq!(display_path(Path::new("./data/b.csv")), "data/b.csv");
    }

    #[test]
    fn quitting_cancels() {
        let files = vec![PathBuf::from("./b.csv")];
        let mut input = io::Cursor::new("q\n");
        let mut out = Vec::new();
        let err = pick(&files, &mut input, &mut out).unwrap_err();
        assert_eq!(err.message(), "Canceled.");
        assert!(String::from_utf8(out).unwrap().contains("1) b.csv"));
    }

    #[test]
    fn bad_number_then_eof() {
        let files = vec![PathBuf::from("./b.csv")];
        let mut input = io::Cursor::new("7\n");
        let mut out = Vec::new();
        assert!(pick(&files, &mut input, &mut out).is_err());
        assert!(String::from_utf8(out).unwrap().contains("No file numbered 7."));
    }

    #[test]
    fn missing_file_is_rejected() {
        assert!(validate_csv_path(Path::new("definitely/not/here.csv")).is_err());
    }
}
