//! Decoded text to header-keyed rows.

use models::{ImportError, Row};

#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Structural problems (ragged rows, CSV syntax errors). Merged into the
    /// same warnings list as semantic row rejections further up.
    pub warnings: Vec<String>,
}

/// Splits decoded text into a header row and data rows.
///
/// Lenient by design: the first non-empty record is the header, all-blank
/// records are dropped greedily, ragged records are zipped against the
/// header (extra cells dropped, missing cells empty) with a warning, and a
/// CSV syntax error on one record never aborts the rest of the file.
pub fn tabulate(text: &str) -> Result<Table, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();
    let mut warnings = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warnings.push(format!("line {}: {}", idx + 1, e));
                continue;
            }
        };

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        if headers.is_empty() {
            headers = record.iter().map(|c| c.trim().to_string()).collect();
            continue;
        }

        if record.len() != headers.len() {
            warnings.push(format!(
                "line {}: expected {} columns, found {}",
                idx + 1,
                headers.len(),
                record.len()
            ));
        }

        let mut row = Row::new();
        for (i, header) in headers.iter().enumerate() {
            row.insert(header.clone(), record.get(i).unwrap_or("").trim().to_string());
        }
        rows.push(row);
    }

    if headers.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    Ok(Table {
        headers,
        rows,
        warnings,
    })
}

/// First chunk of the decoded text, for adapter detection.
pub fn detection_sample(text: &str) -> &str {
    let mut end = 4096.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_split() {
        let table = tabulate("Date,Symbol\n2024-01-01,AAPL\n2024-01-02,MSFT\n").unwrap();
        assert_eq!(table.headers, vec!["Date", "Symbol"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Symbol"], "MSFT");
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped_greedily() {
        let table = tabulate("\n\nDate,Symbol\n\n2024-01-01,AAPL\n,,\n").unwrap();
        assert_eq!(table.headers, vec!["Date", "Symbol"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn ragged_rows_are_kept_with_a_warning() {
        let table = tabulate("Date,Symbol,Price\n2024-01-01,AAPL\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Price"], "");
        assert_eq!(table.warnings.len(), 1);
        assert!(table.warnings[0].contains("expected 3 columns"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(tabulate(""), Err(ImportError::EmptyFile)));
        assert!(matches!(tabulate("\n\n"), Err(ImportError::EmptyFile)));
    }

    #[test]
    fn quoted_cells_keep_their_commas() {
        let table = tabulate("Name,Price\n\"Apple, Inc.\",150\n").unwrap();
        assert_eq!(table.rows[0]["Name"], "Apple, Inc.");
    }
}
