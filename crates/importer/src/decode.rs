//! Raw bytes to decoded CSV text.
//!
//! CSV files decode as UTF-8 (BOM stripped, Windows-1252 fallback for the
//! exports that are not UTF-8). Spreadsheet binaries go through calamine:
//! first sheet only, serialized back to CSV so the rest of the pipeline has
//! a single input shape.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use models::{ImportError, RawFile};

enum FileKind {
    Csv,
    Spreadsheet,
}

fn classify(file: &RawFile) -> Result<FileKind, ImportError> {
    match file.extension().as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => return Ok(FileKind::Csv),
        Some("xlsx") | Some("xls") | Some("ods") => return Ok(FileKind::Spreadsheet),
        _ => {}
    }

    let mime = file.mime.to_ascii_lowercase();
    if mime.contains("csv") || mime.starts_with("text/") {
        Ok(FileKind::Csv)
    } else if mime.contains("spreadsheet") || mime.contains("ms-excel") || mime.contains("sheet") {
        Ok(FileKind::Spreadsheet)
    } else {
        Err(ImportError::UnsupportedFormat(file.mime.clone()))
    }
}

/// Decoded UTF-8 text for any supported upload. Pure function of the bytes.
pub fn decode(file: &RawFile) -> Result<String, ImportError> {
    match classify(file)? {
        FileKind::Csv => Ok(decode_text(&file.bytes)),
        FileKind::Spreadsheet => sheet_to_csv(&file.bytes),
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn sheet_to_csv(bytes: &[u8]) -> Result<String, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Spreadsheet("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in range.rows() {
        let record: Vec<String> = row.iter().map(|c| cell_str(c).trim().to_string()).collect();
        writer
            .write_record(&record)
            .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
    }

    let out = writer
        .into_inner()
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
    String::from_utf8(out).map_err(|e| ImportError::Decode(e.to_string()))
}

fn cell_str(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            // whole floats print as integers so "10.0" shares don't become noise
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Excel serial date conversion using the 1899-12-30 base.
fn excel_serial_to_iso(serial: f64) -> String {
    if !serial.is_finite() {
        return String::new();
    }
    let days = serial.floor() as i64;
    match NaiveDate::from_ymd_opt(1899, 12, 30) {
        Some(base) => (base + chrono::Duration::days(days))
            .format("%Y-%m-%d")
            .to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_bytes_decode_with_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Date,Symbol\n2024-01-01,AAPL\n");
        let file = RawFile::new("trades.csv", "text/csv", bytes);

        let text = decode(&file).unwrap();
        assert!(text.starts_with("Date,Symbol"));
    }

    #[test]
    fn non_utf8_csv_falls_back_to_windows_1252() {
        // "Montréal" with a latin-1 é
        let bytes = b"City\nMontr\xe9al\n".to_vec();
        let file = RawFile::new("trades.csv", "text/csv", bytes);

        let text = decode(&file).unwrap();
        assert!(text.contains("Montréal"));
    }

    #[test]
    fn unknown_mime_and_extension_is_unsupported() {
        let file = RawFile::new("statement.pdf", "application/pdf", vec![1, 2, 3]);
        match decode(&file) {
            Err(ImportError::UnsupportedFormat(mime)) => assert_eq!(mime, "application/pdf"),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn extension_wins_over_generic_mime() {
        let file = RawFile::new(
            "trades.csv",
            "application/octet-stream",
            b"Date\n2024-01-01\n".to_vec(),
        );
        assert!(decode(&file).is_ok());
    }

    #[test]
    fn excel_serial_dates_format_as_iso() {
        // serial 45292 = 2024-01-01
        assert_eq!(excel_serial_to_iso(45292.0), "2024-01-01");
    }
}
