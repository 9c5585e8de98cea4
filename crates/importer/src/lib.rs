//! Broker export import and normalization pipeline.
//!
//! One entry point, [`import`]: decode the uploaded file, try the broker
//! format detectors, and fall back to the universal mapping-inference
//! pipeline when nothing claims it. Everything is a pure transformation of
//! the input bytes; nothing is cached or persisted, and concurrent imports
//! are independent.

pub mod adapters;
pub mod decode;
pub mod table;
pub mod universal;

pub use universal::confirmed_import;

use log::debug;
use models::{ImportError, ImportOutcome, RawFile};

/// Locale applied when the caller does not supply one.
pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// BCP-47-ish tag driving date order and decimal separators.
    pub locale: Option<String>,
    /// Skip broker detection and go straight to the universal pipeline.
    pub force_generic: bool,
}

/// Imports one raw file: first matching broker adapter wins, otherwise the
/// universal pipeline infers a mapping or asks the caller to confirm one.
pub fn import(file: &RawFile, options: &ImportOptions) -> Result<ImportOutcome, ImportError> {
    let text = decode::decode(file)?;
    let locale = options.locale.as_deref();

    if !options.force_generic {
        let sample = table::detection_sample(&text);
        if let Some(spec) = adapters::detect_adapter(sample) {
            debug!("detected broker format '{}' for {}", spec.id, file.name);
            let result = adapters::parse_text_with(spec, &text, locale)?;
            return Ok(ImportOutcome::Parsed(result));
        }
        debug!("no broker format matched {}", file.name);
    }

    universal::universal_import_text(&text, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::TradeSide;

    fn csv_file(name: &str, content: &str) -> RawFile {
        RawFile::new(name, "text/csv", content.as_bytes().to_vec())
    }

    #[test]
    fn known_broker_files_dispatch_to_their_adapter() {
        let file = csv_file(
            "t212.csv",
            "Action,Time,ISIN,Ticker,Name,No. of shares,Price / share,Currency (Price / share),Total\n\
             Market buy,2024-01-02 10:00:00,US0378331005,AAPL,Apple,10,185.50,USD,1855.00\n",
        );

        let outcome = import(&file, &ImportOptions::default()).unwrap();
        let result = match outcome {
            ImportOutcome::Parsed(r) => r,
            other => panic!("expected Parsed, got {:?}", other),
        };
        assert_eq!(result.broker, "trading212");
        assert_eq!(result.trades[0].source, "trading212");
    }

    #[test]
    fn unknown_formats_fall_back_to_the_universal_pipeline() {
        let file = csv_file(
            "export.csv",
            "Date,Symbol,Action,Quantity,Price\n2024-01-01,AAPL,BUY,10,150.00\n",
        );

        let outcome = import(&file, &ImportOptions::default()).unwrap();
        let result = match outcome {
            ImportOutcome::Parsed(r) => r,
            other => panic!("expected Parsed, got {:?}", other),
        };
        assert_eq!(result.broker, "generic");
    }

    #[test]
    fn force_generic_bypasses_broker_detection() {
        let file = csv_file(
            "t212.csv",
            "Action,Time,ISIN,Ticker,Name,No. of shares,Price / share,Currency (Price / share),Total\n\
             Market sell,2024-01-02 10:00:00,US0378331005,AAPL,Apple,10,185.50,USD,1855.00\n",
        );

        let options = ImportOptions {
            force_generic: true,
            ..Default::default()
        };
        let outcome = import(&file, &options).unwrap();
        match outcome {
            ImportOutcome::Parsed(result) => {
                assert_eq!(result.broker, "generic");
                assert_eq!(result.trades[0].side, TradeSide::Sell);
            }
            other => panic!("expected Parsed, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_files_fail_with_a_named_error() {
        let file = RawFile::new("statement.pdf", "application/pdf", vec![0u8; 8]);
        match import(&file, &ImportOptions::default()) {
            Err(ImportError::UnsupportedFormat(_)) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
        }
    }
}
