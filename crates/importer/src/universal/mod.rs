//! Fallback pipeline for formats no broker adapter claims.
//!
//! Detecting → Parsed when the inferred mapping is confident and complete,
//! Detecting → RequiresMapping otherwise, and RequiresMapping → Parsed once
//! the caller resubmits a confirmed mapping.

mod generic;
mod infer;

pub use generic::{generic_parse, generic_row_to_trade};
pub use infer::{infer_mapping, Inference};

use models::{ImportError, ImportOutcome, ParseResult, RawFile, RequiresMapping, Row, UniversalMapping};
use normalize::Locale;

use crate::decode::decode;
use crate::table::tabulate;
use crate::DEFAULT_LOCALE;

/// Source tag on trades produced by this path, distinct from broker ids.
pub const GENERIC_SOURCE: &str = "generic";

/// Heuristic confidence needed to parse without a confirmation round-trip.
pub const CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Confidence recorded when the mapping came from the AI service; distinct
/// from every heuristic value so provenance stays recoverable.
pub const AI_CONFIDENCE: f64 = 0.95;

/// Early rows handed to the confirmation UI and the AI service.
const SAMPLE_ROWS: usize = 5;

pub fn universal_import(file: &RawFile, locale: Option<&str>) -> Result<ImportOutcome, ImportError> {
    let text = decode(file)?;
    universal_import_text(&text, locale)
}

/// The Detecting state: infer a mapping and either parse right away or hand
/// the caller everything needed for a manual-correction round-trip.
pub fn universal_import_text(
    text: &str,
    locale_tag: Option<&str>,
) -> Result<ImportOutcome, ImportError> {
    let locale = Locale::from_tag(locale_tag.unwrap_or(DEFAULT_LOCALE));
    let table = tabulate(text)?;
    let sample_rows: Vec<Row> = table.rows.iter().take(SAMPLE_ROWS).cloned().collect();

    let mut inference = infer_mapping(&table.headers, &sample_rows, locale);

    if inference.confidence < CONFIDENCE_THRESHOLD {
        if let Some(mapping) = ai_suggest(&table.headers, &sample_rows) {
            inference = Inference {
                mapping,
                confidence: AI_CONFIDENCE,
            };
        }
    }

    if inference.confidence >= CONFIDENCE_THRESHOLD && inference.mapping.has_required() {
        let result = generic_parse(text, &inference.mapping, locale)?;
        return Ok(ImportOutcome::Parsed(result));
    }

    Ok(ImportOutcome::RequiresMapping(RequiresMapping {
        headers: table.headers,
        sample_rows,
        suggested: inference.mapping,
        confidence: inference.confidence,
        raw_text: text.to_string(),
    }))
}

/// The confirmed second pass: no inference, the caller's mapping is
/// authoritative (and validated for required fields before any row parses).
pub fn confirmed_import(
    raw_text: &str,
    mapping: &UniversalMapping,
    locale_tag: Option<&str>,
) -> Result<ParseResult, ImportError> {
    let locale = Locale::from_tag(locale_tag.unwrap_or(DEFAULT_LOCALE));
    generic_parse(raw_text, mapping, locale)
}

/// Best-effort AI escalation. Any failure (client unavailable, timeout,
/// malformed reply) degrades to the heuristic mapping; it never aborts an
/// import or reaches the user as an error.
#[cfg(feature = "ai-mapping")]
fn ai_suggest(headers: &[String], sample_rows: &[Row]) -> Option<UniversalMapping> {
    use ai_client::{OllamaClient, OllamaClientConfig};
    use models::StandardField;

    let client = match OllamaClient::new(OllamaClientConfig::from_env()) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("AI mapping client unavailable: {e:#}");
            return None;
        }
    };
    let raw = match client.suggest_mapping(headers, sample_rows) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("AI mapping call failed, keeping heuristic mapping: {e:#}");
            return None;
        }
    };

    // only trust proposals that name headers actually present in the file
    let mut mapping = UniversalMapping::default();
    for field in StandardField::ALL {
        if let Some(column) = raw.get(field.as_str()) {
            if headers.iter().any(|h| h == column) {
                mapping.set(field, column.clone());
            }
        }
    }
    mapping.has_required().then_some(mapping)
}

#[cfg(not(feature = "ai-mapping"))]
fn ai_suggest(_headers: &[String], _sample_rows: &[Row]) -> Option<UniversalMapping> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{StandardField, TradeSide};

    #[test]
    fn confident_inference_parses_immediately() {
        // end-to-end scenario: exact required headers, one clean row
        let csv = "Date,Symbol,Action,Quantity,Price\n2024-01-01,AAPL,BUY,10,150.00\n";

        let outcome = universal_import_text(csv, Some("en-US")).unwrap();
        let result = match outcome {
            ImportOutcome::Parsed(r) => r,
            other => panic!("expected Parsed, got {:?}", other),
        };

        assert_eq!(result.broker, "generic");
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.date, chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(trade.ticker, "AAPL");
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.qty, 10.0);
        assert_eq!(trade.price, 150.0);
        assert_eq!(trade.currency, "USD");
        assert_eq!(trade.fees, 0.0);
        assert_eq!(trade.source, "generic");
    }

    #[test]
    fn dividend_rows_skip_without_warnings() {
        let csv = "Date,Symbol,Action,Quantity,Price\n\
                   2024-01-01,AAPL,BUY,10,150.00\n\
                   2024-02-01,AAPL,DIVIDEND,0,0.24\n\
                   2024-03-01,AAPL,SELL,5,160.00\n";

        let outcome = universal_import_text(csv, Some("en-US")).unwrap();
        let result = match outcome {
            ImportOutcome::Parsed(r) => r,
            other => panic!("expected Parsed, got {:?}", other),
        };
        assert_eq!(result.trades.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn zero_quantity_rows_come_back_as_warnings() {
        let csv = "Date,Symbol,Action,Quantity,Price\n\
                   2024-01-01,AAPL,BUY,0,150.00\n";

        let outcome = universal_import_text(csv, Some("en-US")).unwrap();
        let result = match outcome {
            ImportOutcome::Parsed(r) => r,
            other => panic!("expected Parsed, got {:?}", other),
        };
        assert!(result.trades.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Non-positive qty/price"));
    }

    #[test]
    fn partial_inference_requires_mapping_confirmation() {
        // 3 of 5 required fields resolve: confidence 0.6, below threshold
        let csv = "Date,Symbol,Action,Foo,Bar\n2024-01-01,AAPL,BUY,x,y\n";

        let outcome = universal_import_text(csv, Some("en-US")).unwrap();
        let req = match outcome {
            ImportOutcome::RequiresMapping(r) => r,
            other => panic!("expected RequiresMapping, got {:?}", other),
        };

        assert_eq!(req.confidence, 0.6);
        assert_eq!(req.headers, vec!["Date", "Symbol", "Action", "Foo", "Bar"]);
        assert_eq!(req.sample_rows.len(), 1);
        assert_eq!(req.suggested.get(StandardField::Date), Some("Date"));
        assert!(req.raw_text.contains("AAPL"));
    }

    #[test]
    fn confirmed_mapping_parses_the_stashed_text() {
        let csv = "Day,Name,Way,Count,Cost\n2024-01-01,AAPL,BUY,10,150.00\n";

        let outcome = universal_import_text(csv, Some("en-US")).unwrap();
        let req = match outcome {
            ImportOutcome::RequiresMapping(r) => r,
            other => panic!("expected RequiresMapping, got {:?}", other),
        };

        let mut mapping = UniversalMapping::default();
        mapping.set(StandardField::Date, "Day");
        mapping.set(StandardField::Ticker, "Name");
        mapping.set(StandardField::Action, "Way");
        mapping.set(StandardField::Quantity, "Count");
        mapping.set(StandardField::Price, "Cost");

        let result = confirmed_import(&req.raw_text, &mapping, Some("en-US")).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].ticker, "AAPL");
    }

    #[test]
    fn confirmed_mapping_missing_required_fields_is_rejected() {
        let mapping = UniversalMapping::default();
        match confirmed_import("Date,Symbol\n", &mapping, None) {
            Err(ImportError::MissingMapping(_)) => {}
            other => panic!("expected MissingMapping, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn universal_parse_is_idempotent() {
        let csv = "Date,Symbol,Action,Quantity,Price\n\
                   2024-01-01,AAPL,BUY,10,150.00\n\
                   2024-01-02,MSFT,SELL,4,390.00\n";

        let a = universal_import_text(csv, Some("en-US")).unwrap();
        let b = universal_import_text(csv, Some("en-US")).unwrap();
        match (a, b) {
            (ImportOutcome::Parsed(a), ImportOutcome::Parsed(b)) => {
                assert_eq!(a.trades, b.trades);
            }
            _ => panic!("both runs should parse"),
        }
    }
}
