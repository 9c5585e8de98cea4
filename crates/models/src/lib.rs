use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version stamp attached to every `ParseResult`.
pub const PIPELINE_VERSION: &str = "1.0.0";

/// One uploaded export file, exactly as the upload layer hands it over.
///
/// Lives only for the duration of a single import call; nothing in the
/// pipeline holds on to it.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// File extension, lowercased, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

/// One data line of the source file, keyed by the header row verbatim.
pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// The canonical trade record every source format converges to.
///
/// `qty` and `price` are strictly positive on every trade the pipeline
/// emits; rows that would violate this are dropped with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrade {
    pub date: NaiveDate,
    pub ticker: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub qty: f64,
    pub price: f64,
    pub currency: String,
    pub fees: f64,
    /// Identifier of the adapter (or `"generic"`) that produced this trade.
    pub source: String,
    /// Stable fingerprint of the originating row, for downstream dedup.
    pub raw_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMeta {
    pub rows: usize,
    pub invalid: usize,
    pub duration_ms: u64,
    pub version: String,
}

/// Success envelope: which adapter ran, what it produced, what it skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub broker: String,
    pub trades: Vec<NormalizedTrade>,
    pub warnings: Vec<String>,
    pub meta: ParseMeta,
}

/// The seven standard fields any source format must be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardField {
    Date,
    Ticker,
    Action,
    Quantity,
    Price,
    Currency,
    Fees,
}

impl StandardField {
    pub const ALL: [StandardField; 7] = [
        StandardField::Date,
        StandardField::Ticker,
        StandardField::Action,
        StandardField::Quantity,
        StandardField::Price,
        StandardField::Currency,
        StandardField::Fees,
    ];

    /// Fields a usable mapping cannot go without.
    pub const REQUIRED: [StandardField; 5] = [
        StandardField::Date,
        StandardField::Ticker,
        StandardField::Action,
        StandardField::Quantity,
        StandardField::Price,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StandardField::Date => "date",
            StandardField::Ticker => "ticker",
            StandardField::Action => "action",
            StandardField::Quantity => "quantity",
            StandardField::Price => "price",
            StandardField::Currency => "currency",
            StandardField::Fees => "fees",
        }
    }
}

/// Partial mapping from standard fields to the source file's column headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UniversalMapping {
    pub date: Option<String>,
    pub ticker: Option<String>,
    pub action: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub fees: Option<String>,
}

impl UniversalMapping {
    pub fn get(&self, field: StandardField) -> Option<&str> {
        match field {
            StandardField::Date => self.date.as_deref(),
            StandardField::Ticker => self.ticker.as_deref(),
            StandardField::Action => self.action.as_deref(),
            StandardField::Quantity => self.quantity.as_deref(),
            StandardField::Price => self.price.as_deref(),
            StandardField::Currency => self.currency.as_deref(),
            StandardField::Fees => self.fees.as_deref(),
        }
    }

    pub fn set(&mut self, field: StandardField, header: impl Into<String>) {
        let header = Some(header.into());
        match field {
            StandardField::Date => self.date = header,
            StandardField::Ticker => self.ticker = header,
            StandardField::Action => self.action = header,
            StandardField::Quantity => self.quantity = header,
            StandardField::Price => self.price = header,
            StandardField::Currency => self.currency = header,
            StandardField::Fees => self.fees = header,
        }
    }

    pub fn missing_required(&self) -> Vec<StandardField> {
        StandardField::REQUIRED
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn has_required(&self) -> bool {
        self.missing_required().is_empty()
    }
}

/// Ambiguous envelope: everything the caller's UI needs to present a
/// manual-correction form, plus the decoded text so the confirmed second
/// pass does not have to re-read the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiresMapping {
    pub headers: Vec<String>,
    pub sample_rows: Vec<Row>,
    pub suggested: UniversalMapping,
    pub confidence: f64,
    pub raw_text: String,
}

/// What an import call hands back; callers discriminate on `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportOutcome {
    Parsed(ParseResult),
    RequiresMapping(RequiresMapping),
}

impl ImportOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ImportOutcome::Parsed(_))
    }
}

/// File-level and cell-level failures.
///
/// Cell-level variants (`DateParse`, `NumberParse`) are turned into row
/// warnings by the parsing loops; the rest abort the whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Cannot decode file: {0}")]
    Decode(String),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("No header row found in file")]
    EmptyFile,
    #[error("Missing required column mapping: {0}")]
    MissingMapping(String),
    #[error("Unrecognized date: {value}")]
    DateParse { value: String },
    #[error("Not a number: {value}")]
    NumberParse { value: String },
}
