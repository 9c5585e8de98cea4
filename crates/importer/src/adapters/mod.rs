//! Broker format descriptors and dispatch.
//!
//! Each supported platform is a plain `AdapterSpec` value: detection signals
//! plus the column names its exports use. One shared engine interprets the
//! descriptors, so supporting another broker is a catalog entry, not a new
//! parser.

pub mod catalog;
mod engine;
mod exchange;

pub use engine::{parse_text_with, parse_with};
pub(crate) use engine::row_warning;

/// Ordered per-field column-name fallbacks for a standard tabular export.
/// Earlier names win; later ones cover older or regional export revisions.
pub struct ColumnMap {
    pub date: &'static [&'static str],
    pub ticker: &'static [&'static str],
    pub action: &'static [&'static str],
    pub quantity: &'static [&'static str],
    pub price: &'static [&'static str],
    pub currency: &'static [&'static str],
    pub fees: &'static [&'static str],
    /// Direction is carried by the sign of the quantity column rather than
    /// an action keyword (IBKR Flex, DEGIRO).
    pub signed_quantity: bool,
}

/// Column names for exports that record trades as two-sided exchanges
/// (sent amount / received amount) instead of a single signed action.
pub struct ExchangeColumns {
    pub date: &'static [&'static str],
    pub label: &'static [&'static str],
    /// When non-empty, the label must contain one of these to count as a
    /// trade at all.
    pub trade_labels: &'static [&'static str],
    pub pair: &'static [&'static str],
    pub sent_amount: &'static str,
    pub sent_currency: &'static str,
    pub received_amount: &'static str,
    pub received_currency: &'static str,
    /// Explicit price column, consulted when only one side is populated.
    pub price: &'static [&'static str],
    pub fees: &'static [&'static str],
}

pub enum AdapterKind {
    Standard(ColumnMap),
    Exchange(ExchangeColumns),
}

/// One platform's format description.
pub struct AdapterSpec {
    pub id: &'static str,
    /// Lowercase brand tokens; a hit in the first lines of the sample marks
    /// a match. Kept off platforms whose name is too generic to be a signal.
    pub brand_signals: &'static [&'static str],
    /// Lowercase header fragments that must all appear in the header line.
    /// At least one has to be unique to the platform; two adapters matching
    /// on shared generic names like `Date,Price` mis-parse each other's
    /// files.
    pub header_signals: &'static [&'static str],
    /// Uppercase action keywords marking non-trade events (dividends,
    /// transfers, interest); matching rows are skipped without a warning.
    pub non_trade_keywords: &'static [&'static str],
    pub default_currency: &'static str,
    pub default_locale: &'static str,
    pub kind: AdapterKind,
}

impl AdapterSpec {
    /// Fast conservative check over the first portion of the decoded text.
    ///
    /// Both signal kinds only look at the first non-empty line; a data row
    /// mentioning another platform's name must not trigger its adapter.
    pub fn detect(&self, sample: &str) -> bool {
        let first_line = sample
            .lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("")
            .to_ascii_lowercase();

        if self.brand_signals.iter().any(|b| first_line.contains(b)) {
            return true;
        }

        !self.header_signals.is_empty()
            && self.header_signals.iter().all(|h| first_line.contains(h))
    }
}

/// First catalog entry whose detector accepts the sample; order matters for
/// ambiguous files, so the catalog lists stronger signals first.
pub fn detect_adapter(sample: &str) -> Option<&'static AdapterSpec> {
    catalog::CATALOG.iter().find(|spec| spec.detect(sample))
}
