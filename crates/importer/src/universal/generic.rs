//! Row-to-trade transform driven by a resolved column mapping.

use std::time::Instant;

use log::debug;
use models::{
    ImportError, NormalizedTrade, ParseMeta, ParseResult, Row, StandardField, TradeSide,
    UniversalMapping, PIPELINE_VERSION,
};
use normalize::{hash_row, infer_currency, to_iso, to_number, to_ticker, Locale};

use super::GENERIC_SOURCE;
use crate::adapters::row_warning;
use crate::table::tabulate;

const NON_TRADE_KEYWORDS: &[&str] = &["DIVIDEND", "INTEREST", "TRANSFER"];

/// Converts one row under the mapping.
///
/// Two distinct skip flavors, deliberately asymmetric: a blank or non-trade
/// action and a blank date/ticker mean "not a trade row" and skip silently;
/// unparseable numbers and non-positive qty/price mean "malformed trade row"
/// and come back as a warning.
pub fn generic_row_to_trade(
    row: &Row,
    mapping: &UniversalMapping,
    locale: Locale,
) -> Result<Option<NormalizedTrade>, String> {
    let action = mapped_cell(row, mapping, StandardField::Action)
        .unwrap_or_default()
        .to_ascii_uppercase();
    if action.is_empty() || NON_TRADE_KEYWORDS.iter().any(|k| action.contains(k)) {
        return Ok(None);
    }

    let date_raw = match mapped_cell(row, mapping, StandardField::Date) {
        Some(v) => v,
        None => return Ok(None),
    };
    let ticker_raw = match mapped_cell(row, mapping, StandardField::Ticker) {
        Some(v) => v,
        None => return Ok(None),
    };

    let date = to_iso(&date_raw, locale).map_err(|e| e.to_string())?;
    let ticker = to_ticker(&ticker_raw);
    if ticker.is_empty() {
        return Ok(None);
    }

    let qty_raw = mapped_cell(row, mapping, StandardField::Quantity).unwrap_or_else(|| "0".into());
    let price_raw = mapped_cell(row, mapping, StandardField::Price).unwrap_or_else(|| "0".into());
    let qty = to_number(&qty_raw, locale).map_err(|e| e.to_string())?;
    let price = to_number(&price_raw, locale).map_err(|e| e.to_string())?;
    if !(qty > 0.0 && price > 0.0) {
        return Err(format!("Non-positive qty/price: qty={}, price={}", qty, price));
    }

    let side = if action.contains("SELL") || action.contains("SOLD") {
        TradeSide::Sell
    } else {
        TradeSide::Buy
    };
    let currency = mapped_cell(row, mapping, StandardField::Currency)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| infer_currency(row, "USD"));
    let fees = match mapped_cell(row, mapping, StandardField::Fees) {
        Some(raw) => to_number(&raw, locale).map_err(|e| e.to_string())?.abs(),
        None => 0.0,
    };

    Ok(Some(NormalizedTrade {
        date,
        ticker,
        side,
        qty,
        price,
        currency,
        fees,
        source: GENERIC_SOURCE.to_string(),
        raw_hash: hash_row(row),
    }))
}

/// Parses full decoded text with the given mapping.
///
/// A mapping that misses any required field is rejected up front with a
/// `MissingMapping` error instead of failing row by row.
pub fn generic_parse(
    text: &str,
    mapping: &UniversalMapping,
    locale: Locale,
) -> Result<ParseResult, ImportError> {
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        return Err(ImportError::MissingMapping(names.join(", ")));
    }

    let t0 = Instant::now();
    let table = tabulate(text)?;
    let mut warnings = table.warnings;
    let mut trades = Vec::new();

    for row in &table.rows {
        match generic_row_to_trade(row, mapping, locale) {
            Ok(Some(trade)) => trades.push(trade),
            Ok(None) => {}
            Err(reason) => warnings.push(row_warning(row, &reason)),
        }
    }

    debug!(
        "generic: {} trades, {} warnings from {} rows",
        trades.len(),
        warnings.len(),
        table.rows.len()
    );

    Ok(ParseResult {
        broker: GENERIC_SOURCE.to_string(),
        trades,
        meta: ParseMeta {
            rows: table.rows.len(),
            invalid: warnings.len(),
            duration_ms: t0.elapsed().as_millis() as u64,
            version: PIPELINE_VERSION.to_string(),
        },
        warnings,
    })
}

fn mapped_cell(row: &Row, mapping: &UniversalMapping, field: StandardField) -> Option<String> {
    let column = mapping.get(field)?;
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mapping() -> UniversalMapping {
        let mut mapping = UniversalMapping::default();
        mapping.set(StandardField::Date, "Date");
        mapping.set(StandardField::Ticker, "Symbol");
        mapping.set(StandardField::Action, "Action");
        mapping.set(StandardField::Quantity, "Quantity");
        mapping.set(StandardField::Price, "Price");
        mapping
    }

    #[test]
    fn rows_without_required_cells_skip_silently() {
        let csv = "Date,Symbol,Action,Quantity,Price\n\
                   ,AAPL,BUY,10,150.00\n\
                   2024-01-01,,BUY,10,150.00\n\
                   2024-01-02,AAPL,BUY,10,150.00\n";

        let result = generic_parse(csv, &full_mapping(), normalize::EN_US).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn incomplete_mapping_is_a_named_error() {
        let mut mapping = full_mapping();
        mapping.price = None;
        mapping.quantity = None;

        match generic_parse("Date,Symbol\n", &mapping, normalize::EN_US) {
            Err(ImportError::MissingMapping(fields)) => {
                assert_eq!(fields, "quantity, price");
            }
            other => panic!("expected MissingMapping, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn fees_default_to_zero_and_currency_to_usd() {
        let csv = "Date,Symbol,Action,Quantity,Price\n2024-01-01,AAPL,BUY,10,150.00\n";
        let result = generic_parse(csv, &full_mapping(), normalize::EN_US).unwrap();

        let trade = &result.trades[0];
        assert_eq!(trade.fees, 0.0);
        assert_eq!(trade.currency, "USD");
        assert_eq!(trade.source, "generic");
    }
}
