//! The one parsing engine behind every catalog descriptor.

use std::time::Instant;

use log::debug;
use models::{
    ImportError, NormalizedTrade, ParseMeta, ParseResult, RawFile, Row, TradeSide,
    PIPELINE_VERSION,
};
use normalize::{hash_row, infer_currency, to_iso, to_number, to_ticker, Locale};

use super::exchange::resolve_exchange;
use super::{AdapterKind, AdapterSpec, ColumnMap};
use crate::decode::decode;
use crate::table::tabulate;

/// Decode and parse a raw file with the given descriptor.
pub fn parse_with(
    spec: &AdapterSpec,
    file: &RawFile,
    locale: Option<&str>,
) -> Result<ParseResult, ImportError> {
    let text = decode(file)?;
    parse_text_with(spec, &text, locale)
}

/// Parse already-decoded text with the given descriptor.
///
/// Row policy: non-trade rows are skipped silently, malformed trade rows are
/// skipped with a warning, and nothing short of an unreadable file aborts
/// the import.
pub fn parse_text_with(
    spec: &AdapterSpec,
    text: &str,
    locale: Option<&str>,
) -> Result<ParseResult, ImportError> {
    let t0 = Instant::now();
    let locale = Locale::from_tag(locale.unwrap_or(spec.default_locale));
    let table = tabulate(text)?;

    let mut warnings = table.warnings;
    let mut trades = Vec::new();

    for row in &table.rows {
        let outcome = match &spec.kind {
            AdapterKind::Standard(cols) => standard_row(spec, cols, row, locale),
            AdapterKind::Exchange(cols) => resolve_exchange(spec, cols, row, locale),
        };
        match outcome {
            Ok(Some(trade)) => trades.push(trade),
            Ok(None) => {}
            Err(reason) => warnings.push(row_warning(row, &reason)),
        }
    }

    debug!(
        "{}: {} trades, {} warnings from {} rows",
        spec.id,
        trades.len(),
        warnings.len(),
        table.rows.len()
    );

    Ok(ParseResult {
        broker: spec.id.to_string(),
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

fn standard_row(
    spec: &AdapterSpec,
    cols: &ColumnMap,
    row: &Row,
    locale: Locale,
) -> Result<Option<NormalizedTrade>, String> {
    let action = first_cell(row, cols.action)
        .map(|a| base_action(&a))
        .unwrap_or_default();

    let mut side = None;
    if action.is_empty() {
        // only signed-quantity formats may carry trades without an action
        if !cols.signed_quantity {
            return Ok(None);
        }
    } else {
        if is_non_trade(&action, spec.non_trade_keywords) {
            return Ok(None);
        }
        side = Some(side_from_action(&action));
    }

    let date_raw = first_cell(row, cols.date).ok_or("missing date")?;
    let ticker_raw = first_cell(row, cols.ticker).ok_or("missing ticker")?;
    let qty_raw = first_cell(row, cols.quantity).ok_or("missing quantity")?;
    let price_raw = first_cell(row, cols.price).ok_or("missing price")?;

    let date = to_iso(&date_raw, locale).map_err(|e| e.to_string())?;
    let ticker = to_ticker(&ticker_raw);
    if ticker.is_empty() {
        return Err("empty ticker".to_string());
    }
    let mut qty = to_number(&qty_raw, locale).map_err(|e| e.to_string())?;
    let price = to_number(&price_raw, locale).map_err(|e| e.to_string())?;

    let side = side.unwrap_or(if qty < 0.0 {
        TradeSide::Sell
    } else {
        TradeSide::Buy
    });
    if cols.signed_quantity {
        qty = qty.abs();
    }

    if !(qty > 0.0 && price > 0.0) {
        return Err(format!("Non-positive qty/price: qty={}, price={}", qty, price));
    }

    let currency = first_cell(row, cols.currency)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| infer_currency(row, spec.default_currency));
    // statements report commissions signed; fees are stored non-negative
    let fees = match first_cell(row, cols.fees) {
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
        source: spec.id.to_string(),
        raw_hash: hash_row(row),
    }))
}

/// First non-empty cell among the fallback column names.
pub(super) fn first_cell(row: &Row, names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| {
        row.get(*n)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// `"BUY - MARKET"` style qualifiers reduce to their base keyword.
pub(super) fn base_action(raw: &str) -> String {
    raw.split(" - ")
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_uppercase()
}

pub(super) fn is_non_trade(action: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| action.contains(k))
}

pub(super) fn side_from_action(action: &str) -> TradeSide {
    if action.contains("SELL") || action.contains("SOLD") {
        TradeSide::Sell
    } else {
        TradeSide::Buy
    }
}

/// Truncated row dump for a warning line, in stable key order.
pub(crate) fn row_warning(row: &Row, reason: &str) -> String {
    let mut pairs: Vec<String> = row
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    pairs.sort();

    let mut dump = pairs.join(", ");
    if dump.len() > 120 {
        let mut end = 120;
        while !dump.is_char_boundary(end) {
            end -= 1;
        }
        dump.truncate(end);
        dump.push('…');
    }
    format!("row {{{}}} → {}", dump, reason)
}
