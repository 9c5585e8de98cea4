//! Direction resolution for exports that record trades as two-sided
//! exchanges (sent amount / received amount) rather than a signed action.

use models::{NormalizedTrade, Row, TradeSide};
use normalize::{hash_row, infer_currency, to_iso, to_number, to_ticker, Locale};

use super::engine::{first_cell, is_non_trade};
use super::{AdapterSpec, ExchangeColumns};

/// Resolves one exchange-style row into a trade, a silent skip, or a
/// warning.
///
/// One-sided rows are a plain BUY (received) or SELL (sent) of that side's
/// asset, priced from the opposite amount or an explicit price column. A row
/// with no recoverable price is rejected with a warning rather than priced
/// at a made-up value. Two-sided rows are currency exchanges: the pair
/// string names the base asset, selling the base is a SELL, acquiring it a
/// BUY, and the unit price is the ratio of the two amounts.
pub(super) fn resolve_exchange(
    spec: &AdapterSpec,
    cols: &ExchangeColumns,
    row: &Row,
    locale: Locale,
) -> Result<Option<NormalizedTrade>, String> {
    if !cols.label.is_empty() {
        let label = match first_cell(row, cols.label) {
            Some(l) => l.to_ascii_uppercase(),
            // unlabeled rows in a labeled format are not trades
            None => return Ok(None),
        };
        if is_non_trade(&label, spec.non_trade_keywords) {
            return Ok(None);
        }
        if !cols.trade_labels.is_empty() && !cols.trade_labels.iter().any(|t| label.contains(t)) {
            return Ok(None);
        }
    }

    let sent = optional_amount(row, cols.sent_amount, locale)?;
    let received = optional_amount(row, cols.received_amount, locale)?;
    if sent.is_none() && received.is_none() {
        return Ok(None);
    }

    let sent_ccy = cell(row, cols.sent_currency);
    let received_ccy = cell(row, cols.received_currency);
    let pair = first_cell(row, cols.pair).unwrap_or_default();
    let (base, quote) = split_pair(&pair);

    let date_raw = first_cell(row, cols.date).ok_or("missing date")?;
    let date = to_iso(&date_raw, locale).map_err(|e| e.to_string())?;

    let (side, asset, qty, price, currency) = match (sent, received) {
        (Some(s), Some(r)) if s > 0.0 && r > 0.0 => {
            // two-sided exchange: direction depends on which side is the base
            let base_asset = base.clone().unwrap_or_else(|| sent_ccy.clone());
            if sent_ccy.is_empty() || sent_ccy.eq_ignore_ascii_case(&base_asset) {
                let currency = pick(&[&quote.unwrap_or_default(), &received_ccy]);
                (TradeSide::Sell, base_asset, s, r / s, currency)
            } else {
                let currency = pick(&[&quote.unwrap_or_default(), &sent_ccy]);
                (TradeSide::Buy, base_asset, r, s / r, currency)
            }
        }
        (Some(s), _) if s > 0.0 => {
            let asset = pick(&[&sent_ccy, &base.unwrap_or_default()]);
            let price = explicit_price(row, cols, locale)?
                .ok_or("no price information for one-sided exchange")?;
            (TradeSide::Sell, asset, s, price, received_ccy)
        }
        (_, Some(r)) if r > 0.0 => {
            let asset = pick(&[&received_ccy, &base.unwrap_or_default()]);
            let price = explicit_price(row, cols, locale)?
                .ok_or("no price information for one-sided exchange")?;
            (TradeSide::Buy, asset, r, price, sent_ccy)
        }
        _ => return Ok(None),
    };

    let ticker = to_ticker(&asset);
    if ticker.is_empty() {
        return Err("missing asset symbol".to_string());
    }
    if !(qty > 0.0 && price > 0.0) {
        return Err(format!("Non-positive qty/price: qty={}, price={}", qty, price));
    }

    let currency = if currency.is_empty() {
        infer_currency(row, spec.default_currency)
    } else {
        currency.to_ascii_uppercase()
    };
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

fn cell(row: &Row, name: &str) -> String {
    row.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Parses an optional amount cell; blank is `None`, garbage is an error.
fn optional_amount(row: &Row, name: &str, locale: Locale) -> Result<Option<f64>, String> {
    match row.get(name).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => to_number(v, locale)
            .map(Some)
            .map_err(|e| e.to_string()),
        _ => Ok(None),
    }
}

fn explicit_price(
    row: &Row,
    cols: &ExchangeColumns,
    locale: Locale,
) -> Result<Option<f64>, String> {
    match first_cell(row, cols.price) {
        Some(raw) => to_number(&raw, locale)
            .map(Some)
            .map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// `"BTC-USD"` / `"BTC/USD"` into base and quote.
fn split_pair(pair: &str) -> (Option<String>, Option<String>) {
    let pair = pair.trim();
    for sep in ['-', '/'] {
        if let Some((base, quote)) = pair.split_once(sep) {
            if !base.trim().is_empty() {
                return (
                    Some(base.trim().to_string()),
                    Some(quote.trim().to_string()).filter(|q| !q.is_empty()),
                );
            }
        }
    }
    (None, None)
}

fn pick(candidates: &[&str]) -> String {
    candidates
        .iter()
        .find(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::super::catalog::CATALOG;
    use super::super::parse_text_with;
    use super::*;

    fn koinly() -> &'static AdapterSpec {
        CATALOG.iter().find(|s| s.id == "koinly").unwrap()
    }

    const HEADER: &str = "Koinly Date,Pair,Sent Amount,Sent Currency,Received Amount,Received Currency,Fee Amount,Fee Currency,Label,Description";

    #[test]
    fn two_sided_exchange_selling_the_base() {
        let csv = format!(
            "{}\n2024-01-02 10:00:00,BTC-USD,0.5,BTC,21000,USD,10,USD,trade,sold btc\n",
            HEADER
        );

        let result = parse_text_with(koinly(), &csv, None).unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.ticker, "BTC");
        assert_eq!(trade.qty, 0.5);
        assert_eq!(trade.price, 42000.0);
        assert_eq!(trade.currency, "USD");
        assert_eq!(trade.fees, 10.0);
    }

    #[test]
    fn two_sided_exchange_acquiring_the_base() {
        let csv = format!(
            "{}\n2024-01-02 10:00:00,ETH-USD,3000,USD,1.5,ETH,0,USD,trade,bought eth\n",
            HEADER
        );

        let result = parse_text_with(koinly(), &csv, None).unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.ticker, "ETH");
        assert_eq!(trade.qty, 1.5);
        assert_eq!(trade.price, 2000.0);
        assert_eq!(trade.currency, "USD");
    }

    #[test]
    fn one_sided_rows_need_a_price_column() {
        // no received side, no explicit price: rejected, not priced at 1
        let csv = format!(
            "{}\n2024-01-02 10:00:00,,2,SOL,,,,,trade,moved out\n",
            HEADER
        );

        let result = parse_text_with(koinly(), &csv, None).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("no price information"));
    }

    #[test]
    fn one_sided_rows_use_the_explicit_price_when_present() {
        let header = format!("{},Price", HEADER);
        let csv = format!(
            "{}\n2024-01-02 10:00:00,,,,2,SOL,,,trade,bought sol,95.50\n",
            header
        );

        let result = parse_text_with(koinly(), &csv, None).unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.ticker, "SOL");
        assert_eq!(trade.price, 95.5);
        // no opposite currency on the row; adapter default applies
        assert_eq!(trade.currency, "USD");
    }

    #[test]
    fn transfers_and_unlabeled_rows_skip_silently() {
        let csv = format!(
            "{}\n2024-01-02 10:00:00,,1,BTC,1,BTC,,,transfer,wallet move\n\
             2024-01-03 10:00:00,,1,BTC,,,,,,\n",
            HEADER
        );

        let result = parse_text_with(koinly(), &csv, None).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn pairs_split_on_dash_and_slash() {
        assert_eq!(
            split_pair("BTC-USD"),
            (Some("BTC".to_string()), Some("USD".to_string()))
        );
        assert_eq!(
            split_pair("ETH/EUR"),
            (Some("ETH".to_string()), Some("EUR".to_string()))
        );
        assert_eq!(split_pair(""), (None, None));
    }
}
