//! Heuristic column-mapping inference for unknown formats.

use std::collections::HashSet;

use models::{Row, StandardField, UniversalMapping};
use normalize::{to_number, Locale};

/// Known header synonyms per standard field, in priority order, harvested
/// from the broker catalog. Stored pre-normalized (lowercase, alphanumerics
/// only) so matching is a plain equality check.
fn synonyms_for(field: StandardField) -> &'static [&'static str] {
    match field {
        StandardField::Date => &[
            "date",
            "tradedate",
            "transactiondate",
            "activitydate",
            "rundate",
            "koinlydate",
            "dateutc",
            "timestamp",
            "settledate",
            "completeddate",
            "opendate",
            "filledtime",
            "placedtime",
            "opentime",
            "time",
        ],
        StandardField::Ticker => &[
            "ticker",
            "symbol",
            "instrument",
            "asset",
            "stock",
            "pair",
            "market",
            "product",
            "investmentname",
            "security",
            "isin",
        ],
        StandardField::Action => &[
            "action",
            "type",
            "side",
            "transactiontype",
            "transcode",
            "direction",
            "buysell",
            "activity",
            "label",
        ],
        StandardField::Quantity => &[
            "quantity",
            "qty",
            "shares",
            "units",
            "noofshares",
            "quantitytransacted",
            "vol",
            "volume",
            "filled",
            "executed",
            "amount",
        ],
        StandardField::Price => &[
            "price",
            "pricepershare",
            "priceshare",
            "tradeprice",
            "executionprice",
            "tprice",
            "shareprice",
            "avgprice",
            "openrate",
            "rate",
            "spotpriceattransaction",
            "usdspotpriceattransaction",
            "pricenative",
            "kurs",
        ],
        StandardField::Currency => &[
            "currency",
            "ccy",
            "currencynative",
            "spotpricecurrency",
            "currencypriceshare",
            "localcurrency",
        ],
        StandardField::Fees => &[
            "fees",
            "fee",
            "commission",
            "commfee",
            "feescomm",
            "feeamount",
            "transactioncosts",
            "stampduty",
        ],
    }
}

/// Aggressive header normalization: trim, casefold, strip everything that is
/// not a letter or digit.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct Inference {
    pub mapping: UniversalMapping,
    /// Fraction of required fields successfully mapped, in [0, 1].
    pub confidence: f64,
}

/// Maps file headers onto the standard fields.
///
/// First synonym match wins within a field, and a header assigned to an
/// earlier field is never reassigned to a later one. For the numeric fields
/// a validation pass prefers a synonym column whose sample values actually
/// parse as numbers, which guards against name collisions with non-numeric
/// columns.
pub fn infer_mapping(headers: &[String], sample_rows: &[Row], locale: Locale) -> Inference {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut used: HashSet<usize> = HashSet::new();
    let mut mapping = UniversalMapping::default();
    let mut assignment: Vec<(StandardField, usize)> = Vec::new();

    for field in StandardField::ALL {
        let found = synonyms_for(field).iter().find_map(|syn| {
            normalized
                .iter()
                .enumerate()
                .find(|(i, n)| !used.contains(i) && n.as_str() == *syn)
                .map(|(i, _)| i)
        });
        if let Some(i) = found {
            used.insert(i);
            assignment.push((field, i));
            mapping.set(field, headers[i].clone());
        }
    }

    for field in [StandardField::Quantity, StandardField::Price] {
        refine_numeric(
            field,
            headers,
            &normalized,
            sample_rows,
            locale,
            &mut used,
            &mut assignment,
            &mut mapping,
        );
    }

    let mapped = StandardField::REQUIRED
        .iter()
        .filter(|f| mapping.get(**f).is_some())
        .count();
    let confidence = mapped as f64 / StandardField::REQUIRED.len() as f64;

    Inference {
        mapping,
        confidence,
    }
}

/// If the chosen column's samples do not parse as numbers, look for another
/// synonym-matching column whose samples do.
#[allow(clippy::too_many_arguments)]
fn refine_numeric(
    field: StandardField,
    headers: &[String],
    normalized: &[String],
    sample_rows: &[Row],
    locale: Locale,
    used: &mut HashSet<usize>,
    assignment: &mut Vec<(StandardField, usize)>,
    mapping: &mut UniversalMapping,
) {
    let current = match assignment.iter().find(|(f, _)| *f == field) {
        Some((_, i)) => *i,
        None => return,
    };
    if samples_parse(&headers[current], sample_rows, locale) {
        return;
    }

    let replacement = synonyms_for(field).iter().find_map(|syn| {
        normalized
            .iter()
            .enumerate()
            .find(|(i, n)| {
                !used.contains(i) && n.as_str() == *syn && samples_parse(&headers[*i], sample_rows, locale)
            })
            .map(|(i, _)| i)
    });

    if let Some(i) = replacement {
        used.remove(&current);
        used.insert(i);
        if let Some(slot) = assignment.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = i;
        }
        mapping.set(field, headers[i].clone());
    }
}

/// True when no non-empty sample cell fails to parse as a number. A column
/// with no samples has nothing contradicting its synonym match.
fn samples_parse(header: &str, sample_rows: &[Row], locale: Locale) -> bool {
    for row in sample_rows {
        if let Some(v) = row.get(header) {
            let v = v.trim();
            if !v.is_empty() && to_number(v, locale).is_err() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalize::EN_US;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn exact_required_headers_give_full_confidence() {
        let inference = infer_mapping(
            &headers(&["Date", "Symbol", "Action", "Quantity", "Price"]),
            &[],
            EN_US,
        );
        assert_eq!(inference.confidence, 1.0);
        assert_eq!(inference.mapping.get(StandardField::Ticker), Some("Symbol"));
        assert!(inference.mapping.has_required());
    }

    #[test]
    fn unrecognized_headers_give_zero_confidence() {
        let inference = infer_mapping(&headers(&["Foo", "Bar", "Baz"]), &[], EN_US);
        assert_eq!(inference.confidence, 0.0);
        assert_eq!(inference.mapping, UniversalMapping::default());
    }

    #[test]
    fn partial_matches_give_fractional_confidence() {
        // date, ticker, action map; quantity and price do not
        let inference = infer_mapping(
            &headers(&["Date", "Symbol", "Action", "Foo", "Bar"]),
            &[],
            EN_US,
        );
        assert_eq!(inference.confidence, 0.6);
    }

    #[test]
    fn headers_are_matched_after_aggressive_normalization() {
        let inference = infer_mapping(
            &headers(&[" Trade Date ", "Price / share", "No. of shares", "Ticker", "Type"]),
            &[],
            EN_US,
        );
        assert_eq!(
            inference.mapping.get(StandardField::Date),
            Some(" Trade Date ")
        );
        assert_eq!(
            inference.mapping.get(StandardField::Price),
            Some("Price / share")
        );
        assert_eq!(
            inference.mapping.get(StandardField::Quantity),
            Some("No. of shares")
        );
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn a_header_claimed_once_is_not_reassigned() {
        // "Type" could match action; "Transaction Type" must not be stolen
        // from action by a later field once assigned
        let inference = infer_mapping(
            &headers(&["Date", "Asset", "Type", "Quantity", "Price"]),
            &[],
            EN_US,
        );
        assert_eq!(inference.mapping.get(StandardField::Action), Some("Type"));
        assert_eq!(inference.mapping.get(StandardField::Ticker), Some("Asset"));
    }

    #[test]
    fn numeric_validation_prefers_the_column_that_parses() {
        let hs = headers(&["Date", "Symbol", "Action", "Quantity", "Shares", "Price"]);
        let samples = vec![
            row(&[
                ("Date", "2024-01-01"),
                ("Symbol", "AAPL"),
                ("Action", "BUY"),
                ("Quantity", "ten units"),
                ("Shares", "10"),
                ("Price", "150.00"),
            ]),
            row(&[
                ("Date", "2024-01-02"),
                ("Symbol", "MSFT"),
                ("Action", "SELL"),
                ("Quantity", "five units"),
                ("Shares", "5"),
                ("Price", "390.00"),
            ]),
        ];

        let inference = infer_mapping(&hs, &samples, EN_US);
        assert_eq!(
            inference.mapping.get(StandardField::Quantity),
            Some("Shares")
        );
        assert_eq!(inference.confidence, 1.0);
    }
}
