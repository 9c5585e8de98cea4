//! Locale-aware scalar normalizers and row fingerprinting.
//!
//! Pure functions: raw string cells in, canonical values out. Every parsing
//! loop in the importer funnels its cells through here so date order and
//! separator handling stay consistent across broker formats.

use chrono::NaiveDate;
use models::{ImportError, Row};
use sha2::{Digest, Sha256};

/// Date-order and number-separator conventions for one import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// `15/01/2024` rather than `01/15/2024`.
    pub day_first: bool,
    /// `1.234,56` rather than `1,234.56`.
    pub comma_decimal: bool,
}

pub const EN_US: Locale = Locale {
    day_first: false,
    comma_decimal: false,
};

pub const EN_GB: Locale = Locale {
    day_first: true,
    comma_decimal: false,
};

impl Default for Locale {
    fn default() -> Self {
        EN_US
    }
}

impl Locale {
    /// Resolves a BCP-47-ish tag like `"en-US"` or `"de-DE"`.
    ///
    /// Unknown tags fall back to the en-US conventions, the documented
    /// default for the whole pipeline.
    pub fn from_tag(tag: &str) -> Locale {
        let mut parts = tag.split(['-', '_']);
        let lang = parts.next().unwrap_or("").to_ascii_lowercase();
        let region = parts.next().unwrap_or("").to_ascii_uppercase();

        match lang.as_str() {
            "en" => Locale {
                // en-US is month-first; the rest of the anglosphere is not
                day_first: !region.is_empty() && region != "US",
                comma_decimal: false,
            },
            "de" | "fr" | "es" | "it" | "nl" | "pt" | "sv" | "da" | "fi" | "nb" | "no" | "pl"
            | "tr" | "cs" | "ru" => Locale {
                day_first: true,
                comma_decimal: true,
            },
            "ja" | "zh" | "ko" => EN_US,
            _ => EN_US,
        }
    }
}

/// Parses a date cell into an ISO calendar date.
///
/// ISO forms (`2024-01-15`, `2024-01-15T10:30:00Z`) are recognized first;
/// two-field-ambiguous forms (`15/01/2024`, `01-15-24 10:30`) are resolved
/// by the locale's field order. Month-name dates (`January 15, 2024`) are
/// accepted because a handful of statement exports use them.
pub fn to_iso(raw: &str, locale: Locale) -> Result<NaiveDate, ImportError> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(ImportError::DateParse {
            value: raw.to_string(),
        });
    }

    if let Some(d) = parse_ymd(v) {
        return Ok(d);
    }
    if let Some(d) = parse_two_field(v, locale.day_first) {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(v, "%B %d, %Y") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(v, "%b %d, %Y") {
        return Ok(d);
    }

    Err(ImportError::DateParse {
        value: raw.to_string(),
    })
}

fn date_part(v: &str) -> &str {
    v.split([' ', 'T', ',']).next().unwrap_or(v)
}

fn parse_ymd(v: &str) -> Option<NaiveDate> {
    let mut it = date_part(v).split(['-', '/', '.']);
    let y = it.next()?;
    let m = it.next()?;
    let d = it.next()?;
    if it.next().is_some() || y.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

fn parse_two_field(v: &str, day_first: bool) -> Option<NaiveDate> {
    let mut it = date_part(v).split(['-', '/', '.']);
    let a = it.next()?;
    let b = it.next()?;
    let y = it.next()?;
    if it.next().is_some() || a.len() > 2 || b.len() > 2 {
        return None;
    }
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    let year: i32 = y.parse().ok()?;
    let year = if y.len() == 2 { 2000 + year } else { year };
    let (day, month) = if day_first { (a, b) } else { (b, a) };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a numeric cell respecting the locale's separators.
///
/// When both `.` and `,` appear, the later one is the decimal separator and
/// the other is grouping, whatever the locale says; with a single separator
/// the locale decides, except that unambiguous `1,234,567`-style grouping is
/// always recognized. Leading 3-letter currency prefixes (`USD 111.97`) and
/// currency symbols are stripped.
pub fn to_number(raw: &str, locale: Locale) -> Result<f64, ImportError> {
    let err = || ImportError::NumberParse {
        value: raw.to_string(),
    };

    let v = raw.trim();
    if v.is_empty() || v == "--" {
        return Err(err());
    }
    let v = strip_currency_prefix(v);
    let cleaned: String = v
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{2009}' | '\'' | '$' | '€' | '£'))
        .collect();

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let normalized = if has_comma && has_dot {
        if cleaned.rfind(',') > cleaned.rfind('.') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else if has_comma {
        if !locale.comma_decimal && is_grouping(&cleaned, ',') {
            cleaned.replace(',', "")
        } else {
            // a comma-decimal locale reads "1,234" as a decimal, not grouping
            cleaned.replace(',', ".")
        }
    } else if has_dot {
        if locale.comma_decimal && is_grouping(&cleaned, '.') {
            cleaned.replace('.', "")
        } else {
            cleaned
        }
    } else {
        cleaned
    };

    normalized.parse::<f64>().map_err(|_| err())
}

fn strip_currency_prefix(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() > 4 && b[..3].iter().all(|c| c.is_ascii_alphabetic()) && b[3] == b' ' {
        &s[4..]
    } else {
        s
    }
}

/// `1,234` / `12,345,678` style: 1-3 leading digits then 3-digit groups.
fn is_grouping(s: &str, sep: char) -> bool {
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut groups = s.split(sep);
    let first = match groups.next() {
        Some(g) => g,
        None => return false,
    };
    if first.is_empty() || first.len() > 3 || !first.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut rest = 0;
    for g in groups {
        if g.len() != 3 || !g.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        rest += 1;
    }
    rest > 0
}

/// Canonicalizes an instrument symbol.
///
/// Pair notation (`BTC/USDT`, `BTC-USDT`) and exchange suffixes (`TSLA:US`)
/// reduce to the base symbol; description cells (`Apple Inc. AAPL`) reduce
/// to their last token. Empty input yields an empty symbol, which callers
/// must reject themselves.
pub fn to_ticker(raw: &str) -> String {
    let t = raw.trim();
    if t.is_empty() {
        return String::new();
    }

    for sep in [':', '/', '-'] {
        if let Some((base, quote)) = t.split_once(sep) {
            if is_symbolish(base) && is_symbolish(quote) {
                return base.to_ascii_uppercase();
            }
        }
    }

    if t.contains(char::is_whitespace) && !is_plain_symbol(t) {
        if let Some(last) = t.split_whitespace().next_back() {
            return last
                .trim_matches(|c| c == '(' || c == ')')
                .to_ascii_uppercase();
        }
    }

    t.to_ascii_uppercase()
}

fn is_symbolish(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_plain_symbol(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
}

/// Currency-bearing headers seen across broker exports, in priority order.
const CURRENCY_HEADERS: &[&str] = &[
    "Currency",
    "CCY",
    "Currency (native)",
    "Spot Price Currency",
    "Currency (Price / share)",
];

/// Currency code from a currency-bearing column, else the adapter fallback.
pub fn infer_currency(row: &Row, fallback: &str) -> String {
    for key in CURRENCY_HEADERS {
        if let Some(v) = row.get(*key) {
            let v = v.trim();
            if !v.is_empty() {
                return v.to_ascii_uppercase();
            }
        }
    }
    fallback.to_string()
}

/// Stable fingerprint of a raw row: sha256 over key-sorted `k=v` pairs.
///
/// Order-independent so the same logical row hashes identically no matter
/// how the header map was built. Downstream imports dedup on this value.
pub fn hash_row(row: &Row) -> String {
    let mut pairs: Vec<String> = row.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    let key = pairs.join("|");

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
