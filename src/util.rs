// Parsing, normalization and formatting helpers.
//
// Everything that touches raw source text lives here so the rest of the
// crate only sees typed values.
use chrono::{Datelike, Days, NaiveDate};
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Prices are published and displayed with Brazilian separators.
const DISPLAY_LOCALE: Locale = Locale::pt;

/// Parse a price written with a decimal comma (`"105,99"`).
///
/// - Trims whitespace.
/// - Replaces the decimal comma with a dot before parsing.
/// - Accepts exponent notation (`"1e2"`).
/// - Returns `None` for anything unparsable or negative.
pub fn parse_price_safe(s: Option<&str>) -> Option<Decimal> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', ".");
    let v = Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()?;
    if v.is_sign_negative() && !v.is_zero() {
        return None;
    }
    Some(v)
}

/// Collection dates come as `dd/mm/yyyy`.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Trimmed owned text, empty when the field is missing.
pub fn text_or_empty(s: Option<&str>) -> String {
    s.map(str::trim).unwrap_or_default().to_string()
}

/// Accent-stripped, trimmed, lower-cased form used for city comparison.
/// `"São Paulo "` and `"SAO PAULO"` normalize to the same string.
pub fn normalize_name(s: &str) -> String {
    s.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Monday of the week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    let offset = d.weekday().num_days_from_monday() as u64;
    d.checked_sub_days(Days::new(offset)).unwrap_or(d)
}

/// Mean price as `f64`; 0 for an empty slice to avoid NaNs.
pub fn average_price(v: &[Decimal]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: Decimal = v.iter().copied().sum();
    (sum / Decimal::from(v.len())).to_f64().unwrap_or_default()
}

/// Fixed-decimal rendering with locale separators (`1.234,56`).
pub fn format_number(n: f64, decimals: usize) -> String {
    localize(&format!("{:.*}", decimals, n))
}

pub fn format_decimal(n: Decimal, decimals: u32) -> String {
    localize(&format!("{:.*}", decimals as usize, n.round_dp(decimals)))
}

// Re-render a plain `-1234.56` string with the display locale.
fn localize(plain: &str) -> String {
    let (neg, digits) = match plain.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, plain),
    };
    let mut parts = digits.split('.');
    let int_val: u64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&DISPLAY_LOCALE);
    if let Some(frac) = parts.next() {
        res.push_str(DISPLAY_LOCALE.decimal());
        res.push_str(frac);
    }
    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    if neg && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&DISPLAY_LOCALE)
}

pub fn display_price(p: &f64) -> String {
    format_number(*p, 2)
}

pub fn display_opt_price(p: &Option<f64>) -> String {
    p.as_ref().map(display_price).unwrap_or_else(|| "-".to_string())
}

pub fn display_decimal(p: &Decimal) -> String {
    format_decimal(*p, 2)
}

pub fn display_opt_decimal(p: &Option<Decimal>) -> String {
    p.as_ref().map(display_decimal).unwrap_or_else(|| "-".to_string())
}
