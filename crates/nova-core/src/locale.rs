//! Country reference data and locale-aware formatting.
//!
//! Separators and currency placement follow the CLDR conventions for each
//! supported locale closely enough for display; the underlying magnitude is
//! never altered by formatting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
    /// First entry is the primary language.
    pub languages: &'static [&'static str],
}

impl Country {
    pub fn primary_language(&self) -> &'static str {
        self.languages.first().copied().unwrap_or(DEFAULT_LANGUAGE)
    }
}

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_LANGUAGE: &str = "en";

pub static COUNTRIES: [Country; 15] = [
    Country { code: "GB", name: "United Kingdom", currency: "GBP", languages: &["en"] },
    Country { code: "SE", name: "Sweden", currency: "SEK", languages: &["sv"] },
    Country { code: "CH", name: "Switzerland", currency: "CHF", languages: &["de", "fr", "it"] },
    Country { code: "CA", name: "Canada", currency: "CAD", languages: &["en", "fr"] },
    Country { code: "US", name: "United States", currency: "USD", languages: &["en"] },
    Country { code: "NL", name: "Netherlands", currency: "EUR", languages: &["nl"] },
    Country { code: "FR", name: "France", currency: "EUR", languages: &["fr"] },
    Country { code: "CZ", name: "Czech Republic", currency: "CZK", languages: &["cs"] },
    Country { code: "SK", name: "Slovakia", currency: "EUR", languages: &["sk"] },
    Country { code: "DE", name: "Germany", currency: "EUR", languages: &["de"] },
    Country { code: "RO", name: "Romania", currency: "RON", languages: &["ro"] },
    Country { code: "PL", name: "Poland", currency: "PLN", languages: &["pl"] },
    Country { code: "HU", name: "Hungary", currency: "HUF", languages: &["hu"] },
    Country { code: "IT", name: "Italy", currency: "EUR", languages: &["it"] },
    Country { code: "AT", name: "Austria", currency: "EUR", languages: &["de"] },
];

pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Currency used in `code`, or USD when the country is unknown.
pub fn currency_for_country(code: &str) -> &'static str {
    find_country(code).map(|c| c.currency).unwrap_or(DEFAULT_CURRENCY)
}

// ---------------------------------------------------------------------------
// Locale styles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrencyPlacement {
    /// `$1,234.56`
    Prefix,
    /// `€ 1.234,56`
    PrefixSpaced,
    /// `1.234,56 €`
    Suffix,
}

#[derive(Debug, Clone, Copy)]
struct LocaleStyle {
    tag: &'static str,
    group: &'static str,
    decimal: &'static str,
    currency: CurrencyPlacement,
    percent_spaced: bool,
    date_format: &'static str,
    time_format: &'static str,
}

const NBSP: &str = "\u{a0}";
const NNBSP: &str = "\u{202f}";

const fn style(
    tag: &'static str,
    group: &'static str,
    decimal: &'static str,
    currency: CurrencyPlacement,
    percent_spaced: bool,
    date_format: &'static str,
) -> LocaleStyle {
    LocaleStyle {
        tag,
        group,
        decimal,
        currency,
        percent_spaced,
        date_format,
        time_format: "%H:%M",
    }
}

const EN_US: LocaleStyle = LocaleStyle {
    tag: "en-US",
    group: ",",
    decimal: ".",
    currency: CurrencyPlacement::Prefix,
    percent_spaced: false,
    date_format: "%b %-d, %Y",
    time_format: "%-I:%M %p",
};

static LOCALES: [(&str, LocaleStyle); 11] = [
    ("en", EN_US),
    ("sv", style("sv-SE", NBSP, ",", CurrencyPlacement::Suffix, true, "%Y-%m-%d")),
    ("de", style("de-DE", ".", ",", CurrencyPlacement::Suffix, true, "%d.%m.%Y")),
    ("fr", style("fr-FR", NNBSP, ",", CurrencyPlacement::Suffix, true, "%d/%m/%Y")),
    ("it", style("it-IT", ".", ",", CurrencyPlacement::Suffix, false, "%d/%m/%Y")),
    ("nl", style("nl-NL", ".", ",", CurrencyPlacement::PrefixSpaced, false, "%d-%m-%Y")),
    ("cs", style("cs-CZ", NBSP, ",", CurrencyPlacement::Suffix, true, "%d.%m.%Y")),
    ("sk", style("sk-SK", NBSP, ",", CurrencyPlacement::Suffix, true, "%d.%m.%Y")),
    ("ro", style("ro-RO", ".", ",", CurrencyPlacement::Suffix, true, "%d.%m.%Y")),
    ("pl", style("pl-PL", NBSP, ",", CurrencyPlacement::Suffix, false, "%d.%m.%Y")),
    ("hu", style("hu-HU", NBSP, ",", CurrencyPlacement::Suffix, true, "%Y. %m. %d.")),
];

fn style_for(lang: &str) -> &'static LocaleStyle {
    LOCALES
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(lang))
        .map(|(_, s)| s)
        .unwrap_or(&EN_US)
}

/// Languages accepted by the settings form.
pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    LOCALES.iter().map(|(l, _)| *l)
}

pub fn is_supported_language(lang: &str) -> bool {
    supported_languages().any(|l| l == lang)
}

/// BCP 47 tag used for `lang`, falling back to `en-US`.
pub fn locale_tag(lang: &str) -> &'static str {
    style_for(lang).tag
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "CAD" => "CA$",
        "SEK" => "kr",
        "CZK" => "Kč",
        "PLN" => "zł",
        "HUF" => "Ft",
        "RON" => "RON",
        "CHF" => "CHF",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

fn group_digits(int_part: &str, sep: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

/// Magnitude of `value` with exactly `decimals` fraction digits, grouped.
fn format_abs(value: f64, style: &LocaleStyle, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = group_digits(int_part, style.group);
    if let Some(frac) = frac_part {
        out.push_str(style.decimal);
        out.push_str(frac);
    }
    out
}

fn sign(value: f64, decimals: usize) -> &'static str {
    // Values that round to zero print without a sign.
    let rounded = crate::types::round_dp(value, decimals as i32);
    if rounded < 0.0 {
        "-"
    } else {
        ""
    }
}

/// Format with exactly `decimals` fraction digits, or with up to three
/// (trailing zeros dropped) when `decimals` is `None`.
pub fn format_number(value: f64, lang: &str, decimals: Option<usize>) -> String {
    let style = style_for(lang);
    let Some(decimals) = decimals else {
        return format_trimmed(value, style);
    };
    format!("{}{}", sign(value, decimals), format_abs(value, style, decimals))
}

fn format_trimmed(value: f64, style: &LocaleStyle) -> String {
    let mut body = format_abs(value, style, 3);
    if body.contains(style.decimal) {
        while body.ends_with('0') {
            body.pop();
        }
        if body.ends_with(style.decimal) {
            body.truncate(body.len() - style.decimal.len());
        }
    }
    format!("{}{}", sign(value, 3), body)
}

pub fn format_currency(amount: f64, currency: &str, lang: &str) -> String {
    let style = style_for(lang);
    let symbol = currency_symbol(currency);
    let body = format_abs(amount, style, 2);
    let sign = sign(amount, 2);
    match style.currency {
        CurrencyPlacement::Prefix if symbol.chars().all(|c| c.is_ascii_uppercase()) => {
            format!("{sign}{symbol}{NBSP}{body}")
        }
        CurrencyPlacement::Prefix => format!("{sign}{symbol}{body}"),
        CurrencyPlacement::PrefixSpaced => format!("{symbol}{NBSP}{sign}{body}"),
        CurrencyPlacement::Suffix => format!("{sign}{body}{NBSP}{symbol}"),
    }
}

/// `value` is in percent units (12.5 means 12.5%); one fraction digit.
pub fn format_percentage(value: f64, lang: &str) -> String {
    let style = style_for(lang);
    let body = format_number(value, lang, Some(1));
    if style.percent_spaced {
        format!("{body}{NBSP}%")
    } else {
        format!("{body}%")
    }
}

// ---------------------------------------------------------------------------
// Date formatting
// ---------------------------------------------------------------------------

/// Parse `YYYY-MM-DD` or RFC 3339 into a UTC timestamp.
pub fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Locale date, or "-" for empty or unparseable input.
pub fn format_date(text: &str, lang: &str) -> String {
    match parse_date_time(text) {
        Some(dt) => dt.format(style_for(lang).date_format).to_string(),
        None => "-".to_string(),
    }
}

/// Locale date and time, or "Invalid date" for unparseable input.
pub fn format_date_time(text: &str, lang: &str) -> String {
    let style = style_for(lang);
    match parse_date_time(text) {
        Some(dt) => format!(
            "{}, {}",
            dt.format(style.date_format),
            dt.format(style.time_format)
        ),
        None => "Invalid date".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
