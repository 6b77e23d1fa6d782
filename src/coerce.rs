//! Safe normalization of untyped CSV cells.
//!
//! Every function here is total: a value that cannot be interpreted comes
//! back as an empty string or `None`, never as an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::RawValue;

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-([A-Za-z]{3})-(\d{2})$").expect("valid date regex"));

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid number regex")
});

static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[-/]").expect("valid year-first regex"));

static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").expect("valid slash date regex")
});

const YEAR_FIRST_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const YEAR_FIRST_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const NAMED_MONTH_FORMATS: [&str; 4] = ["%d %b %Y", "%b %d, %Y", "%B %d, %Y", "%d-%b-%Y"];

fn is_nan_literal(value: &str) -> bool {
    value == "nan" || value == "NaN"
}

/// Trimmed text of a cell; `Absent`, NaN and the literal `nan` collapse to "".
pub fn safe_string(value: &RawValue) -> String {
    match value {
        RawValue::Absent => String::new(),
        RawValue::Text(text) if is_nan_literal(text) => String::new(),
        RawValue::Text(text) => text.trim().to_string(),
        RawValue::Number(number) if number.is_nan() => String::new(),
        RawValue::Number(number) => number.to_string(),
    }
}

/// Parses a cell into a calendar date, trying `DD-MMM-YY`, then the
/// native ISO/RFC shapes, then a fixed list of slash formats.
pub fn parse_date(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Text(text) => parse_date_str(text),
        _ => None,
    }
}

pub fn parse_date_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() || is_nan_literal(text) {
        return None;
    }

    parse_day_month_year(text)
        .or_else(|| parse_native(text))
        .or_else(|| parse_slash_date(text))
}

/// `M/D/Y`, falling back to `D/M/Y` when the first field cannot be a month.
/// Two-digit years below 50 land in the 2000s, the rest in the 1900s.
fn parse_slash_date(text: &str) -> Option<NaiveDateTime> {
    let captures = SLASH_DATE.captures(text)?;
    let first: u32 = captures[1].parse().ok()?;
    let second: u32 = captures[2].parse().ok()?;
    let mut year: i32 = captures[3].parse().ok()?;
    if captures[3].len() == 2 {
        year += if year < 50 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
        .map(start_of_day)
}

fn parse_day_month_year(text: &str) -> Option<NaiveDateTime> {
    let captures = DAY_MONTH_YEAR.captures(text)?;
    let day: u32 = captures[1].parse().ok()?;
    let month = month_number(&captures[2])?;
    // Two-digit years always land in the 2000s.
    let year = 2000 + captures[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(start_of_day)
}

fn month_number(abbreviation: &str) -> Option<u32> {
    let month = match abbreviation.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_native(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.naive_utc());
    }
    // chrono's `%Y` takes one to four digits, so year-first shapes need a full year.
    if YEAR_FIRST.is_match(text) {
        if let Some(parsed) = YEAR_FIRST_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        {
            return Some(parsed);
        }
        return YEAR_FIRST_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(start_of_day);
    }
    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(start_of_day)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Reads a numeric cell the way a lenient float parser would: leading
/// numeric prefix of text, finite numbers as-is, everything else `None`.
pub fn parse_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(number) if number.is_finite() => Some(*number),
        RawValue::Text(text) => LEADING_NUMBER
            .find(text.trim())
            .and_then(|found| found.as_str().parse::<f64>().ok())
            .filter(|number| number.is_finite()),
        _ => None,
    }
}
