//! Free-text date parsing for work-history ranges.
//!
//! Parsers emit dates in whatever shape the source document used. This module recognizes
//! the common families, records which family each date came from, and turns ranges into
//! month intervals. Numeric `NN/NN/YYYY` dates are ambiguous between day/month and
//! month/day; the first valid reading wins and the ambiguity is never resolved. Callers
//! only check that a document uses one family consistently. Two-digit years pivot on the
//! current year: `'99` is 1999 until 2099, `'21` is 2021.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ExperienceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    IsoDate,
    IsoMonth,
    NumericMonthYear,
    NumericShortYear,
    NumericFull,
    MonthNameYear,
    SeasonYear,
    YearOnly,
}

impl DateFormat {
    /// Formats a reader perceives as the same style: `03/2020` and `3/20` are both
    /// numeric, `Mar 2020` and `Spring 2020` are both written out.
    pub fn family(self) -> &'static str {
        match self {
            DateFormat::IsoDate | DateFormat::IsoMonth => "iso",
            DateFormat::NumericMonthYear | DateFormat::NumericShortYear | DateFormat::NumericFull => "numeric",
            DateFormat::MonthNameYear | DateFormat::SeasonYear => "named",
            DateFormat::YearOnly => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParse {
    Empty,
    Present,
    Parsed { date: NaiveDate, format: DateFormat },
    /// Recognizable shape with impossible values (`13/2020`), or no known shape at all.
    Invalid { format: Option<DateFormat> },
}

impl DateParse {
    pub fn format(&self) -> Option<DateFormat> {
        match self {
            DateParse::Parsed { format, .. } => Some(*format),
            DateParse::Invalid { format } => *format,
            DateParse::Empty | DateParse::Present => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, DateParse::Invalid { .. })
    }
}

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date regex"));
static ISO_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})$").expect("valid iso month regex"));
static NUMERIC_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{4})$").expect("valid month/year regex"));
static NUMERIC_SHORT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{2})$").expect("valid month/yy regex"));
static NUMERIC_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})$").expect("valid full numeric regex")
});
static MONTH_NAME_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)\.?,?\s+'?(\d{4}|\d{2})$").expect("valid month name regex")
});
static SEASON_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(spring|summer|fall|autumn|winter)\s+(\d{4})$").expect("valid season regex")
});
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("valid year regex"));
static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:–|—|-|\bto\b|\buntil\b)\s*").expect("valid separator regex"));

const PRESENT_WORDS: &[&str] = &[
    "present", "current", "currently", "now", "ongoing", "today", "to date", "till date",
];

const MIN_YEAR: i32 = 1950;
const MAX_YEAR: i32 = 2100;

/// Parses one free-text date.
pub fn parse_date(raw: &str) -> DateParse {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return DateParse::Empty;
    }
    if PRESENT_WORDS.contains(&text.as_str()) {
        return DateParse::Present;
    }

    if let Some(c) = ISO_DATE.captures(&text) {
        return build(DateFormat::IsoDate, num(&c[1]), num(&c[2]), num(&c[3]));
    }
    if let Some(c) = ISO_MONTH.captures(&text) {
        return build(DateFormat::IsoMonth, num(&c[1]), num(&c[2]), 1);
    }
    if let Some(c) = NUMERIC_FULL.captures(&text) {
        let (a, b, year) = (num(&c[1]), num(&c[2]), num(&c[3]));
        // Month-first reading, then day-first. Whichever is valid first is kept.
        return match build(DateFormat::NumericFull, year, a, b) {
            DateParse::Invalid { .. } => build(DateFormat::NumericFull, year, b, a),
            parsed => parsed,
        };
    }
    if let Some(c) = NUMERIC_MONTH_YEAR.captures(&text) {
        return build(DateFormat::NumericMonthYear, num(&c[2]), num(&c[1]), 1);
    }
    if let Some(c) = NUMERIC_SHORT_YEAR.captures(&text) {
        let year = expand_year(&c[2], century_pivot());
        return build(DateFormat::NumericShortYear, year, num(&c[1]), 1);
    }
    if let Some(c) = SEASON_YEAR.captures(&text) {
        let month = match &c[1] {
            "spring" => 3,
            "summer" => 6,
            "fall" | "autumn" => 9,
            _ => 12,
        };
        return build(DateFormat::SeasonYear, num(&c[2]), month, 1);
    }
    if let Some(c) = MONTH_NAME_YEAR.captures(&text) {
        return match month_from_name(&c[1]) {
            Some(month) => {
                let year = expand_year(&c[2], century_pivot());
                build(DateFormat::MonthNameYear, year, month, 1)
            }
            None => DateParse::Invalid { format: None },
        };
    }
    if let Some(c) = YEAR_ONLY.captures(&text) {
        return build(DateFormat::YearOnly, num(&c[1]), 1, 1);
    }

    DateParse::Invalid { format: None }
}

fn num(s: &str) -> i32 {
    s.parse().unwrap_or(-1)
}

/// Two-digit years above `pivot` belong to the previous century.
fn expand_year(s: &str, pivot: i32) -> i32 {
    let year = num(s);
    match (s.len(), year) {
        (2, yy) if yy > pivot => 1900 + yy,
        (2, yy) => 2000 + yy,
        _ => year,
    }
}

fn century_pivot() -> i32 {
    Utc::now().year() % 100
}

fn build(format: DateFormat, year: i32, month: i32, day: i32) -> DateParse {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
        return DateParse::Invalid {
            format: Some(format),
        };
    }
    match NaiveDate::from_ymd_opt(year, month as u32, day.max(0) as u32) {
        Some(date) => DateParse::Parsed { date, format },
        None => DateParse::Invalid {
            format: Some(format),
        },
    }
}

fn month_from_name(name: &str) -> Option<i32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    if name.len() < 3 {
        return None;
    }
    let prefix = &name[..3];
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as i32 + 1)
}

/// A parsed start/end pair for one experience entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeParse {
    pub start: DateParse,
    pub end: DateParse,
}

impl RangeParse {
    /// Resolves to a month interval. `Present` ends at `today`; a year-only end date
    /// covers the whole year. `None` when either side is unusable.
    pub fn interval(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = match self.start {
            DateParse::Parsed { date, .. } => date,
            _ => return None,
        };
        let end = match self.end {
            DateParse::Present => today,
            DateParse::Parsed {
                date,
                format: DateFormat::YearOnly,
            } => NaiveDate::from_ymd_opt(date.year(), 12, 1).unwrap_or(date),
            DateParse::Parsed { date, .. } => date,
            _ => return None,
        };
        Some((start, end.min(today.max(start))))
    }

    /// Both sides parsed and the end precedes the start.
    pub fn is_reversed(&self) -> bool {
        match (self.start, self.end) {
            (DateParse::Parsed { date: s, .. }, DateParse::Parsed { date: e, .. }) => e < s,
            _ => false,
        }
    }
}

/// Parses an entry's dates. When the end date is blank and the start date holds a whole
/// range (`Jan 2020 - Mar 2021`), the range is split.
pub fn parse_entry_range(entry: &ExperienceEntry) -> RangeParse {
    let start = parse_date(&entry.start_date);
    if entry.end_date.trim().is_empty() && start.is_invalid() {
        if let Some(range) = split_range(entry.start_date.trim()) {
            return range;
        }
    }
    RangeParse {
        start,
        end: parse_date(&entry.end_date),
    }
}

/// Splits at the first separator with a parseable date on both sides, so hyphens inside
/// ISO dates (`2020-01 - 2021-03`) are skipped. Falls back to the first separator whose
/// left side parses, keeping an unreadable end visible as invalid.
fn split_range(text: &str) -> Option<RangeParse> {
    let splits: Vec<RangeParse> = RANGE_SEPARATOR
        .find_iter(text)
        .filter(|m| m.start() > 0 && m.end() < text.len())
        .map(|m| RangeParse {
            start: parse_date(&text[..m.start()]),
            end: parse_date(&text[m.end()..]),
        })
        .collect();
    splits
        .iter()
        .find(|r| !r.start.is_invalid() && !r.end.is_invalid())
        .or_else(|| splits.iter().find(|r| !r.start.is_invalid()))
        .copied()
}

/// Whole months from `from` to `to`; negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Total years of experience with overlapping positions merged.
/// Returns `None` when no entry has a usable interval.
pub fn total_experience_years(entries: &[ExperienceEntry], today: NaiveDate) -> Option<f64> {
    let mut intervals: Vec<(NaiveDate, NaiveDate)> = entries
        .iter()
        .filter_map(|e| parse_entry_range(e).interval(today))
        .filter(|(s, e)| s <= e)
        .collect();

    if intervals.is_empty() {
        return None;
    }

    intervals.sort();
    let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let months: i32 = merged
        .iter()
        .map(|(s, e)| months_between(*s, *e).max(0))
        .sum();
    Some(months as f64 / 12.0)
}
