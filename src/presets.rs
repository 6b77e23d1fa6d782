use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

use crate::coerce::start_of_day;
use crate::models::{DateBounds, DateSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: &'static str,
}

impl DateRange {
    fn days(start: NaiveDate, end: NaiveDate, label: &'static str) -> Self {
        Self {
            start: start_of_day(start),
            end: end_of_day(end),
            label,
        }
    }

    pub fn span(&self) -> DateSpan {
        DateSpan {
            start: self.start,
            end: self.end,
        }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(86_399)
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn start_of_quarter(date: NaiveDate) -> NaiveDate {
    let month_start = start_of_month(date);
    month_start
        .checked_sub_months(Months::new(date.month0() % 3))
        .unwrap_or(month_start)
}

fn start_of_year(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.ordinal0()))
}

/// Resolves a named preset relative to `now`. `AllTime` spans the data
/// bounds when there are any, otherwise the last year.
pub fn date_range_for_preset(
    preset: DatePreset,
    now: NaiveDateTime,
    bounds: Option<DateBounds>,
) -> DateRange {
    let today = now.date();
    let day = Duration::days(1);

    match preset {
        DatePreset::Today => DateRange::days(today, today, "Today"),
        DatePreset::Yesterday => DateRange::days(today - day, today - day, "Yesterday"),
        DatePreset::Last7Days => DateRange::days(today - Duration::days(6), today, "Last 7 Days"),
        DatePreset::Last30Days => {
            DateRange::days(today - Duration::days(29), today, "Last 30 Days")
        }
        DatePreset::ThisWeek => DateRange::days(start_of_week(today), today, "This Week"),
        DatePreset::LastWeek => {
            let this_week = start_of_week(today);
            DateRange::days(this_week - Duration::days(7), this_week - day, "Last Week")
        }
        DatePreset::ThisMonth => DateRange::days(start_of_month(today), today, "This Month"),
        DatePreset::LastMonth => {
            let this_month = start_of_month(today);
            DateRange::days(start_of_month(this_month - day), this_month - day, "Last Month")
        }
        DatePreset::ThisQuarter => {
            DateRange::days(start_of_quarter(today), today, "This Quarter")
        }
        DatePreset::LastQuarter => {
            let this_quarter = start_of_quarter(today);
            DateRange::days(
                start_of_quarter(this_quarter - day),
                this_quarter - day,
                "Last Quarter",
            )
        }
        DatePreset::ThisYear => DateRange::days(start_of_year(today), today, "This Year"),
        DatePreset::LastYear => {
            let this_year = start_of_year(today);
            DateRange::days(start_of_year(this_year - day), this_year - day, "Last Year")
        }
        DatePreset::AllTime => match bounds {
            Some(bounds) => DateRange {
                start: bounds.min,
                end: bounds.max,
                label: "All Time",
            },
            None => DateRange::days(today - Duration::days(365), today, "All Time"),
        },
    }
}
