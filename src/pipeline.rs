use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::classify::categorize_status;
use crate::coerce::{parse_date, safe_string};
use crate::models::{
    columns, CandidateRecord, DashboardCategory, DateBounds, Facet, FilterOptions, RawRow,
    RawValue, Summary,
};

/// Columns consumed into typed fields of [`CandidateRecord`].
const TYPED_COLUMNS: [&str; 20] = [
    columns::REQ_DATE,
    columns::SOURCING_DATE,
    columns::SCREENING_DATE,
    columns::HM_DETAILS,
    columns::SKILL,
    columns::LOCATION,
    columns::RECRUITER,
    columns::CANDIDATE_NAME,
    columns::STATUS,
    columns::STATUS_R1,
    columns::STATUS_R2,
    columns::STATUS_R3,
    columns::SCREENING_CHECK,
    columns::TTF,
    columns::TTH,
    columns::OFFER_DATE,
    columns::OFFER_ACCEPTANCE_DATE,
    columns::JOINING_DATE,
    columns::SOURCE,
    columns::SUB_SOURCE,
];

static ABSENT: RawValue = RawValue::Absent;

fn cell<'a>(row: &'a RawRow, column: &str) -> &'a RawValue {
    row.get(column).unwrap_or(&ABSENT)
}

fn text(row: &RawRow, column: &str) -> String {
    safe_string(cell(row, column))
}

fn is_placeholder(row: &RawRow) -> bool {
    if text(row, columns::STATUS).eq_ignore_ascii_case("#n/a") {
        debug!("dropping row with #N/A status");
        return true;
    }
    if text(row, columns::CANDIDATE_NAME).is_empty() {
        debug!("dropping row without a candidate name");
        return true;
    }
    false
}

/// Validates, cleans and classifies raw rows. `now` stands in for
/// unparsable requisition and sourcing dates.
pub fn clean_and_process(rows: &[RawRow], now: NaiveDateTime) -> Vec<CandidateRecord> {
    let records: Vec<CandidateRecord> = rows
        .iter()
        .filter(|row| !is_placeholder(row))
        .map(|row| clean_row(row, now))
        .collect();

    info!(
        kept = records.len(),
        dropped = rows.len() - records.len(),
        "processed candidate rows"
    );
    records
}

fn clean_row(row: &RawRow, now: NaiveDateTime) -> CandidateRecord {
    let status = text(row, columns::STATUS);
    let status_r1 = text(row, columns::STATUS_R1);
    let status_r2 = text(row, columns::STATUS_R2);
    let status_r3 = text(row, columns::STATUS_R3);
    let (category, reject_round) = categorize_status(&status, &status_r1, &status_r2, &status_r3);

    let extra: BTreeMap<String, RawValue> = row
        .iter()
        .filter(|(column, _)| !TYPED_COLUMNS.contains(&column.as_str()))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect();

    CandidateRecord {
        req_date: parse_date(cell(row, columns::REQ_DATE)).unwrap_or(now),
        sourcing_date: parse_date(cell(row, columns::SOURCING_DATE)).unwrap_or(now),
        screening_date: parse_date(cell(row, columns::SCREENING_DATE)),
        hm_details: text(row, columns::HM_DETAILS),
        skill: text(row, columns::SKILL),
        location: text(row, columns::LOCATION),
        recruiter: text(row, columns::RECRUITER),
        candidate_name: text(row, columns::CANDIDATE_NAME),
        status,
        status_r1,
        status_r2,
        status_r3,
        screening_check_status: text(row, columns::SCREENING_CHECK),
        tth: cell(row, columns::TTH).clone(),
        ttf: cell(row, columns::TTF).clone(),
        offer_date: parse_date(cell(row, columns::OFFER_DATE)),
        offer_acceptance_date: parse_date(cell(row, columns::OFFER_ACCEPTANCE_DATE)),
        joining_date: parse_date(cell(row, columns::JOINING_DATE)),
        source: text(row, columns::SOURCE),
        sub_source: text(row, columns::SUB_SOURCE),
        category,
        reject_round,
        extra,
    }
}

/// Distinct non-empty values of a text column, sorted ascending.
pub fn unique_values<'a, I>(records: I, column: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    records
        .into_iter()
        .filter_map(|record| record.text(column))
        .filter(|value| !value.trim().is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn filter_options(records: &[CandidateRecord]) -> FilterOptions {
    FilterOptions {
        hm_options: unique_values(records, Facet::Hm.column()),
        skill_options: unique_values(records, Facet::Skill.column()),
        location_options: unique_values(records, Facet::Location.column()),
        recruiter_options: unique_values(records, Facet::Recruiter.column()),
    }
}

/// Counts per named bucket. `Other` records only count toward `total`.
pub fn calculate_summary<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut summary = Summary::default();
    for record in records {
        summary.total += 1;
        match record.category {
            DashboardCategory::Joined => summary.joined += 1,
            DashboardCategory::Selected => summary.selected += 1,
            DashboardCategory::Rejected => summary.rejected += 1,
            DashboardCategory::ScreeningReject => summary.screening_reject += 1,
            DashboardCategory::PendingActive => summary.pending += 1,
            DashboardCategory::Other => {}
        }
    }
    summary
}

/// Earliest and latest requisition dates, or `None` for an empty set.
pub fn date_bounds(records: &[CandidateRecord]) -> Option<DateBounds> {
    let min = records.iter().map(|record| record.req_date).min()?;
    let max = records.iter().map(|record| record.req_date).max()?;
    Some(DateBounds { min, max })
}
