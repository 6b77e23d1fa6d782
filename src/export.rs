use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::coerce::safe_string;
use crate::error::Result;
use crate::models::{columns, CandidateRecord, RawValue};

const UTF8_BOM: char = '\u{FEFF}';

const LEADING_COLUMNS: [&str; 20] = [
    columns::REQ_DATE,
    columns::SOURCING_DATE,
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
    columns::SCREENING_DATE,
    columns::TTF,
    columns::TTH,
    columns::OFFER_DATE,
    columns::OFFER_ACCEPTANCE_DATE,
    columns::JOINING_DATE,
    columns::SOURCE,
    columns::SUB_SOURCE,
];

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_raw(value: Option<&RawValue>) -> String {
    match value {
        Some(RawValue::Text(text)) => text.clone(),
        Some(other) => safe_string(other),
        None => String::new(),
    }
}

fn cell(record: &CandidateRecord, column: &str) -> String {
    match column {
        columns::REQ_DATE => format_date(Some(record.req_date)),
        columns::SOURCING_DATE => format_date(Some(record.sourcing_date)),
        columns::SCREENING_DATE => format_date(record.screening_date),
        columns::OFFER_DATE => format_date(record.offer_date),
        columns::OFFER_ACCEPTANCE_DATE => format_date(record.offer_acceptance_date),
        columns::JOINING_DATE => format_date(record.joining_date),
        columns::TTH => format_raw(Some(&record.tth)),
        columns::TTF => format_raw(Some(&record.ttf)),
        columns::REJECT_ROUND => record
            .reject_round
            .map(|round| round.as_str().to_string())
            .unwrap_or_default(),
        other => match record.text(other) {
            Some(text) => text.to_string(),
            None => format_raw(record.extra.get(other)),
        },
    }
}

fn header<'a>(records: &'a [&CandidateRecord]) -> Vec<&'a str> {
    let extra: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.extra.keys().map(String::as_str))
        .collect();

    LEADING_COLUMNS
        .iter()
        .copied()
        .chain(extra)
        .chain([columns::DASHBOARD_CATEGORY, columns::REJECT_ROUND])
        .collect()
}

/// Renders records as CSV text. Dates come out as `yyyy-MM-dd`; values
/// containing a delimiter, quote or newline are quoted with inner quotes
/// doubled. An empty record set renders as an empty string.
pub fn to_csv(records: &[&CandidateRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let header = header(records);
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|column| cell(record, column)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    // The writer terminates every record; the export has no trailing newline.
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// CSV with a UTF-8 byte-order mark so spreadsheet tools pick the right encoding.
pub fn to_excel_csv(records: &[&CandidateRecord]) -> Result<String> {
    let mut text = String::from(UTF8_BOM);
    text.push_str(&to_csv(records)?);
    Ok(text)
}
