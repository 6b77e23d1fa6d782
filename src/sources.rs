use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CandidateRecord, SourceStats};

pub const JOB_SITE: &str = "Job Site";
pub const EMPLOYEE_REFERRAL: &str = "Employee Referral";
pub const WALK_IN: &str = "WalkIn";

const KNOWN_JOB_SITES: [&str; 10] = [
    "naukri",
    "linkedin",
    "indeed",
    "monster",
    "shine",
    "timesjobs",
    "instahyre",
    "hirist",
    "foundit",
    "internshala",
];

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)").expect("valid parenthetical regex"));

/// Canonical acquisition channel for a free-text source value.
pub fn normalize_source(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "Unknown".to_string();
    }
    match trimmed.to_lowercase().as_str() {
        "referral" | "employee referral" => EMPLOYEE_REFERRAL.to_string(),
        "job site" | "jobsite" => JOB_SITE.to_string(),
        "walkin" | "walk in" | "walk-in" => WALK_IN.to_string(),
        _ => raw.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Job site behind a sub-source such as "Naukri (Pardeep)" or "Pardeep Naukri".
pub fn extract_job_site_name(sub_source: &str) -> String {
    let trimmed = sub_source.trim();
    if trimmed.is_empty() {
        return "Unknown".to_string();
    }

    let lower = trimmed.to_lowercase();
    if let Some(site) = KNOWN_JOB_SITES.iter().find(|site| lower.contains(*site)) {
        return capitalize(site);
    }

    let cleaned = PARENTHETICAL.replace_all(trimmed, "");
    // "Person Site" is the common shape, so keep the last word.
    match cleaned.split_whitespace().last() {
        Some(last) => last.to_string(),
        None => "Other".to_string(),
    }
}

/// Referring employee behind a referral sub-source.
pub fn extract_employee_name(sub_source: &str) -> String {
    let trimmed = sub_source.trim();
    if trimmed.is_empty() {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn source_statistics<'a, I>(records: I) -> SourceStats
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut stats = SourceStats::default();

    for record in records {
        match normalize_source(&record.source).as_str() {
            JOB_SITE => {
                stats.total_job_site += 1;
                *stats
                    .job_site_breakdown
                    .entry(extract_job_site_name(&record.sub_source))
                    .or_insert(0) += 1;
            }
            EMPLOYEE_REFERRAL => {
                stats.total_employee_referral += 1;
                *stats
                    .employee_referral_breakdown
                    .entry(extract_employee_name(&record.sub_source))
                    .or_insert(0) += 1;
            }
            WALK_IN => {
                stats.total_walk_in += 1;
                let walk_in_type = if record.sub_source.is_empty() {
                    "Direct".to_string()
                } else {
                    record.sub_source.clone()
                };
                *stats.walk_in_breakdown.entry(walk_in_type).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    stats
}
