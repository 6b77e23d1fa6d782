use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column names as they appear in the tracker export.
pub mod columns {
    pub const REQ_DATE: &str = "Req Date";
    pub const SOURCING_DATE: &str = "Sourcing Date";
    pub const SCREENING_DATE: &str = "Screening Date";
    pub const HM_DETAILS: &str = "HM Details";
    pub const SKILL: &str = "Skill";
    pub const LOCATION: &str = "Location of posting";
    pub const RECRUITER: &str = "Recruiter Name";
    pub const CANDIDATE_NAME: &str = "Candidate Name";
    pub const STATUS: &str = "Status";
    pub const STATUS_R1: &str = "Status of R1";
    pub const STATUS_R2: &str = "Status of R2";
    pub const STATUS_R3: &str = "Status of R3";
    pub const SCREENING_CHECK: &str = "Screening check status";
    pub const TTF: &str = "TTF (60 days)";
    pub const TTH: &str = "TTH (30 days)";
    pub const OFFER_DATE: &str = "Offer date";
    pub const OFFER_ACCEPTANCE_DATE: &str = "Offer Acceptance Date";
    pub const JOINING_DATE: &str = "Joining Date";
    pub const SOURCE: &str = "Source";
    pub const SUB_SOURCE: &str = "Sub Source";
    pub const DASHBOARD_CATEGORY: &str = "Dashboard_Category";
    pub const REJECT_ROUND: &str = "Reject_Round";
    pub const PANELISTS: [&str; 3] = ["Panelist name", "Panelist name_1", "Panelist name_2"];
}

/// One untyped cell from the export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    #[default]
    Absent,
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

pub type RawRow = BTreeMap<String, RawValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashboardCategory {
    Joined,
    Selected,
    Rejected,
    #[serde(rename = "Screening Reject")]
    ScreeningReject,
    #[serde(rename = "Pending/Active")]
    PendingActive,
    Other,
}

impl DashboardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardCategory::Joined => "Joined",
            DashboardCategory::Selected => "Selected",
            DashboardCategory::Rejected => "Rejected",
            DashboardCategory::ScreeningReject => "Screening Reject",
            DashboardCategory::PendingActive => "Pending/Active",
            DashboardCategory::Other => "Other",
        }
    }
}

impl fmt::Display for DashboardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectRound {
    R1,
    R2,
    R3,
}

impl RejectRound {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectRound::R1 => "R1",
            RejectRound::R2 => "R2",
            RejectRound::R3 => "R3",
        }
    }
}

/// A cleaned, classified candidate application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    #[serde(rename = "Req Date")]
    pub req_date: NaiveDateTime,
    #[serde(rename = "Sourcing Date")]
    pub sourcing_date: NaiveDateTime,
    /// `None` means the candidate has not been screened yet.
    #[serde(rename = "Screening Date")]
    pub screening_date: Option<NaiveDateTime>,
    #[serde(rename = "HM Details")]
    pub hm_details: String,
    #[serde(rename = "Skill")]
    pub skill: String,
    #[serde(rename = "Location of posting")]
    pub location: String,
    #[serde(rename = "Recruiter Name")]
    pub recruiter: String,
    #[serde(rename = "Candidate Name")]
    pub candidate_name: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Status of R1")]
    pub status_r1: String,
    #[serde(rename = "Status of R2")]
    pub status_r2: String,
    #[serde(rename = "Status of R3")]
    pub status_r3: String,
    #[serde(rename = "Screening check status")]
    pub screening_check_status: String,
    #[serde(rename = "TTH (30 days)")]
    pub tth: RawValue,
    #[serde(rename = "TTF (60 days)")]
    pub ttf: RawValue,
    #[serde(rename = "Offer date")]
    pub offer_date: Option<NaiveDateTime>,
    #[serde(rename = "Offer Acceptance Date")]
    pub offer_acceptance_date: Option<NaiveDateTime>,
    #[serde(rename = "Joining Date")]
    pub joining_date: Option<NaiveDateTime>,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Sub Source")]
    pub sub_source: String,
    #[serde(rename = "Dashboard_Category")]
    pub category: DashboardCategory,
    #[serde(rename = "Reject_Round")]
    pub reject_round: Option<RejectRound>,
    /// Columns the pipeline does not interpret, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, RawValue>,
}

impl CandidateRecord {
    /// Text value of a string-typed column, if the column holds text.
    pub fn text(&self, column: &str) -> Option<&str> {
        let value = match column {
            columns::HM_DETAILS => &self.hm_details,
            columns::SKILL => &self.skill,
            columns::LOCATION => &self.location,
            columns::RECRUITER => &self.recruiter,
            columns::CANDIDATE_NAME => &self.candidate_name,
            columns::STATUS => &self.status,
            columns::STATUS_R1 => &self.status_r1,
            columns::STATUS_R2 => &self.status_r2,
            columns::STATUS_R3 => &self.status_r3,
            columns::SCREENING_CHECK => &self.screening_check_status,
            columns::SOURCE => &self.source,
            columns::SUB_SOURCE => &self.sub_source,
            columns::DASHBOARD_CATEGORY => return Some(self.category.as_str()),
            other => match self.extra.get(other) {
                Some(RawValue::Text(text)) => text,
                _ => return None,
            },
        };
        Some(value.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub joined: usize,
    pub selected: usize,
    pub rejected: usize,
    pub screening_reject: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub hm_options: Vec<String>,
    pub skill_options: Vec<String>,
    pub location_options: Vec<String>,
    pub recruiter_options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadingOptions {
    pub available_hms: Vec<String>,
    pub available_skills: Vec<String>,
    pub available_locations: Vec<String>,
    pub available_recruiters: Vec<String>,
}

/// The four multi-select facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Hm,
    Skill,
    Location,
    Recruiter,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Hm, Facet::Skill, Facet::Location, Facet::Recruiter];

    pub fn column(&self) -> &'static str {
        match self {
            Facet::Hm => columns::HM_DETAILS,
            Facet::Skill => columns::SKILL,
            Facet::Location => columns::LOCATION,
            Facet::Recruiter => columns::RECRUITER,
        }
    }

    pub fn value<'a>(&self, record: &'a CandidateRecord) -> &'a str {
        match self {
            Facet::Hm => &record.hm_details,
            Facet::Skill => &record.skill,
            Facet::Location => &record.location,
            Facet::Recruiter => &record.recruiter,
        }
    }
}

/// Pipeline-stage selector set by clicking a funnel bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    All,
    ScreeningCleared,
    InterviewCleared,
    Offered,
    Joined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// The user's current filter selection. Serialized verbatim as the
/// persisted snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub date_range: Option<DateSpan>,
    pub hm_filter: BTreeSet<String>,
    pub skill_filter: BTreeSet<String>,
    pub location_filter: BTreeSet<String>,
    pub recruiter_filter: BTreeSet<String>,
    pub name_search: String,
    pub category_filter: Option<CategoryFilter>,
}

impl FilterState {
    pub fn selection(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Hm => &self.hm_filter,
            Facet::Skill => &self.skill_filter,
            Facet::Location => &self.location_filter,
            Facet::Recruiter => &self.recruiter_filter,
        }
    }

    pub fn selection_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Hm => &mut self.hm_filter,
            Facet::Skill => &mut self.skill_filter,
            Facet::Location => &mut self.location_filter,
            Facet::Recruiter => &mut self.recruiter_filter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Moderate,
    Warning,
}

impl AlertSeverity {
    pub fn rank(&self) -> u8 {
        match self {
            AlertSeverity::Critical => 0,
            AlertSeverity::Moderate => 1,
            AlertSeverity::Warning => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "critical",
            AlertSeverity::Moderate => "moderate",
            AlertSeverity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaViolation {
    pub value: f64,
    pub exceeded: f64,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningDelay {
    pub days_delayed: i64,
    pub exceeded: i64,
    pub is_pending: bool,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInfo<'a> {
    pub candidate: &'a CandidateRecord,
    pub tth_violation: Option<SlaViolation>,
    pub ttf_violation: Option<SlaViolation>,
    pub screening_delay_violation: Option<ScreeningDelay>,
    pub overall_severity: AlertSeverity,
    pub panelist_r1: String,
    pub panelist_r2: String,
    pub panelist_r3: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStats {
    pub total_job_site: usize,
    pub total_employee_referral: usize,
    pub total_walk_in: usize,
    pub job_site_breakdown: BTreeMap<String, usize>,
    pub employee_referral_breakdown: BTreeMap<String, usize>,
    pub walk_in_breakdown: BTreeMap<String, usize>,
}
