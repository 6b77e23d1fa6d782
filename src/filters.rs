use crate::models::{
    CandidateRecord, CascadingOptions, CategoryFilter, DashboardCategory, DateSpan, Facet,
    FilterState,
};
use crate::pipeline::unique_values;

/// Inclusive day-granularity check on the requisition date.
fn within_dates(record: &CandidateRecord, span: &DateSpan) -> bool {
    let day = record.req_date.date();
    span.start.date() <= day && day <= span.end.date()
}

fn facet_allows(record: &CandidateRecord, state: &FilterState, facet: Facet) -> bool {
    let selection = state.selection(facet);
    selection.is_empty() || selection.contains(facet.value(record))
}

/// Blank searches match everything; otherwise the untrimmed text is the needle.
fn name_matches(record: &CandidateRecord, search: &str) -> bool {
    search.trim().is_empty()
        || record
            .candidate_name
            .to_lowercase()
            .contains(&search.to_lowercase())
}

fn category_allows(record: &CandidateRecord, filter: CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::ScreeningCleared => record.category != DashboardCategory::ScreeningReject,
        CategoryFilter::InterviewCleared => !matches!(
            record.category,
            DashboardCategory::ScreeningReject | DashboardCategory::Rejected
        ),
        CategoryFilter::Offered => record.category == DashboardCategory::Selected,
        CategoryFilter::Joined => record.category == DashboardCategory::Joined,
    }
}

/// Records passing every active predicate of `state`.
pub fn apply_filters<'a>(
    records: &'a [CandidateRecord],
    state: &FilterState,
) -> Vec<&'a CandidateRecord> {
    records
        .iter()
        .filter(|record| state.date_range.map_or(true, |span| within_dates(record, &span)))
        .filter(|record| Facet::ALL.iter().all(|facet| facet_allows(record, state, *facet)))
        .filter(|record| name_matches(record, &state.name_search))
        .filter(|record| {
            state
                .category_filter
                .map_or(true, |filter| category_allows(record, filter))
        })
        .collect()
}

/// Values still selectable in `target` given the date range and the
/// selections of the other three facets. The target's own selection is
/// ignored so picking a value never hides its siblings.
pub fn cascading_options(
    records: &[CandidateRecord],
    state: &FilterState,
    target: Facet,
) -> Vec<String> {
    let remaining = records
        .iter()
        .filter(|record| state.date_range.map_or(true, |span| within_dates(record, &span)))
        .filter(|record| {
            Facet::ALL
                .iter()
                .filter(|facet| **facet != target)
                .all(|facet| facet_allows(record, state, *facet))
        });
    unique_values(remaining, target.column())
}

pub fn all_cascading_options(records: &[CandidateRecord], state: &FilterState) -> CascadingOptions {
    CascadingOptions {
        available_hms: cascading_options(records, state, Facet::Hm),
        available_skills: cascading_options(records, state, Facet::Skill),
        available_locations: cascading_options(records, state, Facet::Location),
        available_recruiters: cascading_options(records, state, Facet::Recruiter),
    }
}
