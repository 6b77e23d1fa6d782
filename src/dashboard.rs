use chrono::NaiveDateTime;
use serde::Serialize;

use crate::alerts::detect_alerts;
use crate::config::AlertThresholds;
use crate::filters::{all_cascading_options, apply_filters, cascading_options};
use crate::metrics::{pipeline_metrics, PipelineMetrics};
use crate::models::{
    AlertInfo, CandidateRecord, CascadingOptions, CategoryFilter, DateBounds, DateSpan, Facet,
    FilterOptions, FilterState, SourceStats, Summary,
};
use crate::pipeline::{calculate_summary, date_bounds, filter_options};
use crate::sources::source_statistics;

fn iso_timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct IsoDateRange {
    pub min: String,
    pub max: String,
}

/// Everything the "fetch all records" call hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload<'a> {
    pub records: &'a [CandidateRecord],
    pub summary: Summary,
    pub filter_options: FilterOptions,
    pub date_range: IsoDateRange,
}

/// Derived state for the current filters. Rebuilt from scratch after every
/// mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView<'a> {
    pub records: Vec<&'a CandidateRecord>,
    pub summary: Summary,
    pub cascading_options: CascadingOptions,
    pub alerts: Vec<AlertInfo<'a>>,
    pub sources: SourceStats,
    pub metrics: PipelineMetrics,
}

/// A record snapshot plus the user's filter selection over it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<CandidateRecord>,
    bounds: Option<DateBounds>,
    filters: FilterState,
    thresholds: AlertThresholds,
}

impl Dashboard {
    pub fn new(records: Vec<CandidateRecord>, thresholds: AlertThresholds) -> Self {
        let bounds = date_bounds(&records);
        let mut dashboard = Self {
            records,
            bounds,
            filters: FilterState::default(),
            thresholds,
        };
        dashboard.reset_filters();
        dashboard
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn bounds(&self) -> Option<DateBounds> {
        self.bounds
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_date_range(&mut self, range: Option<DateSpan>) {
        self.filters.date_range = range;
    }

    pub fn set_facet<I>(&mut self, facet: Facet, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        *self.filters.selection_mut(facet) = values.into_iter().collect();
    }

    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selection = self.filters.selection_mut(facet);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
    }

    /// Selects every value the facet currently offers.
    pub fn select_all(&mut self, facet: Facet) {
        let available = cascading_options(&self.records, &self.filters, facet);
        self.set_facet(facet, available);
    }

    pub fn clear(&mut self, facet: Facet) {
        self.filters.selection_mut(facet).clear();
    }

    pub fn set_name_search(&mut self, search: impl Into<String>) {
        self.filters.name_search = search.into();
    }

    pub fn set_category(&mut self, category: Option<CategoryFilter>) {
        self.filters.category_filter = category;
    }

    /// Back to defaults: the full data date range and no other constraint.
    pub fn reset_filters(&mut self) {
        self.filters = FilterState {
            date_range: self.bounds.map(|bounds| DateSpan {
                start: bounds.min,
                end: bounds.max,
            }),
            ..FilterState::default()
        };
    }

    pub fn restore(&mut self, snapshot: FilterState) {
        self.filters = snapshot;
    }

    pub fn payload(&self, now: NaiveDateTime) -> DashboardPayload<'_> {
        let (min, max) = match self.bounds {
            Some(bounds) => (bounds.min, bounds.max),
            None => (now, now),
        };
        DashboardPayload {
            records: &self.records,
            summary: calculate_summary(&self.records),
            filter_options: filter_options(&self.records),
            date_range: IsoDateRange {
                min: iso_timestamp(min),
                max: iso_timestamp(max),
            },
        }
    }

    pub fn recompute(&self, now: NaiveDateTime) -> DashboardView<'_> {
        let records = apply_filters(&self.records, &self.filters);
        let summary = calculate_summary(records.iter().copied());
        DashboardView {
            cascading_options: all_cascading_options(&self.records, &self.filters),
            alerts: detect_alerts(records.iter().copied(), now, &self.thresholds),
            sources: source_statistics(records.iter().copied()),
            metrics: pipeline_metrics(&records, &summary),
            summary,
            records,
        }
    }
}
