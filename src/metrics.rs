//! Derived rates and funnels over a (filtered) record set.
//!
//! Rates are percentages. A zero denominator always reports `0.0`.

use serde::Serialize;

use crate::models::{CandidateRecord, Summary};

pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStats {
    pub pending: usize,
    pub conversion_rate: f64,
    pub shortlist_rate: f64,
}

pub fn quick_stats(summary: &Summary) -> QuickStats {
    QuickStats {
        pending: summary.pending,
        conversion_rate: rate(summary.joined, summary.total),
        shortlist_rate: rate(summary.selected, summary.total),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFunnel {
    pub total: usize,
    pub after_screening: usize,
    pub after_interviews: usize,
    pub shortlisted: usize,
    pub joined: usize,
}

pub fn pipeline_funnel(summary: &Summary) -> PipelineFunnel {
    let after_screening = summary.total.saturating_sub(summary.screening_reject);
    PipelineFunnel {
        total: summary.total,
        after_screening,
        after_interviews: after_screening.saturating_sub(summary.rejected),
        shortlisted: summary.selected,
        joined: summary.joined,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConversion {
    pub screening_cleared: usize,
    pub interviews_cleared: usize,
    pub conversion_rate: f64,
}

fn is_cleared(value: &str) -> bool {
    value.eq_ignore_ascii_case("cleared")
}

pub fn interview_conversion<'a, I>(records: I) -> InterviewConversion
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let (mut screening_cleared, mut interviews_cleared) = (0, 0);
    for record in records {
        if is_cleared(&record.screening_check_status) {
            screening_cleared += 1;
        }
        if is_cleared(&record.status_r3) {
            interviews_cleared += 1;
        }
    }
    InterviewConversion {
        screening_cleared,
        interviews_cleared,
        conversion_rate: rate(interviews_cleared, screening_cleared),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferConversion {
    pub offered: usize,
    pub accepted: usize,
    pub joined: usize,
    pub acceptance_rate: f64,
    pub joining_rate: f64,
}

pub fn offer_conversion<'a, I>(records: I) -> OfferConversion
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let (mut offered, mut accepted, mut joined) = (0, 0, 0);
    for record in records {
        offered += usize::from(record.offer_date.is_some());
        accepted += usize::from(record.offer_acceptance_date.is_some());
        joined += usize::from(record.joining_date.is_some());
    }
    OfferConversion {
        offered,
        accepted,
        joined,
        acceptance_rate: rate(accepted, offered),
        joining_rate: rate(joined, offered),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetrics {
    pub quick_stats: QuickStats,
    pub funnel: PipelineFunnel,
    pub interviews: InterviewConversion,
    pub offers: OfferConversion,
}

pub fn pipeline_metrics(records: &[&CandidateRecord], summary: &Summary) -> PipelineMetrics {
    PipelineMetrics {
        quick_stats: quick_stats(summary),
        funnel: pipeline_funnel(summary),
        interviews: interview_conversion(records.iter().copied()),
        offers: offer_conversion(records.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use crate::pipeline::tests::{now, raw};
    use crate::pipeline::{calculate_summary, clean_and_process};

    #[test]
    fn empty_summary_rates_are_zero() {
        let stats = quick_stats(&Summary::default());
        assert_eq!(stats.conversion_rate, 0.0);
        assert_eq!(stats.shortlist_rate, 0.0);
        assert!(!stats.conversion_rate.is_nan());

        let metrics = pipeline_metrics(&[], &Summary::default());
        assert_eq!(metrics.interviews.conversion_rate, 0.0);
        assert_eq!(metrics.offers.acceptance_rate, 0.0);
        assert_eq!(metrics.funnel.after_interviews, 0);
    }

    #[test]
    fn funnel_subtracts_rejections() {
        let summary = Summary {
            total: 10,
            joined: 2,
            selected: 3,
            rejected: 2,
            screening_reject: 4,
            pending: 1,
        };
        let funnel = pipeline_funnel(&summary);
        assert_eq!(funnel.after_screening, 6);
        assert_eq!(funnel.after_interviews, 4);
        assert_eq!(funnel.shortlisted, 3);

        let stats = quick_stats(&summary);
        assert_eq!(stats.conversion_rate, 20.0);
        assert_eq!(stats.shortlist_rate, 30.0);
    }

    #[test]
    fn conversions_count_cleared_rounds_and_offer_dates() {
        let rows = vec![
            raw(&[
                (columns::CANDIDATE_NAME, "A"),
                (columns::SCREENING_CHECK, "Cleared"),
                (columns::STATUS_R3, "cleared"),
                (columns::OFFER_DATE, "01-Mar-25"),
                (columns::OFFER_ACCEPTANCE_DATE, "03-Mar-25"),
                (columns::JOINING_DATE, "20-Mar-25"),
            ]),
            raw(&[
                (columns::CANDIDATE_NAME, "B"),
                (columns::SCREENING_CHECK, "CLEARED"),
                (columns::STATUS_R3, "Not Cleared"),
                (columns::OFFER_DATE, "05-Mar-25"),
            ]),
            raw(&[(columns::CANDIDATE_NAME, "C"), (columns::SCREENING_CHECK, "Pending")]),
        ];
        let records = clean_and_process(&rows, now());
        let refs: Vec<&CandidateRecord> = records.iter().collect();
        let metrics = pipeline_metrics(&refs, &calculate_summary(&records));

        assert_eq!(metrics.interviews.screening_cleared, 2);
        assert_eq!(metrics.interviews.interviews_cleared, 1);
        assert_eq!(metrics.interviews.conversion_rate, 50.0);
        assert_eq!(metrics.offers.offered, 2);
        assert_eq!(metrics.offers.accepted, 1);
        assert_eq!(metrics.offers.joined, 1);
        assert_eq!(metrics.offers.joining_rate, 50.0);
    }
}
