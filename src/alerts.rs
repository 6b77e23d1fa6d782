use chrono::NaiveDateTime;

use crate::coerce::{parse_number, safe_string};
use crate::config::AlertThresholds;
use crate::models::{
    columns, AlertInfo, AlertSeverity, CandidateRecord, RawValue, ScreeningDelay, SlaViolation,
};

const SECONDS_PER_DAY: i64 = 86_400;

pub fn severity_for(exceeded: f64, thresholds: &AlertThresholds) -> AlertSeverity {
    if exceeded >= thresholds.critical_over {
        AlertSeverity::Critical
    } else if exceeded >= thresholds.moderate_over {
        AlertSeverity::Moderate
    } else {
        AlertSeverity::Warning
    }
}

/// Whole days from `from` to `to`, rounded toward negative infinity.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

fn sla_violation(raw: &RawValue, limit: f64, thresholds: &AlertThresholds) -> Option<SlaViolation> {
    let value = parse_number(raw).filter(|value| *value > 0.0 && *value > limit)?;
    let exceeded = value - limit;
    Some(SlaViolation {
        value,
        exceeded,
        severity: severity_for(exceeded, thresholds),
    })
}

fn screening_delay(
    record: &CandidateRecord,
    now: NaiveDateTime,
    thresholds: &AlertThresholds,
) -> Option<ScreeningDelay> {
    let (until, is_pending) = match record.screening_date {
        Some(screened) => (screened, false),
        None => (now, true),
    };
    let days_delayed = days_between(record.sourcing_date, until);
    if days_delayed <= thresholds.screening_delay_days {
        return None;
    }
    Some(ScreeningDelay {
        days_delayed,
        exceeded: days_delayed - thresholds.screening_delay_days,
        is_pending,
        // Screening delays are always escalated, whatever the overrun.
        severity: AlertSeverity::Critical,
    })
}

fn panelist(record: &CandidateRecord, index: usize) -> String {
    record
        .extra
        .get(columns::PANELISTS[index])
        .map(safe_string)
        .unwrap_or_default()
}

/// Evaluates every record against the screening, TTH and TTF limits and
/// returns one alert per violating record, most severe first.
pub fn detect_alerts<'a, I>(
    records: I,
    now: NaiveDateTime,
    thresholds: &AlertThresholds,
) -> Vec<AlertInfo<'a>>
where
    I: IntoIterator<Item = &'a CandidateRecord>,
{
    let mut alerts: Vec<AlertInfo<'a>> = records
        .into_iter()
        .filter_map(|record| {
            let screening_delay_violation = screening_delay(record, now, thresholds);
            let tth_violation = sla_violation(&record.tth, thresholds.tth_limit, thresholds);
            let ttf_violation = sla_violation(&record.ttf, thresholds.ttf_limit, thresholds);

            let severities = [
                screening_delay_violation.map(|v| v.severity),
                tth_violation.map(|v| v.severity),
                ttf_violation.map(|v| v.severity),
            ];
            let overall_severity = severities
                .into_iter()
                .flatten()
                .min_by_key(AlertSeverity::rank)?;

            Some(AlertInfo {
                candidate: record,
                tth_violation,
                ttf_violation,
                screening_delay_violation,
                overall_severity,
                panelist_r1: panelist(record, 0),
                panelist_r2: panelist(record, 1),
                panelist_r3: panelist(record, 2),
            })
        })
        .collect();

    // Stable, so equal severities keep input order.
    alerts.sort_by_key(|alert| alert.overall_severity.rank());
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::clean_and_process;
    use crate::pipeline::tests::{now, raw};

    fn candidate(cells: &[(&str, &str)]) -> CandidateRecord {
        let mut row = raw(cells);
        row.entry(columns::CANDIDATE_NAME.to_string())
            .or_insert_with(|| RawValue::from("Test Candidate"));
        clean_and_process(&[row], now()).remove(0)
    }

    fn screened(sourced: &str, screened: &str) -> CandidateRecord {
        candidate(&[
            (columns::SOURCING_DATE, sourced),
            (columns::SCREENING_DATE, screened),
        ])
    }

    #[test]
    fn severity_tiers() {
        let thresholds = AlertThresholds::default();
        assert_eq!(severity_for(12.0, &thresholds), AlertSeverity::Critical);
        assert_eq!(severity_for(10.0, &thresholds), AlertSeverity::Critical);
        assert_eq!(severity_for(5.0, &thresholds), AlertSeverity::Moderate);
        assert_eq!(severity_for(4.5, &thresholds), AlertSeverity::Warning);
    }

    #[test]
    fn screening_delay_past_threshold_is_critical() {
        let records = vec![screened("2025-01-01", "2025-01-05")];
        let alerts = detect_alerts(&records, now(), &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        let delay = alerts[0].screening_delay_violation.unwrap();
        assert_eq!(delay.days_delayed, 4);
        assert_eq!(delay.exceeded, 2);
        assert!(!delay.is_pending);
        assert_eq!(alerts[0].overall_severity, AlertSeverity::Critical);
    }

    #[test]
    fn screening_within_limit_or_backdated_is_ignored() {
        let records = vec![
            screened("2025-01-01", "2025-01-03"),
            screened("2025-01-10", "2025-01-01"),
        ];
        assert!(detect_alerts(&records, now(), &AlertThresholds::default()).is_empty());
    }

    #[test]
    fn unscreened_candidates_measure_against_now() {
        let records = vec![candidate(&[(columns::SOURCING_DATE, "2025-06-10")])];
        let alerts = detect_alerts(&records, now(), &AlertThresholds::default());
        let delay = alerts[0].screening_delay_violation.unwrap();
        assert_eq!(delay.days_delayed, 5);
        assert!(delay.is_pending);
    }

    #[test]
    fn tth_and_ttf_breaches() {
        let records = vec![candidate(&[
            (columns::SOURCING_DATE, "2025-06-15"),
            (columns::SCREENING_DATE, "2025-06-15"),
            (columns::TTH, "42"),
            (columns::TTF, "66"),
        ])];
        let alerts = detect_alerts(&records, now(), &AlertThresholds::default());
        let tth = alerts[0].tth_violation.unwrap();
        assert_eq!(tth.exceeded, 12.0);
        assert_eq!(tth.severity, AlertSeverity::Critical);
        let ttf = alerts[0].ttf_violation.unwrap();
        assert_eq!(ttf.exceeded, 6.0);
        assert_eq!(ttf.severity, AlertSeverity::Moderate);
        assert!(alerts[0].screening_delay_violation.is_none());
    }

    #[test]
    fn non_numeric_or_small_metrics_are_not_applicable() {
        let records = vec![
            candidate(&[
                (columns::SOURCING_DATE, "2025-06-15"),
                (columns::TTH, "n/a"),
                (columns::TTF, "-80"),
            ]),
            candidate(&[(columns::SOURCING_DATE, "2025-06-15"), (columns::TTH, "30")]),
        ];
        assert!(detect_alerts(&records, now(), &AlertThresholds::default()).is_empty());
    }

    #[test]
    fn overall_severity_orders_output_stably() {
        let mut warning = candidate(&[
            (columns::CANDIDATE_NAME, "Warn"),
            (columns::SOURCING_DATE, "2025-06-15"),
            (columns::TTH, "32"),
        ]);
        warning.extra.insert("Panelist name".into(), RawValue::from(" Anil "));
        let moderate = candidate(&[
            (columns::CANDIDATE_NAME, "Mod"),
            (columns::SOURCING_DATE, "2025-06-15"),
            (columns::TTF, "67"),
        ]);
        let critical_a = screened("2025-01-01", "2025-02-01");
        let mut critical_b = candidate(&[
            (columns::CANDIDATE_NAME, "Crit B"),
            (columns::SOURCING_DATE, "2025-06-15"),
        ]);
        critical_b.tth = RawValue::Number(45.0);

        let records = vec![warning, moderate, critical_a, critical_b];
        let alerts = detect_alerts(&records, now(), &AlertThresholds::default());
        let order: Vec<&str> = alerts
            .iter()
            .map(|alert| alert.candidate.candidate_name.as_str())
            .collect();
        assert_eq!(order, vec!["Test Candidate", "Crit B", "Mod", "Warn"]);
        assert_eq!(alerts[3].overall_severity, AlertSeverity::Warning);
        assert_eq!(alerts[3].panelist_r1, "Anil");
        assert_eq!(alerts[3].panelist_r2, "");
    }

    #[test]
    fn empty_input_has_no_alerts() {
        let records: Vec<CandidateRecord> = Vec::new();
        assert!(detect_alerts(&records, now(), &AlertThresholds::default()).is_empty());
    }
}
