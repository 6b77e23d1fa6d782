use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::dashboard::DashboardView;
use crate::models::AlertInfo;

pub fn describe_alert(alert: &AlertInfo<'_>) -> String {
    let mut parts = Vec::new();
    if let Some(delay) = alert.screening_delay_violation {
        let state = if delay.is_pending { "still unscreened" } else { "screened" };
        parts.push(format!(
            "screening {} days after sourcing ({}, {} over)",
            delay.days_delayed, state, delay.exceeded
        ));
    }
    if let Some(tth) = alert.tth_violation {
        parts.push(format!("TTH {} ({} over, {})", tth.value, tth.exceeded, tth.severity.as_str()));
    }
    if let Some(ttf) = alert.ttf_violation {
        parts.push(format!("TTF {} ({} over, {})", ttf.value, ttf.exceeded, ttf.severity.as_str()));
    }
    parts.join("; ")
}

fn write_breakdown(output: &mut String, title: &str, total: usize, breakdown: &BTreeMap<String, usize>) {
    let _ = writeln!(output, "- {}: {}", title, total);
    let mut entries: Vec<(&String, &usize)> = breakdown.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    for (name, count) in entries.iter().take(5) {
        let _ = writeln!(output, "  - {}: {}", name, count);
    }
}

pub fn build_report(view: &DashboardView<'_>, scope: Option<&str>, generated_at: NaiveDateTime) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("all requisitions");
    let summary = &view.summary;
    let metrics = &view.metrics;

    let _ = writeln!(output, "# Recruiting Pipeline Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        scope_label,
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Pipeline Summary");

    if summary.total == 0 {
        let _ = writeln!(output, "No candidates match the current filters.");
    } else {
        let _ = writeln!(output, "- Total candidates: {}", summary.total);
        let _ = writeln!(output, "- Joined: {}", summary.joined);
        let _ = writeln!(output, "- Selected: {}", summary.selected);
        let _ = writeln!(output, "- Rejected: {}", summary.rejected);
        let _ = writeln!(output, "- Screening rejects: {}", summary.screening_reject);
        let _ = writeln!(output, "- Pending: {}", summary.pending);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Conversion");
    let _ = writeln!(output, "- Conversion rate: {:.1}%", metrics.quick_stats.conversion_rate);
    let _ = writeln!(output, "- Shortlist rate: {:.1}%", metrics.quick_stats.shortlist_rate);
    let _ = writeln!(
        output,
        "- Funnel: {} total -> {} after screening -> {} after interviews -> {} shortlisted -> {} joined",
        metrics.funnel.total,
        metrics.funnel.after_screening,
        metrics.funnel.after_interviews,
        metrics.funnel.shortlisted,
        metrics.funnel.joined
    );
    let _ = writeln!(
        output,
        "- Interviews: {} of {} screening-cleared candidates cleared R3 ({:.1}%)",
        metrics.interviews.interviews_cleared,
        metrics.interviews.screening_cleared,
        metrics.interviews.conversion_rate
    );
    let _ = writeln!(
        output,
        "- Offers: {} offered, {} accepted ({:.1}%), {} joined ({:.1}%)",
        metrics.offers.offered,
        metrics.offers.accepted,
        metrics.offers.acceptance_rate,
        metrics.offers.joined,
        metrics.offers.joining_rate
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## SLA Alerts");

    if view.alerts.is_empty() {
        let _ = writeln!(output, "No SLA violations for this selection.");
    } else {
        let _ = writeln!(output, "{} candidates breach at least one SLA.", view.alerts.len());
        for alert in view.alerts.iter().take(10) {
            let _ = writeln!(
                output,
                "- [{}] {} ({}, {}): {}",
                alert.overall_severity.as_str(),
                alert.candidate.candidate_name,
                alert.candidate.skill,
                alert.candidate.recruiter,
                describe_alert(alert)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Source Mix");
    let sources = &view.sources;
    write_breakdown(&mut output, "Job sites", sources.total_job_site, &sources.job_site_breakdown);
    write_breakdown(
        &mut output,
        "Employee referrals",
        sources.total_employee_referral,
        &sources.employee_referral_breakdown,
    );
    write_breakdown(&mut output, "Walk-ins", sources.total_walk_in, &sources.walk_in_breakdown);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertThresholds;
    use crate::dashboard::Dashboard;
    use crate::models::columns;
    use crate::pipeline::clean_and_process;
    use crate::pipeline::tests::{now, raw};

    #[test]
    fn empty_selection_reports_placeholders() {
        let dashboard = Dashboard::new(Vec::new(), AlertThresholds::default());
        let report = build_report(&dashboard.recompute(now()), None, now());
        assert!(report.contains("Generated for all requisitions on 2025-06-15 12:00"));
        assert!(report.contains("No candidates match the current filters."));
        assert!(report.contains("Conversion rate: 0.0%"));
        assert!(report.contains("No SLA violations for this selection."));
    }

    #[test]
    fn lists_alerts_and_sources() {
        let rows = vec![
            raw(&[
                (columns::CANDIDATE_NAME, "Asha Rao"),
                (columns::SKILL, "Rust"),
                (columns::RECRUITER, "Sam"),
                (columns::STATUS, "Joined"),
                (columns::SOURCING_DATE, "2025-01-01"),
                (columns::SCREENING_DATE, "2025-01-06"),
                (columns::SOURCE, "Job Site"),
                (columns::SUB_SOURCE, "Naukri (Pardeep)"),
            ]),
            raw(&[
                (columns::CANDIDATE_NAME, "Ravi Kumar"),
                (columns::STATUS, "Selected"),
                (columns::SOURCING_DATE, "2025-06-15"),
                (columns::TTH, "33"),
                (columns::SOURCE, "Referral"),
                (columns::SUB_SOURCE, "Sunil"),
            ]),
        ];
        let dashboard = Dashboard::new(clean_and_process(&rows, now()), AlertThresholds::default());
        let report = build_report(&dashboard.recompute(now()), Some("Rust hiring"), now());

        assert!(report.contains("- Total candidates: 2"));
        assert!(report.contains("- Conversion rate: 50.0%"));
        assert!(report.contains("2 candidates breach at least one SLA."));
        assert!(report.contains(
            "- [critical] Asha Rao (Rust, Sam): screening 5 days after sourcing (screened, 3 over)"
        ));
        assert!(report.contains("- [warning] Ravi Kumar"));
        assert!(report.contains("  - Naukri: 1"));
        assert!(report.contains("  - Sunil: 1"));
    }
}
