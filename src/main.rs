use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod alerts;
mod classify;
mod coerce;
mod config;
mod dashboard;
mod error;
mod export;
mod filters;
mod loader;
mod metrics;
mod models;
mod pipeline;
mod presets;
mod report;
mod sources;

use crate::coerce::start_of_day;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::models::{CandidateRecord, CategoryFilter, DateSpan, Facet, FilterState};
use crate::presets::{date_range_for_preset, DatePreset};

#[derive(Parser)]
#[command(name = "ta-dashboard")]
#[command(about = "Recruiting pipeline analytics over a TA tracker export", long_about = None)]
struct Cli {
    /// Tracker export to load (.csv or .json)
    #[arg(long, env = "TA_DASHBOARD_DATA", global = true)]
    data: Option<PathBuf>,
    /// TOML config with the data path and SLA thresholds
    #[arg(long, env = "TA_DASHBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,
    #[command(flatten)]
    filters: FilterArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Earliest requisition date (inclusive)
    #[arg(long, global = true)]
    from: Option<NaiveDate>,
    /// Latest requisition date (inclusive)
    #[arg(long, global = true)]
    to: Option<NaiveDate>,
    /// Named date range; overrides --from/--to
    #[arg(long, value_enum, global = true)]
    preset: Option<PresetArg>,
    #[arg(long, global = true)]
    hm: Vec<String>,
    #[arg(long, global = true)]
    skill: Vec<String>,
    #[arg(long, global = true)]
    location: Vec<String>,
    #[arg(long, global = true)]
    recruiter: Vec<String>,
    /// Drop the selection of a facet, e.g. one restored from --filters
    #[arg(long, value_enum, global = true)]
    clear: Vec<FacetArg>,
    /// Flip a single value in a facet selection, as FACET=VALUE
    #[arg(long, value_parser = parse_toggle, global = true)]
    toggle: Vec<(FacetArg, String)>,
    /// Select every value the facet still offers under the other filters
    #[arg(long, value_enum, global = true)]
    select_all: Vec<FacetArg>,
    /// Case-insensitive substring of the candidate name
    #[arg(long, global = true)]
    name: Option<String>,
    #[arg(long, value_enum, global = true)]
    category: Option<CategoryArg>,
    /// Restore a saved filter snapshot before applying other flags
    #[arg(long = "filters", global = true)]
    snapshot: Option<PathBuf>,
    /// Write the effective filters to this file
    #[arg(long, global = true)]
    save_filters: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FacetArg {
    Hm,
    Skill,
    Location,
    Recruiter,
}

impl From<FacetArg> for Facet {
    fn from(arg: FacetArg) -> Self {
        match arg {
            FacetArg::Hm => Facet::Hm,
            FacetArg::Skill => Facet::Skill,
            FacetArg::Location => Facet::Location,
            FacetArg::Recruiter => Facet::Recruiter,
        }
    }
}

fn parse_toggle(raw: &str) -> Result<(FacetArg, String), String> {
    let (facet, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FACET=VALUE, got `{raw}`"))?;
    let facet = FacetArg::from_str(facet.trim(), true)?;
    Ok((facet, value.to_string()))
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    All,
    ScreeningCleared,
    InterviewCleared,
    Offered,
    Joined,
}

impl From<CategoryArg> for CategoryFilter {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => CategoryFilter::All,
            CategoryArg::ScreeningCleared => CategoryFilter::ScreeningCleared,
            CategoryArg::InterviewCleared => CategoryFilter::InterviewCleared,
            CategoryArg::Offered => CategoryFilter::Offered,
            CategoryArg::Joined => CategoryFilter::Joined,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    #[value(name = "today")]
    Today,
    #[value(name = "yesterday")]
    Yesterday,
    #[value(name = "last7days")]
    Last7Days,
    #[value(name = "last30days")]
    Last30Days,
    #[value(name = "thisWeek")]
    ThisWeek,
    #[value(name = "lastWeek")]
    LastWeek,
    #[value(name = "thisMonth")]
    ThisMonth,
    #[value(name = "lastMonth")]
    LastMonth,
    #[value(name = "thisQuarter")]
    ThisQuarter,
    #[value(name = "lastQuarter")]
    LastQuarter,
    #[value(name = "thisYear")]
    ThisYear,
    #[value(name = "lastYear")]
    LastYear,
    #[value(name = "allTime")]
    AllTime,
}

impl From<PresetArg> for DatePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Today => DatePreset::Today,
            PresetArg::Yesterday => DatePreset::Yesterday,
            PresetArg::Last7Days => DatePreset::Last7Days,
            PresetArg::Last30Days => DatePreset::Last30Days,
            PresetArg::ThisWeek => DatePreset::ThisWeek,
            PresetArg::LastWeek => DatePreset::LastWeek,
            PresetArg::ThisMonth => DatePreset::ThisMonth,
            PresetArg::LastMonth => DatePreset::LastMonth,
            PresetArg::ThisQuarter => DatePreset::ThisQuarter,
            PresetArg::LastQuarter => DatePreset::LastQuarter,
            PresetArg::ThisYear => DatePreset::ThisYear,
            PresetArg::LastYear => DatePreset::LastYear,
            PresetArg::AllTime => DatePreset::AllTime,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Excel,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every cleaned record with summary, filter options and date range as JSON
    Data,
    /// Pipeline counts and conversion rates for the current filters
    Summary,
    /// Remaining choices for each facet given the other selections
    Options,
    /// Candidates breaching the screening, TTH or TTF limits
    Alerts {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Acquisition channel breakdown
    Sources,
    /// Export the filtered records
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long, default_value = "candidates.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

impl FilterArgs {
    async fn apply(&self, dashboard: &mut Dashboard, now: NaiveDateTime) -> anyhow::Result<()> {
        if let Some(path) = &self.snapshot {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read filter snapshot {}", path.display()))?;
            let snapshot: FilterState =
                serde_json::from_str(&text).context("invalid filter snapshot")?;
            dashboard.restore(snapshot);
        }

        if let Some(preset) = self.preset {
            let range = date_range_for_preset(preset.into(), now, dashboard.bounds());
            info!(preset = range.label, start = %range.start, end = %range.end, "applying date preset");
            dashboard.set_date_range(Some(range.span()));
        } else if self.from.is_some() || self.to.is_some() {
            let current = dashboard.filters().date_range;
            let start = self
                .from
                .map(start_of_day)
                .or(current.map(|span| span.start))
                .unwrap_or(NaiveDateTime::MIN);
            let end = self
                .to
                .map(start_of_day)
                .or(current.map(|span| span.end))
                .unwrap_or(NaiveDateTime::MAX);
            dashboard.set_date_range(Some(DateSpan { start, end }));
        }

        for facet in &self.clear {
            dashboard.clear((*facet).into());
        }
        for (facet, values) in [
            (Facet::Hm, &self.hm),
            (Facet::Skill, &self.skill),
            (Facet::Location, &self.location),
            (Facet::Recruiter, &self.recruiter),
        ] {
            if !values.is_empty() {
                dashboard.set_facet(facet, values.iter().cloned());
            }
        }
        for (facet, value) in &self.toggle {
            dashboard.toggle((*facet).into(), value);
        }
        for facet in &self.select_all {
            dashboard.select_all((*facet).into());
        }
        if let Some(name) = &self.name {
            dashboard.set_name_search(name.as_str());
        }
        if let Some(category) = self.category {
            dashboard.set_category(Some(category.into()));
        }

        if let Some(path) = &self.save_filters {
            let snapshot = serde_json::to_string_pretty(dashboard.filters())?;
            tokio::fs::write(path, snapshot)
                .await
                .with_context(|| format!("failed to write filter snapshot {}", path.display()))?;
        }
        Ok(())
    }
}

fn scope_label(filters: &FilterState) -> Option<String> {
    let facets: Vec<String> = Facet::ALL
        .iter()
        .map(|facet| filters.selection(*facet))
        .filter(|selection| !selection.is_empty())
        .map(|selection| selection.iter().cloned().collect::<Vec<_>>().join(", "))
        .collect();
    if facets.is_empty() {
        None
    } else {
        Some(facets.join(" / "))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())
        .await
        .context("failed to load dashboard config")?;
    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path.clone());

    let rows = loader::load_rows(&data_path)
        .await
        .with_context(|| format!("failed to load tracker export {}", data_path.display()))?;
    let now = Utc::now().naive_utc();
    let records = pipeline::clean_and_process(&rows, now);
    let mut dashboard = Dashboard::new(records, config.alerts);
    info!(records = dashboard.records().len(), "dashboard ready");
    cli.filters.apply(&mut dashboard, now).await?;

    match cli.command {
        Commands::Data => {
            println!("{}", serde_json::to_string_pretty(&dashboard.payload(now))?);
        }
        Commands::Summary => {
            let view = dashboard.recompute(now);
            let summary = view.summary;
            let stats = view.metrics.quick_stats;
            println!("Candidates: {}", summary.total);
            println!("- Joined: {}", summary.joined);
            println!("- Selected: {}", summary.selected);
            println!("- Rejected: {}", summary.rejected);
            println!("- Screening reject: {}", summary.screening_reject);
            println!("- Pending: {}", summary.pending);
            println!("Conversion rate {:.1}%, shortlist rate {:.1}%", stats.conversion_rate, stats.shortlist_rate);
        }
        Commands::Options => {
            let view = dashboard.recompute(now);
            println!("{}", serde_json::to_string_pretty(&view.cascading_options)?);
        }
        Commands::Alerts { limit } => {
            let view = dashboard.recompute(now);
            if view.alerts.is_empty() {
                println!("No SLA violations for this selection.");
                return Ok(());
            }

            println!("{} candidates breach an SLA:", view.alerts.len());
            for alert in view.alerts.iter().take(limit) {
                println!(
                    "- [{}] {} (panel: {}): {}",
                    alert.overall_severity.as_str(),
                    alert.candidate.candidate_name,
                    [&alert.panelist_r1, &alert.panelist_r2, &alert.panelist_r3]
                        .iter()
                        .filter(|name| !name.is_empty())
                        .map(|name| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    report::describe_alert(alert)
                );
            }
        }
        Commands::Sources => {
            let view = dashboard.recompute(now);
            println!("{}", serde_json::to_string_pretty(&view.sources)?);
        }
        Commands::Export { format, out } => {
            let view = dashboard.recompute(now);
            let records: &[&CandidateRecord] = &view.records;
            let text = match format {
                ExportFormat::Csv => export::to_csv(records)?,
                ExportFormat::Excel => export::to_excel_csv(records)?,
            };
            tokio::fs::write(&out, text)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(records = records.len(), "export complete");
            println!("Exported {} candidates to {}.", records.len(), out.display());
        }
        Commands::Report { out } => {
            let view = dashboard.recompute(now);
            let scope = scope_label(dashboard.filters());
            let report = report::build_report(&view, scope.as_deref(), now);
            tokio::fs::write(&out, report)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertThresholds;
    use crate::pipeline::tests::{now, record};

    fn dashboard() -> Dashboard {
        Dashboard::new(
            vec![
                record("Asha Rao", "Kiran", "Rust", "Pune", "Sam", "2025-01-01", "Joined"),
                record("Ravi Kumar", "Nisha", "Go", "Delhi", "Tara", "2025-01-15", "Selected"),
            ],
            AlertThresholds::default(),
        )
    }

    async fn applied(args: &[&str]) -> Dashboard {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut dashboard = dashboard();
        cli.filters.apply(&mut dashboard, now()).await.unwrap();
        dashboard
    }

    fn selected(dashboard: &Dashboard, facet: Facet) -> Vec<String> {
        dashboard.filters().selection(facet).iter().cloned().collect()
    }

    #[tokio::test]
    async fn repeated_facet_values_stay_selected() {
        let dashboard = applied(&["ta-dashboard", "--hm", "Kiran", "--hm", "Kiran", "summary"]).await;
        assert_eq!(selected(&dashboard, Facet::Hm), vec!["Kiran"]);
        assert_eq!(dashboard.recompute(now()).summary.total, 1);
    }

    #[tokio::test]
    async fn filter_flags_are_accepted_after_the_subcommand() {
        let dashboard = applied(&["ta-dashboard", "summary", "--skill", "Go", "--category", "offered"]).await;
        assert_eq!(selected(&dashboard, Facet::Skill), vec!["Go"]);
        assert_eq!(dashboard.filters().category_filter, Some(CategoryFilter::Offered));
        assert_eq!(dashboard.recompute(now()).summary.total, 1);
    }

    #[tokio::test]
    async fn toggle_flips_single_values() {
        let dashboard = applied(&["ta-dashboard", "--hm", "Kiran", "--toggle", "hm=Nisha", "summary"]).await;
        assert_eq!(selected(&dashboard, Facet::Hm), vec!["Kiran", "Nisha"]);

        let dashboard = applied(&["ta-dashboard", "--hm", "Kiran", "--toggle", "HM=Kiran", "summary"]).await;
        assert!(selected(&dashboard, Facet::Hm).is_empty());

        assert!(Cli::try_parse_from(["ta-dashboard", "--toggle", "team=X", "summary"]).is_err());
        assert!(Cli::try_parse_from(["ta-dashboard", "--toggle", "hm", "summary"]).is_err());
    }

    #[tokio::test]
    async fn select_all_follows_the_other_facets() {
        let dashboard =
            applied(&["ta-dashboard", "--location", "Pune", "--select-all", "hm", "summary"]).await;
        assert_eq!(selected(&dashboard, Facet::Hm), vec!["Kiran"]);
    }

    #[tokio::test]
    async fn snapshot_round_trips_and_clear_drops_a_facet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        let path_arg = path.to_str().unwrap();

        applied(&[
            "ta-dashboard",
            "--skill",
            "Rust",
            "--recruiter",
            "Sam",
            "--save-filters",
            path_arg,
            "summary",
        ])
        .await;
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"skillFilter\""));

        let restored = applied(&["ta-dashboard", "--filters", path_arg, "summary"]).await;
        assert_eq!(selected(&restored, Facet::Skill), vec!["Rust"]);
        assert_eq!(selected(&restored, Facet::Recruiter), vec!["Sam"]);

        let cleared = applied(&["ta-dashboard", "--filters", path_arg, "--clear", "skill", "summary"]).await;
        assert!(selected(&cleared, Facet::Skill).is_empty());
        assert_eq!(selected(&cleared, Facet::Recruiter), vec!["Sam"]);
    }

    #[tokio::test]
    async fn preset_and_explicit_dates_set_the_range() {
        let dashboard = applied(&["ta-dashboard", "--preset", "allTime", "summary"]).await;
        let range = dashboard.filters().date_range.unwrap();
        assert_eq!(range.start.to_string(), "2025-01-01 00:00:00");

        let dashboard = applied(&["ta-dashboard", "--from", "2025-01-10", "summary"]).await;
        let range = dashboard.filters().date_range.unwrap();
        assert_eq!(range.start.to_string(), "2025-01-10 00:00:00");
        assert_eq!(dashboard.recompute(now()).summary.total, 1);
    }
}
