//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use casegraph_analytics::{
    CaseCluster, CaseStatistics, Dashboard, MultiCaseProfile, NetworkDegree, NetworkGraph, PatternAnalysis,
    PersonMetrics, RelatedCase, RiskCategory, RiskScore, TemporalPatterns, TimelineGap,
};
use casegraph_domain::{PersonId, TimelineEntry};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::fmt::Display;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Pretty JSON in JSON mode, otherwise whatever `table` renders.
    fn render<T, F>(&self, value: &T, table: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table => Ok(table()),
        }
    }

    /// Format the network degree of a person.
    pub fn format_degree(&self, person: PersonId, degree: &NetworkDegree) -> Result<String> {
        self.render(degree, || {
            let hub = if degree.is_hub {
                self.colorize("yes", "magenta")
            } else {
                "no".to_string()
            };
            key_values([
                ("Person", person.to_string()),
                ("Degree", degree.degree.to_string()),
                ("Outgoing", degree.out_degree.to_string()),
                ("Incoming", degree.in_degree.to_string()),
                ("Cases", degree.case_count.to_string()),
                ("Hub", hub),
            ])
        })
    }

    /// Format a risk score with its breakdown.
    pub fn format_risk(&self, person: PersonId, score: &RiskScore) -> Result<String> {
        self.render(score, || {
            let b = &score.breakdown;
            key_values([
                ("Person", person.to_string()),
                ("Base", b.base_score.to_string()),
                ("Cases", b.case_score.to_string()),
                ("Roles", b.role_score.to_string()),
                ("Network", b.network_score.to_string()),
                ("Total", score.total_score.to_string()),
                ("Category", self.category(score.risk_category)),
            ])
        })
    }

    /// Format hub persons.
    pub fn format_hubs(&self, hubs: &[PersonMetrics]) -> Result<String> {
        self.render(hubs, || {
            if hubs.is_empty() {
                return self.colorize("No hubs found.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Risk", "Degree", "Out", "In", "Cases"]);
            for hub in hubs {
                builder.push_record([
                    hub.person.id.to_string(),
                    hub.person.full_name(),
                    hub.person.risk_level.to_string(),
                    hub.metrics.degree.to_string(),
                    hub.metrics.out_degree.to_string(),
                    hub.metrics.in_degree.to_string(),
                    hub.metrics.case_count.to_string(),
                ]);
            }
            finish(builder)
        })
    }

    /// Format multi-case persons.
    pub fn format_multi_case(&self, profiles: &[MultiCaseProfile]) -> Result<String> {
        self.render(profiles, || {
            if profiles.is_empty() {
                return self.colorize("No persons with more than one case.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Cases", "Roles", "Case types", "First", "Last"]);
            for p in profiles {
                builder.push_record([
                    p.person.id.to_string(),
                    p.person.full_name(),
                    p.case_count.to_string(),
                    join(&p.roles),
                    join(&p.case_types),
                    date(p.first_incident),
                    date(p.last_incident),
                ]);
            }
            finish(builder)
        })
    }

    /// Format a network graph as node and edge tables.
    pub fn format_graph(&self, graph: &NetworkGraph) -> Result<String> {
        self.render(graph, || {
            let stats = &graph.stats;
            let summary = self.info(&format!(
                "{} persons, {} relationships, {} in several cases, {} high risk",
                stats.total_persons,
                stats.total_relationships,
                stats.multi_case_persons,
                stats.high_risk_persons
            ));
            if graph.nodes.is_empty() {
                return summary;
            }

            let mut nodes = Builder::default();
            nodes.push_record(["ID", "Name", "Risk", "Cases", "Roles", "Size"]);
            for n in &graph.nodes {
                nodes.push_record([
                    n.id.to_string(),
                    n.label.clone(),
                    n.risk_level.to_string(),
                    n.case_count.to_string(),
                    join(&n.roles),
                    n.size.to_string(),
                ]);
            }

            let mut out = format!("{}\n{}", summary, finish(nodes));
            if !graph.edges.is_empty() {
                let mut edges = Builder::default();
                edges.push_record(["From", "To", "Type", "Strength", "Common cases"]);
                for e in &graph.edges {
                    edges.push_record([
                        e.from.to_string(),
                        e.to.to_string(),
                        e.label.clone(),
                        e.strength.to_string(),
                        e.common_cases.to_string(),
                    ]);
                }
                out.push('\n');
                out.push_str(&finish(edges));
            }
            out
        })
    }

    /// Format case clusters.
    pub fn format_clusters(&self, clusters: &[CaseCluster]) -> Result<String> {
        self.render(clusters, || {
            if clusters.is_empty() {
                return self.colorize("No case clusters found.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["Main case", "Persons", "Related case", "Shared", "Shared persons"]);
            for cluster in clusters {
                for (i, related) in cluster.related_cases.iter().enumerate() {
                    let (main, persons) = if i == 0 {
                        (
                            format!("{} {}", cluster.main_case.case_number, cluster.main_case.title),
                            cluster.total_persons.to_string(),
                        )
                    } else {
                        (String::new(), String::new())
                    };
                    builder.push_record([
                        main,
                        persons,
                        format!("{} {}", related.case.case_number, related.case.title),
                        related.shared_persons.to_string(),
                        join(&related.shared_person_ids),
                    ]);
                }
            }
            finish(builder)
        })
    }

    /// Format pattern analysis.
    pub fn format_patterns(&self, patterns: &PatternAnalysis) -> Result<String> {
        self.render(patterns, || {
            let mut months = Builder::default();
            months.push_record(["Month", "Cases"]);
            for m in &patterns.monthly_trend {
                months.push_record([m.month.clone(), m.count.to_string()]);
            }

            let mut types = Builder::default();
            types.push_record(["Case type", "Cases"]);
            for t in &patterns.case_type_distribution {
                types.push_record([t.case_type.label().to_string(), t.count.to_string()]);
            }

            format!(
                "{}\n{}\n{}",
                finish(months),
                finish(types),
                self.info(&format!("Repeat suspects: {}", patterns.repeat_suspect_count))
            )
        })
    }

    /// Format related cases.
    pub fn format_related(&self, related: &[RelatedCase]) -> Result<String> {
        self.render(related, || {
            if related.is_empty() {
                return self.colorize("No related cases found.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Number", "Title", "Type", "Status", "Shared", "Persons"]);
            for r in related {
                builder.push_record([
                    r.case.id.to_string(),
                    r.case.case_number.clone(),
                    r.case.title.clone(),
                    r.case.case_type.label().to_string(),
                    r.case.status.label().to_string(),
                    r.shared_persons.to_string(),
                    join(&r.shared_person_ids),
                ]);
            }
            finish(builder)
        })
    }

    /// Format case statistics.
    pub fn format_stats(&self, stats: &CaseStatistics) -> Result<String> {
        self.render(stats, || self.stats_table(stats))
    }

    /// Format the dashboard: alert, statistics and the two short lists.
    pub fn format_dashboard(&self, dashboard: &Dashboard) -> Result<String> {
        self.render(dashboard, || {
            let mut sections = Vec::new();
            if dashboard.urgent_open_cases > 0 {
                let alert = format!("{} urgent open cases", dashboard.urgent_open_cases);
                sections.push(self.colorize(&alert, "red"));
            }
            sections.push(self.stats_table(&dashboard.statistics));

            let mut recent = Builder::default();
            recent.push_record(["Number", "Title", "Type", "Status", "Priority", "Incident"]);
            for case in &dashboard.recent_cases {
                recent.push_record([
                    case.case_number.clone(),
                    case.title.clone(),
                    case.case_type.label().to_string(),
                    case.status.label().to_string(),
                    case.priority.label().to_string(),
                    date(case.incident_date),
                ]);
            }
            sections.push(format!("{}\n{}", self.info("Recent cases"), finish(recent)));

            if dashboard.high_risk_persons.is_empty() {
                sections.push(self.colorize("No high-risk persons.", "yellow"));
            } else {
                let mut persons = Builder::default();
                persons.push_record(["ID", "Name", "Risk", "Age"]);
                for person in &dashboard.high_risk_persons {
                    persons.push_record([
                        person.id.to_string(),
                        person.name.clone(),
                        person.risk_level.to_string(),
                        person.age.map_or_else(|| "-".to_string(), |age| age.to_string()),
                    ]);
                }
                sections.push(format!("{}\n{}", self.info("High-risk persons"), finish(persons)));
            }
            sections.join("\n")
        })
    }

    fn stats_table(&self, stats: &CaseStatistics) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Group", "Value", "Cases"]);
        for (status, count) in &stats.by_status {
            builder.push_record(["Status".to_string(), status.label().to_string(), count.to_string()]);
        }
        for (priority, count) in &stats.by_priority {
            builder.push_record(["Priority".to_string(), priority.label().to_string(), count.to_string()]);
        }
        for (case_type, count) in &stats.by_type {
            builder.push_record(["Type".to_string(), case_type.label().to_string(), count.to_string()]);
        }

        let urgent = format!("{} urgent", stats.urgent_count);
        let urgent = if stats.urgent_count > 0 {
            self.colorize(&urgent, "red")
        } else {
            urgent
        };
        format!(
            "{}\n{}, {} open, {} in progress, {} created in the last {} days\n{}",
            self.info(&format!("{} cases", stats.total)),
            urgent,
            stats.open_count,
            stats.in_progress_count,
            stats.recent,
            stats.recent_days,
            finish(builder)
        )
    }

    /// Format timeline gaps.
    pub fn format_gaps(&self, gaps: &[TimelineGap]) -> Result<String> {
        self.render(gaps, || {
            if gaps.is_empty() {
                return self.colorize("No gaps found.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["From", "To", "Hours", "Before", "After"]);
            for gap in gaps {
                builder.push_record([
                    timestamp(gap.start),
                    timestamp(gap.end),
                    format!("{:.1}", gap.duration_hours),
                    gap.before_event.title.clone(),
                    gap.after_event.title.clone(),
                ]);
            }
            finish(builder)
        })
    }

    /// Format timeline entries.
    pub fn format_timeline(&self, entries: &[TimelineEntry]) -> Result<String> {
        self.render(entries, || {
            if entries.is_empty() {
                return self.colorize("No timeline entries found.", "yellow");
            }
            let mut builder = Builder::default();
            builder.push_record(["When", "Case", "Title", "Description"]);
            for e in entries {
                builder.push_record([
                    timestamp(e.datetime),
                    e.case.to_string(),
                    e.title.clone(),
                    e.description.clone(),
                ]);
            }
            finish(builder)
        })
    }

    /// Format hour and weekday distributions.
    pub fn format_temporal(&self, patterns: &TemporalPatterns) -> Result<String> {
        self.render(patterns, || {
            if patterns.by_hour.is_empty() {
                return self.colorize("No timeline entries found.", "yellow");
            }
            let mut hours = Builder::default();
            hours.push_record(["Hour", "Events"]);
            for (hour, count) in &patterns.by_hour {
                hours.push_record([format!("{:02}:00", hour), count.to_string()]);
            }

            let mut days = Builder::default();
            days.push_record(["Weekday", "Events"]);
            for (day, count) in &patterns.by_weekday {
                days.push_record([weekday(*day).to_string(), count.to_string()]);
            }

            let peak = format!(
                "Peak: {} on {}",
                patterns.peak_hour.map_or("-".to_string(), |h| format!("{:02}:00", h)),
                patterns.peak_weekday.map_or("-", weekday)
            );
            format!("{}\n{}\n{}", finish(hours), finish(days), self.info(&peak))
        })
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn category(&self, category: RiskCategory) -> String {
        let color = match category {
            RiskCategory::Critical | RiskCategory::High => "red",
            RiskCategory::Medium => "yellow",
            RiskCategory::Low | RiskCategory::Minimal => "green",
        };
        self.colorize(category.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn finish(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn key_values<const N: usize>(rows: [(&str, String); N]) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn weekday(day: u32) -> &'static str {
    day.checked_sub(1)
        .and_then(|i| WEEKDAYS.get(i as usize))
        .copied()
        .unwrap_or("?")
}
