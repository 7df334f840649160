use crate::types::{KpiSummary, StatLine, StatsResponse, WeekRow};
use crate::util::{display_opt_price, format_int};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Markdown table of `rows`, or `(no rows)` when there is nothing to show.
pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn print_table<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows));
}

pub fn print_list(title: &str, items: &[String]) {
    println!("{} ({})\n", title, format_int(items.len()));
    for item in items {
        println!("{}", item);
    }
    println!();
}

pub fn summary_lines(summary: &KpiSummary) -> Vec<StatLine> {
    let s = &summary.stats;
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    vec![
        StatLine::new("Records", format_int(s.total_records)),
        StatLine::decimal("Min price", s.min_price),
        StatLine::decimal("Max price", s.max_price),
        StatLine::new("Oldest date", date(s.oldest_date)),
        StatLine::new("Latest date", date(s.latest_date)),
        StatLine::price("Avg price (current week)", summary.kpis.avg_price.current),
        StatLine::new(
            "Avg price variation",
            variation_text(summary.kpis.avg_price.variation.abs, summary.kpis.avg_price.variation.pct),
        ),
    ]
}

pub fn week_rows(summary: &KpiSummary) -> Vec<WeekRow> {
    let k = &summary.kpis;
    k.dates
        .iter()
        .enumerate()
        .map(|(i, week)| WeekRow {
            week: week.clone(),
            avg_price: k.avg_price.history[i],
            cities: k.total_cities.history[i],
            companies: k.total_companies.history[i],
            regions: k.total_states.history[i],
        })
        .collect()
}

pub fn stats_lines(stats: &StatsResponse) -> Vec<StatLine> {
    let scope = serde_json::to_value(stats.kpi_scope)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let count = |c: Option<usize>| c.map(format_int).unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        StatLine::new("Scope", scope),
        StatLine::price("Avg price", stats.avg_price.current),
        StatLine::new(
            "Avg price variation",
            variation_text(stats.avg_price.variation.abs, stats.avg_price.variation.pct),
        ),
        StatLine::new("Companies", count(stats.total_companies.current)),
    ];
    if let Some(cities) = &stats.total_cities {
        lines.push(StatLine::new("Cities", count(cities.current)));
    }
    if let Some(regions) = &stats.total_regions {
        lines.push(StatLine::new("Regions", count(regions.current)));
    }
    if stats.min_price.is_some() || stats.max_price.is_some() {
        lines.push(StatLine::decimal("Min price", stats.min_price));
        lines.push(StatLine::decimal("Max price", stats.max_price));
    }
    lines.push(StatLine::new("Weeks", stats.dates.join(", ")));
    lines
}

fn variation_text(abs: Option<f64>, pct: Option<f64>) -> String {
    match (abs, pct) {
        (Some(a), Some(p)) => format!("{} ({:+.1}%)", display_opt_price(&Some(a)), p),
        (Some(a), None) => display_opt_price(&Some(a)),
        _ => "-".to_string(),
    }
}
