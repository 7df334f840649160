use crate::types::{
    KpiSeries, KpiSummary, KpiVariations, Kpis, Record, SummaryStats, Variation, WeeklyHistory,
};
use crate::util::{average_price, week_start};
use rust_decimal::Decimal;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Cross-sectional stats over `data`. Everything but the count is `None`
/// for an empty slice.
pub fn summary_stats(data: &[Record]) -> SummaryStats {
    let min_price = data.iter().map(|r| r.price).min();
    let max_price = data.iter().map(|r| r.price).max();
    SummaryStats {
        total_records: data.len(),
        min_price,
        max_price,
        latest_date: data.iter().map(|r| r.collected_date).max(),
        oldest_date: data.iter().map(|r| r.collected_date).min(),
    }
}

/// Weekly KPIs for the most recent `weeks` calendar weeks present in `data`,
/// oldest first. Weeks start on Monday.
pub fn weekly_kpi_history(data: &[Record], weeks: usize) -> WeeklyHistory {
    #[derive(Default)]
    struct Acc<'a> {
        prices: Vec<Decimal>,
        cities: HashSet<&'a str>,
        companies: HashSet<&'a str>,
        states: HashSet<&'a str>,
    }

    let mut map: HashMap<NaiveDate, Acc> = HashMap::new();
    for r in data {
        let e = map.entry(week_start(r.collected_date)).or_default();
        e.prices.push(r.price);
        e.cities.insert(&r.municipality);
        e.companies.insert(&r.seller);
        e.states.insert(&r.region);
    }

    let mut keys: Vec<NaiveDate> = map.keys().copied().collect();
    keys.sort();
    let tail = &keys[keys.len().saturating_sub(weeks)..];

    let mut history = WeeklyHistory::default();
    for week in tail {
        let Some(acc) = map.get(week) else { continue };
        history.dates.push(*week);
        history.avg_price.push(average_price(&acc.prices));
        history.total_cities.push(acc.cities.len());
        history.total_companies.push(acc.companies.len());
        history.total_states.push(acc.states.len());
    }
    history
}

/// Change between the last two points of `series`. The percentage is
/// undefined when the previous value is zero; both are undefined with fewer
/// than two points.
pub fn variation(series: &[f64]) -> Variation {
    let [.., prev, last] = series else {
        return Variation::default();
    };
    let abs = last - prev;
    let pct = if *prev == 0.0 {
        None
    } else {
        Some(abs / prev * 100.0)
    };
    Variation {
        abs: Some(abs),
        pct,
    }
}

fn count_variation(series: &[usize]) -> Variation {
    let as_f64: Vec<f64> = series.iter().map(|v| *v as f64).collect();
    variation(&as_f64)
}

pub fn kpi_variations(history: &WeeklyHistory) -> KpiVariations {
    KpiVariations {
        avg_price: variation(&history.avg_price),
        total_cities: count_variation(&history.total_cities),
        total_companies: count_variation(&history.total_companies),
        total_states: count_variation(&history.total_states),
    }
}

fn series<T: Copy>(history: &[T], variation: Variation) -> KpiSeries<T> {
    KpiSeries {
        current: history.last().copied(),
        history: history.to_vec(),
        variation,
    }
}

/// Summary stats plus each weekly KPI with its current value, history and
/// variation. Works on any subset of the working set.
pub fn kpi_summary(data: &[Record], weeks: usize) -> KpiSummary {
    let stats = summary_stats(data);
    let history = weekly_kpi_history(data, weeks);
    let variations = kpi_variations(&history);
    KpiSummary {
        stats,
        kpis: Kpis {
            avg_price: series(&history.avg_price, variations.avg_price),
            total_cities: series(&history.total_cities, variations.total_cities),
            total_companies: series(&history.total_companies, variations.total_companies),
            total_states: series(&history.total_states, variations.total_states),
            dates: history.labels(),
        },
    }
}
