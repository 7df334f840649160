//! Consumer query tests over a working set built from a fixture file.

mod common;

use glp_report::types::KpiScope;
use glp_report::{Config, ErrorBody, PriceService, WorkingSet};
use rust_decimal::Decimal;
use std::sync::Arc;

fn service() -> PriceService {
    let file = common::two_week_survey();
    let (set, _) = WorkingSet::build(file.path(), 30).unwrap();
    PriceService::new(Arc::new(set), Config::default())
}

#[test]
fn lists_are_sorted() {
    let svc = service();
    assert_eq!(svc.list_cities(), vec!["CAMPINAS", "NITERÓI", "SÃO PAULO"]);
    assert_eq!(svc.list_regions(), vec!["RJ", "SP"]);
}

#[test]
fn search_matches_city_without_accents() {
    let svc = service();
    let rows = svc.search(None, Some("niteroi"), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].seller, "REVENDA E");
    assert_eq!(rows[0].address, "RUA UM, 10 - CENTRO");
    assert_eq!(rows[0].collected_date, "13/06/2025");
}

#[test]
fn search_orders_newest_first() {
    let rows = service().search(Some("sp"), None, None).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.collected_date.as_str()).collect();
    assert_eq!(dates, vec!["10/06/2025", "09/06/2025", "03/06/2025", "02/06/2025"]);
}

#[test]
fn global_stats_follow_the_two_week_scenario() {
    let stats = service().stats(None, None).unwrap();
    assert_eq!(stats.kpi_scope, KpiScope::Global);
    assert_eq!(stats.dates, vec!["02/06", "09/06"]);
    assert_eq!(stats.avg_price.history, vec![100.0, 110.0]);
    assert_eq!(stats.avg_price.variation.abs, Some(10.0));
    assert!((stats.avg_price.variation.pct.unwrap() - 10.0).abs() < 1e-9);

    let cities = stats.total_cities.unwrap();
    assert_eq!(cities.history, vec![2, 3]);
    assert_eq!(stats.total_regions.unwrap().history, vec![1, 2]);
}

#[test]
fn city_stats_use_substring_match() {
    let stats = service().stats(None, Some("são")).unwrap();
    assert_eq!(stats.kpi_scope, KpiScope::City);
    assert_eq!(stats.min_price, Some(Decimal::from(90)));
    assert_eq!(stats.max_price, Some(Decimal::from(100)));
    assert_eq!(stats.total_companies.history, vec![1, 1]);
    let pct = stats.avg_price.variation.pct.unwrap();
    assert!((pct - 10.0 / 90.0 * 100.0).abs() < 1e-9);
}

#[test]
fn region_stats_with_single_week_have_no_variation() {
    let stats = service().stats(Some("rj"), None).unwrap();
    assert_eq!(stats.kpi_scope, KpiScope::Region);
    assert_eq!(stats.avg_price.current, Some(120.0));
    assert_eq!(stats.avg_price.variation.abs, None);
    assert_eq!(stats.avg_price.variation.pct, None);
}

#[test]
fn query_errors_map_to_error_body() {
    let file = common::two_week_survey();
    let (set, _) = WorkingSet::build(file.path(), 30).unwrap();
    let config = Config {
        weeks: 0,
        ..Config::default()
    };
    let err = PriceService::new(Arc::new(set), config)
        .stats(None, None)
        .unwrap_err();
    let body = ErrorBody::from(&err);
    assert_eq!(body.category, "queryError");
    assert!(body.message.contains("weeks"));
}

#[test]
fn zero_limit_search_is_empty() {
    let svc = service();
    assert!(svc.search(None, None, Some(0)).unwrap().is_empty());
    assert_eq!(svc.search(None, None, None).unwrap().len(), 5);
}
