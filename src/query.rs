//! Read-only queries over the working set.
//!
//! [`QueryFacade`] holds the filtering primitives. [`PriceService`] is the
//! surface the presentation layer calls: search, city/region listings and
//! contextual stats.
//!
//! City matching comes in two flavours on purpose. Search matches a city
//! exactly but ignores accents and case ([`QueryFacade::match_city_exact`]);
//! stats match any city whose name contains the text, ignoring case only
//! ([`QueryFacade::match_city_contains`]).

use crate::config::Config;
use crate::error::{QueryError, Result};
use crate::pipeline::WorkingSet;
use crate::reports::kpi_summary;
use crate::types::{KpiScope, Record, SearchResult, StatsResponse};
use crate::util::normalize_name;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

pub struct QueryFacade<'a> {
    records: &'a [Record],
}

impl<'a> QueryFacade<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    /// Distinct municipality names, sorted.
    pub fn list_municipalities(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.municipality.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Distinct region codes, sorted.
    pub fn list_regions(&self) -> Vec<String> {
        let codes: BTreeSet<&str> = self.records.iter().map(|r| r.region.as_str()).collect();
        codes.into_iter().map(str::to_string).collect()
    }

    /// Records whose municipality contains `substring`.
    pub fn filter_by_municipality(&self, substring: &str, case_insensitive: bool) -> Vec<Record> {
        let filtered: Vec<Record> = if case_insensitive {
            let needle = substring.to_lowercase();
            self.select(|r| r.municipality.to_lowercase().contains(&needle))
        } else {
            self.select(|r| r.municipality.contains(substring))
        };
        info!(
            "City filter '{}' applied, {} records found",
            substring,
            filtered.len()
        );
        filtered
    }

    /// Case-insensitive substring match. Accents are significant.
    pub fn match_city_contains(&self, substring: &str) -> Vec<Record> {
        self.filter_by_municipality(substring, true)
    }

    /// Whole-name match ignoring accents, case and surrounding whitespace.
    pub fn match_city_exact(&self, name: &str) -> Vec<Record> {
        let wanted = normalize_name(name);
        self.select(|r| normalize_name(&r.municipality) == wanted)
    }

    /// Exact match on the upper-cased code; `"sp"` matches `"SP"` but not
    /// `"SP2"`.
    pub fn filter_by_region(&self, code: &str) -> Vec<Record> {
        let code = code.trim().to_uppercase();
        let filtered = self.select(|r| r.region == code);
        info!(
            "Region filter '{}' applied, {} records found",
            code,
            filtered.len()
        );
        filtered
    }

    fn select<F>(&self, pred: F) -> Vec<Record>
    where
        F: Fn(&Record) -> bool,
    {
        self.records.iter().filter(|r| pred(*r)).cloned().collect()
    }
}

/// Consumer-facing operations over one working-set snapshot.
#[derive(Debug, Clone)]
pub struct PriceService {
    set: Arc<WorkingSet>,
    config: Config,
}

impl PriceService {
    pub fn new(set: Arc<WorkingSet>, config: Config) -> Self {
        Self { set, config }
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.set
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn facade(&self) -> QueryFacade<'_> {
        QueryFacade::new(self.set.records())
    }

    /// Newest observations first, optionally narrowed to a region and an
    /// exact (accent-insensitive) city. `limit` defaults to the configured
    /// page size and is capped at `max_results`; a limit of 0 yields nothing.
    pub fn search(
        &self,
        region: Option<&str>,
        municipality: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let limit = limit
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_results);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut rows: Vec<Record> = self.set.records().to_vec();
        if let Some(region) = non_blank(region) {
            rows = QueryFacade::new(&rows).filter_by_region(region);
        }
        if let Some(city) = non_blank(municipality) {
            rows = QueryFacade::new(&rows).match_city_exact(city);
        }

        rows.sort_by(|a, b| b.collected_date.cmp(&a.collected_date));
        rows.truncate(limit);
        Ok(rows.iter().map(SearchResult::from).collect())
    }

    pub fn list_cities(&self) -> Vec<String> {
        self.facade().list_municipalities()
    }

    pub fn list_regions(&self) -> Vec<String> {
        self.facade().list_regions()
    }

    /// KPIs for a city (substring match), a region, or everything.
    pub fn stats(&self, region: Option<&str>, municipality: Option<&str>) -> Result<StatsResponse> {
        if self.config.weeks == 0 {
            return Err(QueryError::InvalidArgument("weeks must be at least 1".into()).into());
        }
        let region = non_blank(region);
        let city = non_blank(municipality);

        let mut subset: Vec<Record> = self.set.records().to_vec();
        if let Some(city) = city {
            subset = QueryFacade::new(&subset).match_city_contains(city);
        }
        if let Some(region) = region {
            subset = QueryFacade::new(&subset).filter_by_region(region);
        }

        let summary = kpi_summary(&subset, self.config.weeks);
        let kpis = summary.kpis;
        let scope = if city.is_some() {
            KpiScope::City
        } else if region.is_some() {
            KpiScope::Region
        } else {
            KpiScope::Global
        };

        let mut response = StatsResponse {
            kpi_scope: scope,
            avg_price: kpis.avg_price,
            total_companies: kpis.total_companies,
            total_cities: None,
            total_regions: None,
            min_price: None,
            max_price: None,
            dates: kpis.dates,
        };
        match scope {
            KpiScope::City => {
                response.min_price = summary.stats.min_price;
                response.max_price = summary.stats.max_price;
            }
            KpiScope::Region => {
                response.total_cities = Some(kpis.total_cities);
            }
            KpiScope::Global => {
                response.total_cities = Some(kpis.total_cities);
                response.total_regions = Some(kpis.total_states);
            }
        }
        Ok(response)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
