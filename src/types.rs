use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{display_decimal, display_opt_decimal, display_opt_price, display_price};

/// One row of the source file, exactly as published. Every field is kept as
/// optional text; typing happens in the cleaner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Data da Coleta")]
    pub collected_date: Option<String>,
    #[serde(rename = "Produto")]
    pub product: Option<String>,
    #[serde(rename = "Valor de Venda")]
    pub price: Option<String>,
    #[serde(rename = "Estado - Sigla")]
    pub region: Option<String>,
    #[serde(rename = "Municipio")]
    pub municipality: Option<String>,
    #[serde(rename = "Revenda")]
    pub seller: Option<String>,
    #[serde(rename = "CNPJ da Revenda")]
    pub seller_tax_id: Option<String>,
    #[serde(rename = "Nome da Rua")]
    pub street: Option<String>,
    #[serde(rename = "Numero Rua")]
    pub number: Option<String>,
    #[serde(rename = "Bairro")]
    pub district: Option<String>,
    #[serde(rename = "Cep")]
    pub postal_code: Option<String>,
    #[serde(rename = "Bandeira")]
    pub brand: Option<String>,
    /// Columns the record does not type (complement, purchase price, unit,
    /// ...) in header order. Part of the duplicate check.
    #[serde(skip)]
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub district: String,
    pub postal_code: String,
}

impl Address {
    /// `"street, number - district"`, the way resale addresses are listed.
    pub fn one_line(&self) -> String {
        format!("{}, {} - {}", self.street, self.number, self.district)
    }
}

/// A cleaned price observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub collected_date: NaiveDate,
    pub region: String,
    pub municipality: String,
    pub seller: String,
    pub seller_tax_id: String,
    pub address: Address,
    pub price: Decimal,
    pub brand: String,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub latest_date: Option<NaiveDate>,
    pub oldest_date: Option<NaiveDate>,
}

/// Weekly KPI series, aligned by index and ordered by week start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyHistory {
    pub dates: Vec<NaiveDate>,
    pub avg_price: Vec<f64>,
    pub total_cities: Vec<usize>,
    pub total_companies: Vec<usize>,
    pub total_states: Vec<usize>,
}

impl WeeklyHistory {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Week labels as shown on charts (`dd/mm`).
    pub fn labels(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format("%d/%m").to_string())
            .collect()
    }
}

/// Change between the two most recent points of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Variation {
    pub abs: Option<f64>,
    pub pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiVariations {
    pub avg_price: Variation,
    pub total_cities: Variation,
    pub total_companies: Variation,
    pub total_states: Variation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSeries<T> {
    pub current: Option<T>,
    pub history: Vec<T>,
    pub variation: Variation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub avg_price: KpiSeries<f64>,
    pub total_cities: KpiSeries<usize>,
    pub total_companies: KpiSeries<usize>,
    pub total_states: KpiSeries<usize>,
    pub dates: Vec<String>,
}

/// Summary stats together with the weekly KPI cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    #[serde(flatten)]
    pub stats: SummaryStats,
    pub kpis: Kpis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiScope {
    City,
    Region,
    Global,
}

/// Response of the contextual stats query. Which optional fields are set
/// depends on `kpi_scope`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub kpi_scope: KpiScope,
    pub avg_price: KpiSeries<f64>,
    pub total_companies: KpiSeries<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cities: Option<KpiSeries<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_regions: Option<KpiSeries<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SearchResult {
    #[tabled(rename = "Municipality")]
    pub municipality: String,
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Seller")]
    pub seller: String,
    #[tabled(rename = "TaxId")]
    pub seller_tax_id: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "PostalCode")]
    pub postal_code: String,
    #[tabled(rename = "Price", display_with = "display_decimal")]
    pub price: Decimal,
    #[tabled(rename = "Collected")]
    pub collected_date: String,
    #[tabled(rename = "Brand")]
    pub brand: String,
}

impl From<&Record> for SearchResult {
    fn from(r: &Record) -> Self {
        Self {
            municipality: r.municipality.clone(),
            region: r.region.clone(),
            seller: r.seller.clone(),
            seller_tax_id: r.seller_tax_id.clone(),
            address: r.address.one_line(),
            postal_code: r.address.postal_code.clone(),
            price: r.price,
            collected_date: r.collected_date.format("%d/%m/%Y").to_string(),
            brand: r.brand.clone(),
        }
    }
}

/// One line of the weekly KPI table printed by the CLI.
#[derive(Debug, Tabled, Clone)]
pub struct WeekRow {
    #[tabled(rename = "Week")]
    pub week: String,
    #[tabled(rename = "AvgPrice", display_with = "display_price")]
    pub avg_price: f64,
    #[tabled(rename = "Cities")]
    pub cities: usize,
    #[tabled(rename = "Companies")]
    pub companies: usize,
    #[tabled(rename = "Regions")]
    pub regions: usize,
}

/// Key/value line for the summary table printed by the CLI.
#[derive(Debug, Tabled, Clone)]
pub struct StatLine {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl StatLine {
    pub fn new(metric: &str, value: String) -> Self {
        Self {
            metric: metric.to_string(),
            value,
        }
    }

    pub fn price(metric: &str, value: Option<f64>) -> Self {
        Self::new(metric, display_opt_price(&value))
    }

    pub fn decimal(metric: &str, value: Option<Decimal>) -> Self {
        Self::new(metric, display_opt_decimal(&value))
    }
}
