use crate::config::TARGET_PRODUCT;
use crate::types::{Address, RawRow, Record};
use crate::util::{parse_date_safe, parse_price_safe, text_or_empty};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Why a raw row did not make it into the cleaned set. These are data
/// quality noise, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    InvalidDate,
    InvalidPrice,
    MissingMunicipality,
    OtherProduct,
    Duplicate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub total_rows: usize,
    pub invalid_date: usize,
    pub invalid_price: usize,
    pub missing_municipality: usize,
    pub other_product: usize,
    pub duplicates: usize,
    pub kept: usize,
}

impl CleanReport {
    fn count(&mut self, reason: DropReason) {
        match reason {
            DropReason::InvalidDate => self.invalid_date += 1,
            DropReason::InvalidPrice => self.invalid_price += 1,
            DropReason::MissingMunicipality => self.missing_municipality += 1,
            DropReason::OtherProduct => self.other_product += 1,
            DropReason::Duplicate => self.duplicates += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.total_rows - self.kept
    }
}

/// Type a single raw row, or say why it has to go.
pub fn clean_row(row: &RawRow) -> Result<Record, DropReason> {
    let collected_date =
        parse_date_safe(row.collected_date.as_deref()).ok_or(DropReason::InvalidDate)?;
    let price = parse_price_safe(row.price.as_deref()).ok_or(DropReason::InvalidPrice)?;

    let municipality = text_or_empty(row.municipality.as_deref());
    if municipality.is_empty() {
        return Err(DropReason::MissingMunicipality);
    }

    let product = text_or_empty(row.product.as_deref());
    if product != TARGET_PRODUCT {
        return Err(DropReason::OtherProduct);
    }

    Ok(Record {
        collected_date,
        region: text_or_empty(row.region.as_deref()).to_uppercase(),
        municipality,
        seller: text_or_empty(row.seller.as_deref()),
        seller_tax_id: text_or_empty(row.seller_tax_id.as_deref()),
        address: Address {
            street: text_or_empty(row.street.as_deref()),
            number: text_or_empty(row.number.as_deref()),
            district: text_or_empty(row.district.as_deref()),
            postal_code: text_or_empty(row.postal_code.as_deref()),
        },
        price,
        brand: text_or_empty(row.brand.as_deref()),
        product,
    })
}

/// Turn raw rows into typed records, dropping invalid rows, other products
/// and exact duplicates. First occurrences are kept in input order.
///
/// Two rows are duplicates when their typed fields are equal and their
/// untyped columns ([`RawRow::extra`]) match verbatim.
pub fn clean(rows: &[RawRow]) -> (Vec<Record>, CleanReport) {
    let mut report = CleanReport {
        total_rows: rows.len(),
        ..CleanReport::default()
    };

    let mut typed: Vec<(Record, &[String])> = Vec::with_capacity(rows.len());
    for (line, row) in rows.iter().enumerate() {
        match clean_row(row) {
            Ok(r) => typed.push((r, row.extra.as_slice())),
            Err(reason) => {
                debug!(line = line + 1, ?reason, "dropping row");
                report.count(reason);
            }
        }
    }

    let mut cleaned: Vec<Record> = Vec::with_capacity(typed.len());
    {
        let mut seen: HashSet<(&Record, &[String])> = HashSet::new();
        for (r, extra) in &typed {
            if seen.insert((r, *extra)) {
                cleaned.push(r.clone());
            } else {
                report.count(DropReason::Duplicate);
            }
        }
    }

    report.kept = cleaned.len();
    info!(
        total = report.total_rows,
        kept = report.kept,
        invalid_date = report.invalid_date,
        invalid_price = report.invalid_price,
        missing_municipality = report.missing_municipality,
        other_product = report.other_product,
        duplicates = report.duplicates,
        "Cleaning finished, {} rows removed",
        report.dropped()
    );
    (cleaned, report)
}
