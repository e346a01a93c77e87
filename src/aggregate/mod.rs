//! The five derived views over one uploaded table.
//!
//! Every operation takes the whole table and returns an ordered sequence of
//! `(key, value)` rows ready for charting. An empty table is an error, never
//! an empty chart.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::TableError;
use crate::ingest::{SalesRecord, SalesTable};

/// Ordered `(label, summed amount)` rows.
pub type AmountSeries = Vec<(String, f64)>;

/// Ordered `(label, summed quantity)` rows.
pub type QuantitySeries = Vec<(String, u64)>;

/// Group by calendar month and sum `amount`, ascending by month.
///
/// Keys render as `YYYY-MM`, which also makes lexicographic order
/// chronological.
pub fn monthly_totals(table: &SalesTable) -> Result<AmountSeries, TableError> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for record in non_empty(table)? {
        *months.entry(record.date.format("%Y-%m").to_string()).or_insert(0.0) += record.amount;
    }
    Ok(months.into_iter().collect())
}

/// Group by category and sum `amount`, in first encounter order.
pub fn category_shares(table: &SalesTable) -> Result<AmountSeries, TableError> {
    let mut order: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in non_empty(table)? {
        match index.get(&record.category) {
            Some(&i) => order[i].1 += record.amount,
            None => {
                index.insert(record.category.clone(), order.len());
                order.push((record.category.clone(), record.amount));
            }
        }
    }
    Ok(order)
}

/// Group by calendar day and sum `quantity`, ascending by day.
pub fn daily_quantities(table: &SalesTable) -> Result<QuantitySeries, TableError> {
    let mut days: BTreeMap<String, u64> = BTreeMap::new();
    for record in non_empty(table)? {
        *days.entry(record.date.format("%Y-%m-%d").to_string()).or_insert(0) += record.quantity;
    }
    Ok(days.into_iter().collect())
}

/// Same derivation as [`monthly_totals`]; feeds the area panel.
pub fn monthly_totals_area(table: &SalesTable) -> Result<AmountSeries, TableError> {
    monthly_totals(table)
}

/// Group by product and sum `quantity`, keeping the `n` largest sums in
/// descending order. Ties keep input encounter order.
pub fn top_products_by_quantity(table: &SalesTable, n: usize) -> Result<QuantitySeries, TableError> {
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in non_empty(table)? {
        match index.get(&record.product) {
            Some(&i) => order[i].1 += record.quantity,
            None => {
                index.insert(record.product.clone(), order.len());
                order.push((record.product.clone(), record.quantity));
            }
        }
    }
    // stable sort keeps encounter order among equal sums
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(n);
    Ok(order)
}

fn non_empty(table: &SalesTable) -> Result<&[SalesRecord], TableError> {
    if table.is_empty() {
        return Err(TableError::Empty);
    }
    Ok(table.records())
}

/// All five derived views for one upload, in panel order.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSeries {
    pub monthly_totals: AmountSeries,
    pub category_shares: AmountSeries,
    pub daily_quantities: QuantitySeries,
    pub monthly_totals_area: AmountSeries,
    pub top_products: QuantitySeries,
}

/// Run every aggregation over one table.
pub fn derive_all(table: &SalesTable, top_n: usize) -> Result<DashboardSeries, TableError> {
    Ok(DashboardSeries {
        monthly_totals: monthly_totals(table)?,
        category_shares: category_shares(table)?,
        daily_quantities: daily_quantities(table)?,
        monthly_totals_area: monthly_totals_area(table)?,
        top_products: top_products_by_quantity(table, top_n)?,
    })
}
