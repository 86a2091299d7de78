use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::table::{Column, Table};

/// Strip currency formatting (`$` and thousands `,`) and parse the remainder
/// as a float.
fn parse_money(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Convert `price` from currency text to a float column in place. A cell
/// that is not numeric once the formatting is gone becomes missing.
pub fn parse_price(mut table: Table) -> Result<Table> {
    let cells = super::text_column(&table, "price")?;

    let mut degraded = 0usize;
    let parsed: Vec<Option<f64>> = cells
        .iter()
        .map(|opt| match opt {
            Some(raw) => {
                let value = parse_money(raw);
                if value.is_none() {
                    degraded += 1;
                    debug!(value = %raw, "unparseable price");
                }
                value
            }
            None => None,
        })
        .collect();
    if degraded > 0 {
        warn!(cells = degraded, "price values did not parse");
    }

    table.set_column("price", Column::Float(parsed))?;
    Ok(table)
}

/// Add `min_revenue`, the row-wise product `minimum_nights * price`. Either
/// operand missing makes the product missing.
pub fn derive_min_revenue(mut table: Table) -> Result<Table> {
    let nights = table
        .column("minimum_nights")
        .ok_or_else(|| anyhow!("no column `minimum_nights`"))?;
    let price = table
        .column("price")
        .ok_or_else(|| anyhow!("no column `price`"))?;
    if !nights.is_numeric() || !price.is_numeric() {
        return Err(anyhow!(
            "min_revenue needs numeric operands, got {:?} * {:?}",
            nights.column_type(),
            price.column_type()
        ));
    }

    let revenue: Vec<Option<f64>> = (0..table.row_count())
        .map(|row| match (nights.as_f64(row), price.as_f64(row)) {
            (Some(n), Some(p)) => Some(n * p),
            _ => None,
        })
        .collect();

    table.push_column("min_revenue", Column::Float(revenue))?;
    Ok(table)
}
