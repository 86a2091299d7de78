// src/transform/mod.rs
mod dates;
mod numeric;
mod text;

pub use dates::{derive_year, parse_review_date};
pub use numeric::{derive_min_revenue, parse_price};
pub use text::{derive_name_lower, trim_name};

use anyhow::{anyhow, Result};
use tracing::info;

use crate::table::{Column, Table};

/// Apply the six column steps in their fixed order. Later steps read columns
/// earlier steps produced, so the order is load-bearing.
pub fn run(table: Table) -> Result<Table> {
    let table = parse_review_date(table)?;
    let table = derive_year(table)?;
    let table = trim_name(table)?;
    let table = derive_name_lower(table)?;
    let table = parse_price(table)?;
    let table = derive_min_revenue(table)?;
    info!(
        rows = table.row_count(),
        columns = table.names().len(),
        "pipeline complete"
    );
    Ok(table)
}

/// Fetch a text column or fail; the steps that rewrite a column expect it in
/// its pre-step domain, and running them against anything else is a bug in
/// the caller, not bad data.
fn text_column<'a>(table: &'a Table, name: &str) -> Result<&'a [Option<String>]> {
    match table.column(name) {
        Some(Column::Text(cells)) => Ok(cells),
        Some(other) => Err(anyhow!(
            "column `{}` is {:?}, expected text",
            name,
            other.column_type()
        )),
        None => Err(anyhow!("no column `{}`", name)),
    }
}
