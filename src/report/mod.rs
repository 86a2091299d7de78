// src/report/mod.rs
mod group;

pub use group::mean_by_group;

use anyhow::{anyhow, Result};

use crate::table::{Column, Table};

/// Mean over the given rows of a numeric column, missing cells excluded.
/// No present value at all yields NaN.
fn mean_over<I>(column: &Column, rows: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        if let Some(v) = column.as_f64(row) {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Arithmetic mean of a named numeric column over the whole table.
pub fn mean(table: &Table, name: &str) -> Result<f64> {
    let column = table
        .column(name)
        .ok_or_else(|| anyhow!("no column `{}`", name))?;
    if !column.is_numeric() {
        return Err(anyhow!(
            "column `{}` is {:?}, cannot take a mean",
            name,
            column.column_type()
        ));
    }
    Ok(mean_over(column, 0..column.len()))
}

/// Boolean mask selecting rows whose `name` value is strictly below `limit`.
/// Missing cells never match.
pub fn below(table: &Table, name: &str, limit: f64) -> Result<Vec<bool>> {
    let column = table
        .column(name)
        .ok_or_else(|| anyhow!("no column `{}`", name))?;
    if !column.is_numeric() {
        return Err(anyhow!(
            "column `{}` is {:?}, cannot compare against {}",
            name,
            column.column_type(),
            limit
        ));
    }
    Ok((0..table.row_count())
        .map(|row| column.as_f64(row).map_or(false, |v| v < limit))
        .collect())
}
