use anyhow::Result;

use crate::table::{Column, Table};

/// Strip leading/trailing whitespace from `name`, in place.
pub fn trim_name(mut table: Table) -> Result<Table> {
    let cells = super::text_column(&table, "name")?;
    let trimmed: Vec<Option<String>> = cells
        .iter()
        .map(|opt| opt.as_deref().map(|s| s.trim().to_string()))
        .collect();
    table.set_column("name", Column::Text(trimmed))?;
    Ok(table)
}

/// Add `name_lower`, the lowercase form of the (already trimmed) `name`.
pub fn derive_name_lower(mut table: Table) -> Result<Table> {
    let cells = super::text_column(&table, "name")?;
    let lowered: Vec<Option<String>> = cells
        .iter()
        .map(|opt| opt.as_deref().map(str::to_lowercase))
        .collect();
    table.push_column("name_lower", Column::Text(lowered))?;
    Ok(table)
}
