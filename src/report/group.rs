use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use crate::table::{Column, Table};

/// Grouped mean over the key pair `(text_key, int_key)`, in two explicit
/// phases:
///  1. partition row indices into a `BTreeMap` keyed by the pair, skipping
///     any row where either key is missing;
///  2. reduce every numeric non-key column to its mean within each group
///     (missing cells excluded, an all-missing group cell is NaN).
///
/// The result keeps the keys as ordinary leading columns, one row per
/// distinct pair, ascending by key (the map's iteration order).
pub fn mean_by_group(table: &Table, text_key: &str, int_key: &str) -> Result<Table> {
    let text_cells = match table.column(text_key) {
        Some(Column::Text(cells)) => cells,
        Some(other) => {
            return Err(anyhow!(
                "group key `{}` is {:?}, expected text",
                text_key,
                other.column_type()
            ))
        }
        None => return Err(anyhow!("no column `{}`", text_key)),
    };
    let int_cells = match table.column(int_key) {
        Some(Column::Int(cells)) => cells,
        Some(other) => {
            return Err(anyhow!(
                "group key `{}` is {:?}, expected int",
                int_key,
                other.column_type()
            ))
        }
        None => return Err(anyhow!("no column `{}`", int_key)),
    };

    let mut groups: BTreeMap<(String, i64), Vec<usize>> = BTreeMap::new();
    for row in 0..table.row_count() {
        let (Some(text), Some(year)) = (text_cells[row].as_ref(), int_cells[row]) else {
            continue;
        };
        groups.entry((text.clone(), year)).or_default().push(row);
    }

    let mut key_text = Vec::with_capacity(groups.len());
    let mut key_int = Vec::with_capacity(groups.len());
    for (text, year) in groups.keys() {
        key_text.push(Some(text.clone()));
        key_int.push(Some(*year));
    }

    let mut out = Table::new();
    out.push_column(text_key, Column::Text(key_text))?;
    out.push_column(int_key, Column::Int(key_int))?;

    for (name, column) in table.iter() {
        if name == text_key || name == int_key || !column.is_numeric() {
            continue;
        }
        let means: Vec<Option<f64>> = groups
            .values()
            .map(|rows| Some(super::mean_over(column, rows.iter().copied())))
            .collect();
        out.push_column(name, Column::Float(means))?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn reviewed_listings() -> Result<Table> {
        Table::from_columns(vec![
            (
                "room_type",
                Column::Text(vec![
                    Some("Private room".into()),
                    Some("Entire home/apt".into()),
                    Some("Private room".into()),
                    Some("Private room".into()),
                    Some("Entire home/apt".into()),
                ]),
            ),
            (
                "year",
                Column::Int(vec![Some(2019), Some(2019), Some(2019), Some(2020), None]),
            ),
            (
                "price",
                Column::Float(vec![
                    Some(100.0),
                    Some(80.0),
                    Some(50.0),
                    Some(30.0),
                    Some(999.0),
                ]),
            ),
            (
                "minimum_nights",
                Column::Int(vec![Some(2), Some(4), None, Some(1), Some(1)]),
            ),
        ])
    }

    #[test]
    fn one_row_per_distinct_key_pair_ascending() -> Result<()> {
        let grouped = mean_by_group(&reviewed_listings()?, "room_type", "year")?;

        // the missing-year row is dropped, leaving three distinct pairs
        assert_eq!(grouped.row_count(), 3);
        assert_eq!(
            grouped.column("room_type"),
            Some(&Column::Text(vec![
                Some("Entire home/apt".into()),
                Some("Private room".into()),
                Some("Private room".into()),
            ]))
        );
        assert_eq!(
            grouped.column("year"),
            Some(&Column::Int(vec![Some(2019), Some(2019), Some(2020)]))
        );
        Ok(())
    }

    #[test]
    fn group_cells_are_per_group_means() -> Result<()> {
        let grouped = mean_by_group(&reviewed_listings()?, "room_type", "year")?;

        assert_eq!(
            grouped.column("price"),
            Some(&Column::Float(vec![Some(80.0), Some(75.0), Some(30.0)]))
        );
        // the missing minimum_nights cell is excluded from its group's mean
        assert_eq!(
            grouped.column("minimum_nights"),
            Some(&Column::Float(vec![Some(4.0), Some(2.0), Some(1.0)]))
        );
        Ok(())
    }

    #[test]
    fn keys_lead_and_text_columns_are_dropped() -> Result<()> {
        let mut table = reviewed_listings()?;
        table.push_column(
            "name",
            Column::Text(vec![Some("a".into()), None, None, None, None]),
        )?;

        let grouped = mean_by_group(&table, "room_type", "year")?;
        assert_eq!(
            grouped.names(),
            &[
                "room_type".to_string(),
                "year".to_string(),
                "price".to_string(),
                "minimum_nights".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn all_missing_group_cell_is_nan() -> Result<()> {
        let table = Table::from_columns(vec![
            ("room_type", Column::Text(vec![Some("r".into())])),
            ("year", Column::Int(vec![Some(2021)])),
            ("price", Column::Float(vec![None])),
        ])?;

        let grouped = mean_by_group(&table, "room_type", "year")?;
        match grouped.column("price") {
            Some(Column::Float(cells)) => {
                assert!(cells[0].map(f64::is_nan).unwrap_or(false));
            }
            other => panic!("unexpected price column: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn rejects_wrongly_typed_keys() -> Result<()> {
        let table = reviewed_listings()?;
        assert!(mean_by_group(&table, "year", "year").is_err());
        assert!(mean_by_group(&table, "room_type", "price").is_err());
        assert!(mean_by_group(&table, "ghost", "year").is_err());
        Ok(())
    }
}
