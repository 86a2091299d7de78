// src/table/mod.rs
use std::fmt;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Rendering of a missing cell in textual output.
const NULL_CELL: &str = "null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    Float,
    Date,
}

/// A single column of cells. Every cell is either present in the
/// column's domain or missing; arithmetic and aggregation must handle the
/// missing case explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Text(_) => ColumnType::Text,
            Column::Int(_) => ColumnType::Int,
            Column::Float(_) => ColumnType::Float,
            Column::Date(_) => ColumnType::Date,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Int(_) | Column::Float(_))
    }

    /// Numeric view of one cell. Int cells widen to f64, Float cells pass
    /// through, other domains (and missing cells) yield None.
    pub fn as_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::Int(v) => v.get(row).copied().flatten().map(|n| n as f64),
            Column::Float(v) => v.get(row).copied().flatten(),
            _ => None,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Text(v) => v.get(row).map_or(true, Option::is_none),
            Column::Int(v) => v.get(row).map_or(true, Option::is_none),
            Column::Float(v) => v.get(row).map_or(true, Option::is_none),
            Column::Date(v) => v.get(row).map_or(true, Option::is_none),
        }
    }

    fn take_rows(&self, rows: &[usize]) -> Column {
        match self {
            Column::Text(v) => Column::Text(rows.iter().map(|&r| v[r].clone()).collect()),
            Column::Int(v) => Column::Int(rows.iter().map(|&r| v[r]).collect()),
            Column::Float(v) => Column::Float(rows.iter().map(|&r| v[r]).collect()),
            Column::Date(v) => Column::Date(rows.iter().map(|&r| v[r]).collect()),
        }
    }

    fn render_cell(&self, row: usize) -> String {
        match self {
            Column::Text(v) => v[row].clone().unwrap_or_else(|| NULL_CELL.into()),
            Column::Int(v) => v[row].map_or_else(|| NULL_CELL.into(), |n| n.to_string()),
            Column::Float(v) => v[row].map_or_else(|| NULL_CELL.into(), |x| x.to_string()),
            Column::Date(v) => v[row].map_or_else(|| NULL_CELL.into(), |d| d.to_string()),
        }
    }
}

/// An in-memory table: named columns of identical length. Column order is
/// insertion order, row order is source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new() -> Self {
        Table {
            names: Vec::new(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    pub fn from_columns<N: Into<String>>(columns: Vec<(N, Column)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Name/column pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Append a new column. The name must be fresh and the length must match
    /// the table; the first column fixes the table's row count.
    pub fn push_column<N: Into<String>>(&mut self, name: N, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| n == &name) {
            return Err(anyhow!("table already has a column `{}`", name));
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            return Err(anyhow!(
                "column `{}` has {} rows, table has {}",
                name,
                column.len(),
                self.row_count
            ));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replace an existing column in place. The replacement may change the
    /// column's domain but never its length.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<()> {
        if column.len() != self.row_count {
            return Err(anyhow!(
                "replacement for `{}` has {} rows, table has {}",
                name,
                column.len(),
                self.row_count
            ));
        }
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| anyhow!("no column `{}`", name))?;
        self.columns[idx] = column;
        Ok(())
    }

    /// Projection onto `names`, preserving the requested order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut out = Table::new();
        for &name in names {
            let column = self
                .column(name)
                .ok_or_else(|| anyhow!("no column `{}`", name))?;
            out.push_column(name, column.clone())?;
        }
        Ok(out)
    }

    /// First `n` rows (or fewer), original order.
    pub fn head(&self, n: usize) -> Table {
        let rows: Vec<usize> = (0..self.row_count.min(n)).collect();
        self.take_rows(&rows)
    }

    /// Row subset by boolean mask, original order.
    pub fn filter(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.row_count {
            return Err(anyhow!(
                "mask has {} entries, table has {} rows",
                mask.len(),
                self.row_count
            ));
        }
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(self.take_rows(&rows))
    }

    fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take_rows(rows)).collect(),
            row_count: rows.len(),
        }
    }
}

/// Fixed-width text rendering: header row plus one line per row, numeric
/// columns right-aligned, missing cells as `null`.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return Ok(());
        }

        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| (0..self.row_count).map(|r| c.render_cell(r)).collect())
            .collect();
        let widths: Vec<usize> = self
            .names
            .iter()
            .zip(&rendered)
            .map(|(name, cells)| cells.iter().map(String::len).fold(name.len(), usize::max))
            .collect();

        let mut line = String::new();
        let push_cell = |line: &mut String, idx: usize, cell: &str| {
            if idx > 0 {
                line.push_str("  ");
            }
            let w = widths[idx];
            if self.columns[idx].is_numeric() {
                line.push_str(&format!("{cell:>w$}"));
            } else {
                line.push_str(&format!("{cell:<w$}"));
            }
        };

        for (idx, name) in self.names.iter().enumerate() {
            push_cell(&mut line, idx, name);
        }
        write!(f, "{}", line.trim_end())?;

        for row in 0..self.row_count {
            line.clear();
            for (idx, cells) in rendered.iter().enumerate() {
                push_cell(&mut line, idx, &cells[row]);
            }
            write!(f, "\n{}", line.trim_end())?;
        }
        Ok(())
    }
}
