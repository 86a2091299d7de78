// src/ingest/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::table::{Column, Table};

/// Raw CSV contents: the header row plus every record as strings, in file
/// order. Typing happens afterwards, against this.
#[derive(Debug)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Rows sampled per column when inferring its type.
const SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Int,
    Float,
    Text,
}

/// Read a comma-delimited file with a header row into a [`RawTable`].
/// A record whose field count differs from the header is an error.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Present cell text, raw. An empty cell is missing in every column domain.
fn cell<'a>(row: &'a [String], idx: usize) -> Option<&'a str> {
    match row.get(idx) {
        Some(s) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn infer_cell(cell: &str) -> Inferred {
    if cell.parse::<i64>().is_ok() {
        Inferred::Int
    } else if cell.parse::<f64>().is_ok() {
        Inferred::Float
    } else {
        Inferred::Text
    }
}

/// Sample up to [`SAMPLE_LIMIT`] rows of one column:
///  - Ignore empty cells
///  - The first non-empty sample proposes a type
///  - An Int/Float mix demotes to Float, anything mixed with Text is Text
///  - No samples at all defaults to Text
///
/// Dates stay Text here; converting `last_review` is the pipeline's job.
fn infer_column(rows: &[Vec<String>], idx: usize, name: &str) -> Inferred {
    let mut inferred: Option<Inferred> = None;

    for row in rows.iter().take(SAMPLE_LIMIT) {
        let value = match cell(row, idx).map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };
        let ty = infer_cell(value);
        inferred = Some(match (inferred, ty) {
            (None, ty) => ty,
            (Some(prev), ty) if prev == ty => prev,
            (Some(Inferred::Int), Inferred::Float) | (Some(Inferred::Float), Inferred::Int) => {
                Inferred::Float
            }
            (Some(prev), ty) => {
                debug!(column = name, ?prev, now = ?ty, "conflicting samples, demoting to text");
                return Inferred::Text;
            }
        });
    }

    inferred.unwrap_or(Inferred::Text)
}

/// Build one typed column. A cell that defeats the inferred type becomes
/// missing, never an error.
fn build_column(rows: &[Vec<String>], idx: usize, name: &str) -> Column {
    match infer_column(rows, idx, name) {
        Inferred::Int => Column::Int(
            rows.iter()
                .map(|row| cell(row, idx).and_then(|s| s.trim().parse().ok()))
                .collect(),
        ),
        Inferred::Float => Column::Float(
            rows.iter()
                .map(|row| cell(row, idx).and_then(|s| s.trim().parse().ok()))
                .collect(),
        ),
        Inferred::Text => Column::Text(
            rows.iter()
                .map(|row| cell(row, idx).map(str::to_string))
                .collect(),
        ),
    }
}

/// Turn raw CSV contents into a typed [`Table`], column by column.
pub fn into_table(raw: RawTable) -> Result<Table> {
    let mut table = Table::new();
    for (idx, name) in raw.headers.iter().enumerate() {
        table.push_column(name.clone(), build_column(&raw.rows, idx, name))?;
    }
    Ok(table)
}

/// Load the listings file into a typed table. Any failure here is fatal to
/// the run; nothing downstream recovers from a bad source.
#[instrument(level = "info", skip(path), fields(file = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let raw = read_csv(&path)?;
    info!(rows = raw.rows.len(), columns = raw.headers.len(), "read csv");
    into_table(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnType;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,bnbtally::ingest=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_fixture(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn loads_typed_columns() -> Result<()> {
        init_test_logging();
        let tmp = write_fixture(concat!(
            "name,last_review,price,minimum_nights,room_type\n",
            "  Loft ,2024-05-01,$100,2,Entire home/apt\n",
            "Studio,2024-06-11,\"$1,250\",4,Private room\n",
        ))?;

        let table = load_table(tmp.path())?;
        assert_eq!(table.row_count(), 2);
        // price keeps its `$`, so it must come through as text for the
        // pipeline to clean up; minimum_nights is integral.
        assert_eq!(
            table.column("price").unwrap().column_type(),
            ColumnType::Text
        );
        assert_eq!(
            table.column("last_review").unwrap().column_type(),
            ColumnType::Text
        );
        assert_eq!(
            table.column("minimum_nights").unwrap(),
            &Column::Int(vec![Some(2), Some(4)])
        );
        // leading/trailing whitespace survives ingestion untouched
        assert_eq!(
            table.column("name").unwrap(),
            &Column::Text(vec![Some("  Loft ".into()), Some("Studio".into())])
        );
        Ok(())
    }

    #[test]
    fn empty_cells_are_missing_in_every_domain() -> Result<()> {
        let tmp = write_fixture("name,minimum_nights\n,3\nStudio,\n")?;
        let table = load_table(tmp.path())?;
        assert_eq!(
            table.column("name").unwrap(),
            &Column::Text(vec![None, Some("Studio".into())])
        );
        assert_eq!(
            table.column("minimum_nights").unwrap(),
            &Column::Int(vec![Some(3), None])
        );
        Ok(())
    }

    #[test]
    fn int_float_mix_demotes_to_float() -> Result<()> {
        let tmp = write_fixture("v\n1\n2.5\n3\n")?;
        let table = load_table(tmp.path())?;
        assert_eq!(
            table.column("v").unwrap(),
            &Column::Float(vec![Some(1.0), Some(2.5), Some(3.0)])
        );
        Ok(())
    }

    #[test]
    fn conflicting_samples_demote_to_text() -> Result<()> {
        let tmp = write_fixture("v\n1\nabc\n2\n")?;
        let table = load_table(tmp.path())?;
        assert_eq!(
            table.column("v").unwrap(),
            &Column::Text(vec![Some("1".into()), Some("abc".into()), Some("2".into())])
        );
        Ok(())
    }

    #[test]
    fn cell_outside_sample_window_degrades_to_missing() -> Result<()> {
        let mut content = String::from("v\n");
        for i in 0..SAMPLE_LIMIT {
            content.push_str(&format!("{i}\n"));
        }
        content.push_str("n/a\n");
        let tmp = write_fixture(&content)?;

        let table = load_table(tmp.path())?;
        let mut expected: Vec<Option<i64>> = (0..SAMPLE_LIMIT as i64).map(Some).collect();
        expected.push(None);
        assert_eq!(table.column("v").unwrap(), &Column::Int(expected));
        Ok(())
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(load_table("no-such-listings.csv").is_err());
    }

    #[test]
    fn ragged_record_is_fatal() -> Result<()> {
        let tmp = write_fixture("a,b\n1\n")?;
        assert!(load_table(tmp.path()).is_err());
        Ok(())
    }
}
