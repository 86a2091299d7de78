use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::table::{Column, Table};

const DASH_DATE: &str = "%Y-%m-%d";
const SLASH_DATE: &str = "%Y/%m/%d";

/// Parse a review date in either supported layout.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DASH_DATE)
        .or_else(|_| NaiveDate::parse_from_str(s, SLASH_DATE))
        .ok()
}

/// Convert `last_review` from text to a date column in place. Values in
/// neither layout become missing; nothing here halts the run.
pub fn parse_review_date(mut table: Table) -> Result<Table> {
    let cells = super::text_column(&table, "last_review")?;

    let mut degraded = 0usize;
    let parsed: Vec<Option<NaiveDate>> = cells
        .iter()
        .map(|opt| match opt {
            Some(raw) => {
                let date = parse_date(raw);
                if date.is_none() {
                    degraded += 1;
                    debug!(value = %raw, "unparseable last_review");
                }
                date
            }
            None => None,
        })
        .collect();
    if degraded > 0 {
        warn!(cells = degraded, "last_review values did not parse");
    }

    table.set_column("last_review", Column::Date(parsed))?;
    Ok(table)
}

/// Add `year`, the calendar year of `last_review`. A missing review date
/// carries through as a missing year.
pub fn derive_year(mut table: Table) -> Result<Table> {
    let years: Vec<Option<i64>> = match table.column("last_review") {
        Some(Column::Date(cells)) => cells
            .iter()
            .map(|opt| opt.map(|d| i64::from(d.year())))
            .collect(),
        Some(other) => {
            return Err(anyhow!(
                "column `last_review` is {:?}, expected date",
                other.column_type()
            ))
        }
        None => return Err(anyhow!("no column `last_review`")),
    };

    table.push_column("year", Column::Int(years))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_layouts() {
        assert_eq!(
            parse_date("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            parse_date(" 2024/05/01 "),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("05/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
