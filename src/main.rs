use anyhow::Result;
use bnbtally::{ingest, report, transform};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Listings export consumed by the run, relative to the working directory.
const LISTINGS_PATH: &str = "listings.csv";
/// Rows shown by the head views.
const HEAD_ROWS: usize = 5;
/// Nightly price ceiling for the budget view.
const BUDGET_PRICE: f64 = 1000.0;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load listings ────────────────────────────────────────────
    let table = ingest::load_table(LISTINGS_PATH)?;

    // ─── 3) run the column pipeline ──────────────────────────────────
    let table = transform::run(table)?;

    // ─── 4) report ───────────────────────────────────────────────────
    let revenue = table.select(&["minimum_nights", "price", "min_revenue"])?;
    println!("{}", revenue.head(HEAD_ROWS));

    println!("mean price: {}", report::mean(&table, "price")?);

    println!("{}", report::mean_by_group(&table, "room_type", "year")?);

    let budget = table.filter(&report::below(&table, "price", BUDGET_PRICE)?)?;
    println!("{}", budget.head(HEAD_ROWS));

    info!("all done");
    Ok(())
}
