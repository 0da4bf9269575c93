use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use rakeback_settlement::batch::SettlementRunner;
use rakeback_settlement::config::Config;
use rakeback_settlement::scenario::Scenario;
use rakeback_settlement::store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // rakeback <scenario.json> [--json]
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .context("usage: rakeback <scenario.json> [--json]")?;
    let as_json = args.iter().skip(2).any(|a| a == "--json");

    let scenario = Scenario::from_file(path)?;
    let store = Arc::new(if cfg.allow_coverage_gaps {
        InMemoryStore::allowing_gaps()
    } else {
        InMemoryStore::new()
    });
    scenario.load_into(&store).await?;
    info!(
        "Loaded {} clubs, {} memberships, {} rule tables",
        scenario.clubs.len(),
        scenario.memberships.len(),
        scenario.rule_tables.len()
    );

    let symbol = cfg.currency_symbol.clone();
    let default_tz = cfg.timezone();
    let runner = SettlementRunner::new(cfg.shared(), store.clone(), store.clone(), store.clone());

    for week in &scenario.weeks {
        let tz = scenario.club_timezone(&week.club_id, default_tz);
        let start = week.resolve_week_start(tz);
        let report = runner
            .settle_week(&week.club_id, start, week.entries.clone())
            .await
            .with_context(|| format!("settling club {} week {}", week.club_id, start))?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.print_summary(&symbol);
        }
    }

    Ok(())
}
