mod cli;

use anyhow::Result;
use clap::{Parser, crate_version};
use holiday_planner::{MicroLpSolver, Outcome, Planner, tables::build_plan_table};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!(version = crate_version!(), "starting…");

    let settings = Args::parse().load_settings()?;
    if settings.public_holidays.is_empty() {
        warn!("no public holidays configured");
    }
    let planner = Planner::builder()
        .config(&settings.planner)
        .public_holidays(&settings.public_holidays)
        .build();

    let outcome = planner.plan(&MicroLpSolver)?;
    let status = outcome.status();
    let plan = match outcome {
        Outcome::TimeLimit { incumbent: Some(plan) } => {
            warn!("the time limit is reached, showing the best plan found so far");
            plan
        }
        outcome => outcome.into_optimal()?,
    };
    info!(%status, n_periods = plan.periods.len(), "planned");
    println!("{}", build_plan_table(&plan));

    info!(n_days_off = plan.days_off().count(), "done!");
    Ok(())
}
