mod cli;
mod error;
mod plan;
mod prelude;
mod prices;
mod quantity;
mod report;
mod usage;

use clap::{Parser, crate_version};
use tracing::Level;

use crate::{cli::Args, prelude::*, prices::PriceTable, report::Ranking, usage::Usage};

fn main() -> Result {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();
    info!(version = crate_version!(), "starting…");

    let usage = Usage::load(&args.usage_file, args.format).context("failed to load the usage")?;
    info!(
        n_readings = usage.readings().len(),
        n_days = usage.n_days(),
        consumption = %usage.total_consumption(),
        "loaded usage",
    );

    let prices = PriceTable::load(&args.prices).context("failed to load the price table")?;
    info!(n_plans = prices.len(), "loaded prices");
    if prices.is_empty() {
        warn!(path = %args.prices.display(), "price table has no plans");
    }
    if let Some(current_plan) = &args.current_plan {
        prices.require(current_plan).context("invalid `--current-plan`")?;
    }

    let ranking = Ranking::try_compute(&prices, &usage).context("failed to price the plans")?;
    if let Some(cheapest) = ranking.entries().first() {
        info!(plan = %cheapest.name, cost = %cheapest.cost, "cheapest plan");
    }
    let baseline = args.current_plan.as_deref().and_then(|name| ranking.find(name));

    println!("Days: {:.2}", ranking.covered_days());
    println!("{}", ranking.table(baseline));
    println!("* = custom logic used");
    Ok(())
}
