//! Networked market simulation with the default configuration
//!
//! Usage: `cargo run --example network_sim [config.json]`

use abm::infrastructure::{load_config, load_default_config};
use abm::{Simulation, StrategyKind};

fn main() -> abm::Result<()> {
    let _ = env_logger::try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };

    println!("=== Networked Market Simulation ===\n");
    println!("Topology:      {:?}", config.topology);
    println!("Traders:       {}", config.population.number_of_traders);
    println!("Time steps:    {}", config.time_steps);
    println!("Imitation:     {:?}", config.imitation);

    let mut sim = Simulation::new(config)?;
    println!(
        "Network:       {} nodes, {} edges",
        sim.network().node_count(),
        sim.network().edge_count()
    );

    let (value, trend) = sim.strategy_counts();
    println!(
        "Initial mix:   {} {}, {} {}\n",
        value,
        StrategyKind::ValueInvestor,
        trend,
        StrategyKind::TrendFollower
    );

    let metrics = sim.run();

    println!("=== Results ===");
    println!("Total ticks:     {}", metrics.total_ticks);
    println!("Final log-price: {:.4}", metrics.final_price);
    println!("Volatility:      {:.4}", metrics.volatility);
    match metrics.excess_kurtosis {
        Some(k) => println!("Excess kurtosis: {:.4}", k),
        None => println!("Excess kurtosis: n/a"),
    }
    println!("Max drawdown:    {:.2}%", metrics.max_drawdown * 100.0);
    println!("Strategy swaps:  {}", metrics.total_swaps);

    println!("\nFinal population:");
    for (kind, breakdown) in [
        (StrategyKind::ValueInvestor, metrics.value_investors),
        (StrategyKind::TrendFollower, metrics.trend_followers),
    ] {
        match breakdown.mean_wealth {
            Some(w) => println!("  {}: {} traders, mean wealth {:.6}", kind, breakdown.count, w),
            None => println!("  {}: none left", kind),
        }
    }

    Ok(())
}
