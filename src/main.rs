//! # Dining Philosophers
//!
//! Runs one dinner and prints a status line after every meal.
//!
//! ```bash
//! # Defaults: 15 philosophers, 50 food each, in-memory forks
//! RUST_LOG=info cargo run
//!
//! # Settings from a TOML file (see `SimulationConfig`)
//! RUST_LOG=info cargo run -- table.toml
//! ```

use dining_philosophers::lifecycle::{setup_tracing, DiningSystem};
use dining_philosophers::model::SimulationConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "Loading configuration");
            SimulationConfig::load(&path).map_err(|e| e.to_string())?
        }
        None => SimulationConfig::default(),
    };

    let system = DiningSystem::start(&config).map_err(|e| e.to_string())?;
    let report = system.join().await;

    for faulted in report.faults() {
        if let Some(fault) = &faulted.fault {
            error!(philosopher = faulted.index, remaining = faulted.remaining, error = %fault, "Philosopher did not finish");
        }
    }
    if !report.all_done() {
        return Err(format!(
            "{} philosopher(s) left the table early",
            report.faults().count()
        ));
    }

    println!("All philosophers are done eating");
    Ok(())
}
