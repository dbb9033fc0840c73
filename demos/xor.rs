//! Trains the playground network on a dataset and prints the learning curve.
//!
//! ```text
//! RUST_LOG=nnexplorer=debug cargo run --example xor -- [config.json]
//! ```

use std::{env, error::Error};

use nnexplorer::{Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match env::args().nth(1) {
        Some(path) => SimulatorConfig::from_json_file(path)?,
        None => SimulatorConfig::default()
            .with_geometry(vec![2, 8, 1])
            .with_learning_rate(2.0)
            .with_total_epochs(3000)
            .with_epoch_interval_ms(1)
            .with_seed(42),
    };

    let mut sim = Simulator::new(config)?;
    let stats = sim.run_blocking()?;

    let report_every = (stats.len() / 10).max(1);
    for s in stats.iter().filter(|s| s.epoch % report_every == 0 || s.epoch == 1) {
        println!(
            "epoch {:>5}/{}  error {:.5}  accuracy {:.2}",
            s.epoch, s.total_epochs, s.error, s.accuracy
        );
    }

    println!("\n{} dataset, final outputs:", sim.dataset().kind());
    for point in sim.dataset().points().iter().take(8) {
        let output = sim.evaluate(&point.inputs())?[0];
        println!(
            "  ({:.2}, {:.2}) label {} -> {:.3}",
            point.x, point.y, point.label, output
        );
    }

    let grid = sim.decision_grid(8)?;
    println!("\ndecision map:");
    for row in (0..grid.resolution).rev() {
        let line: String = (0..grid.resolution)
            .map(|column| match grid.value_at(column, row) {
                Some(v) if v >= 0.5 => '#',
                Some(_) => '.',
                None => ' ',
            })
            .collect();
        println!("  {}", line);
    }
    Ok(())
}
