//! Lumen benchmark harness.
//!
//! Renders the letter room and prints the accumulated scalar.

use anyhow::{Context, Result};
use clap::Parser;
use lumen_renderer::{render, RenderConfig};
use serde::Serialize;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "lumen_bench")]
#[command(version)]
#[command(about = "Time the SDF path tracer and print its accumulated scalar", long_about = None)]
struct Cli {
    /// Image width in pixels
    #[arg(long, default_value_t = 90)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 60)]
    height: u32,

    /// Samples per pixel
    #[arg(short, long, default_value_t = 4)]
    samples: u32,

    /// Number of timed renders
    #[arg(short, long, default_value_t = 1)]
    iterations: u32,

    /// Print a JSON report instead of the bare scalar
    #[arg(long)]
    json: bool,
}

/// Machine-readable benchmark result.
#[derive(Serialize, Debug)]
struct Report {
    #[serde(flatten)]
    config: RenderConfig,
    iterations: u32,
    result: f32,
    elapsed_ms: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = RenderConfig::new(cli.width, cli.height, cli.samples)
        .context("Invalid render configuration")?;
    anyhow::ensure!(cli.iterations > 0, "iterations must be at least 1");

    log::info!(
        "Rendering {}x{} @ {} spp, {} iteration(s)",
        config.width,
        config.height,
        config.samples_per_pixel,
        cli.iterations
    );

    let start = Instant::now();
    let mut result = 0.0;
    for iteration in 0..cli.iterations {
        result = render(config.width, config.height, config.samples_per_pixel);
        log::debug!("Iteration {} -> {}", iteration, result);
    }
    let elapsed = start.elapsed();

    log::info!("Rendered in {:?}", elapsed);

    if cli.json {
        let report = Report {
            config,
            iterations: cli.iterations,
            result,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("{:.6}", result);
    }

    Ok(())
}
