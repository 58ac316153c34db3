//! Headless Vivarium runner.
//!
//! ```text
//! vivarium [CONFIG.json] [FRAMES]
//! ```
//!
//! Runs the sandbox without a window and prints the final census as JSON.
//! Log verbosity follows `RUST_LOG`.

use anyhow::{Context, Result};
use tracing::{info, warn};
use vivarium_core::render::DrawList;
use vivarium_core::{ReactionRegistry, ResourceCatalog, SimConfig, Simulation};

const DEFAULT_FRAMES: u64 = 600;
const REPORT_EVERY: u64 = 60;

fn main() -> Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => SimConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw.parse::<u64>().with_context(|| format!("invalid frame count {raw:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let mut sim = Simulation::new(
        config,
        ReactionRegistry::with_defaults(),
        Box::new(ResourceCatalog::with_defaults()),
    )
    .context("building simulation")?;
    let spawned = sim.populate();
    info!(entities = spawned.len(), frames, "Starting Vivarium headless run");

    let mut births = 0;
    let mut refused = 0;
    for _ in 0..frames {
        let report = sim.step();
        births += report.births;
        refused += report.refused;
        if sim.frame() % REPORT_EVERY == 0 {
            let census = sim.arena().census();
            info!(
                frame = sim.frame(),
                organisms = census.organisms,
                food = census.food,
                contacts = report.dispatch.confirmed,
                index_depth = report.index.max_depth,
                "census"
            );
        }
    }

    let mut draw_list = DrawList::new();
    let drawn = sim.render(&mut draw_list);
    if sim.arena().is_empty() {
        warn!("arena emptied out before the run finished");
    }
    info!(frames = sim.frame(), births, refused, drawn, "Run complete");

    let census = serde_json::to_string_pretty(sim.arena().census()).context("serializing census")?;
    println!("{census}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
