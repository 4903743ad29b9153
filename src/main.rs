//! Reliquary - first-person artifact puzzle game
//!
//! Headless driver: loads settings and the item catalog, builds the demo
//! room and replays a scripted walkthrough through the interaction core.
//!
//! Usage: `reliquary [catalog.toml] [core.toml]`. The bundled catalog is
//! used when no path is given; a core config file replaces the `[core]`
//! section of the saved settings.

mod demo;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use reliquary_core::TickClock;
use reliquary_game::{CoreConfig, InputHandler, ItemCatalog};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use demo::DemoRoom;
use settings::GameSettings;

const BUNDLED_CATALOG: &str = include_str!("../assets/items.toml");

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    info!("Reliquary v{}", env!("CARGO_PKG_VERSION"));

    let settings = GameSettings::load();
    if !GameSettings::exists() {
        // Write the defaults out so they can be edited
        if let Err(e) = settings.save() {
            warn!("Failed to save default settings: {}", e);
        }
    }

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let catalog = match args.next() {
        Some(path) => ItemCatalog::load(&path)
            .with_context(|| format!("failed to load item catalog {:?}", path))?,
        None => ItemCatalog::from_toml_str(BUNDLED_CATALOG)
            .context("bundled item catalog is invalid")?,
    };
    info!("{} items in catalog", catalog.len());

    let core = match args.next() {
        Some(path) => CoreConfig::load(&path)
            .with_context(|| format!("failed to load core config {:?}", path))?,
        None => settings.core.clone(),
    };

    let mut clock =
        TickClock::new(core.tick.clone()).context("invalid tick configuration")?;
    info!("Fixed tick of {:.4}s", clock.dt());

    let mut handler = InputHandler::new();
    handler.mouse_sensitivity = settings.controls.mouse_sensitivity;
    handler.invert_y = settings.controls.invert_y;

    let mut room = DemoRoom::build(&catalog, core)?;
    let summary = room.run(&demo::walkthrough(), &mut handler, &mut clock);

    info!(
        "Walkthrough finished after {} ticks: {} puzzle(s) solved, pedestal stage {}",
        summary.ticks, summary.puzzles_completed, summary.pedestal_stage
    );
    info!("Inventory: {}", summary.inventory.join(", "));
    anyhow::ensure!(
        summary.puzzles_completed > 0,
        "walkthrough did not solve the altar"
    );
    Ok(())
}
