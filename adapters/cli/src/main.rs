#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a scripted auto-summon session.

mod script;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use auto_summon_engine::EngineConfig;
use auto_summon_persistence::JsonFileStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

/// Replays a session script against a simulated game and saves the loadout.
#[derive(Debug, Parser)]
#[command(name = "auto-summon", version, about)]
struct CliArgs {
    /// Session script describing items, capacities and actions.
    script: PathBuf,
    /// Directory holding saved loadouts.
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,
    /// Player whose loadout is loaded before and saved after the session.
    #[arg(long, default_value = "Player")]
    player: String,
    /// Optional engine configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Entry point for the auto-summon command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_config(args.config.as_deref())?;
    let script = Script::load(&args.script)?;
    let store = JsonFileStore::new(&args.save_dir);

    let report = session::run(&script, config, &store, &args.player)?;
    for line in &report.lines {
        println!("{line}");
    }
    println!(
        "{} ticks, {} events, saved to {}",
        report.ticks,
        report.events,
        store.dir().display()
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read engine config at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse engine config at {}", path.display()))
}
