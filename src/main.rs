use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stranded::{
    config::ScenarioLoader,
    engine::{Engine, EngineSettings},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Grid survival simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/meadow.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the observer API instead of running headless
    #[arg(long)]
    serve: bool,

    /// Observer API host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Observer API port
    #[arg(long, default_value_t = 4020)]
    port: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    if cli.serve {
        let config = WebServerConfig {
            scenario,
            ticks,
            snapshot_interval,
            snapshot_dir,
            host: cli.host,
            port: cli.port,
        };
        return tokio::runtime::Runtime::new()?.block_on(web::run(config));
    }

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };
    let mut engine = Engine::standard(settings);
    let mut world = scenario.build_world(engine.rng_mut());
    engine.run(&mut world, ticks)?;

    info!(
        scenario = %scenario.name,
        tick = world.time.tick(),
        day = world.time.day(),
        alive = !world.death_due(),
        hostiles = world.hostiles.len(),
        wood = world.survivor.inventory.wood,
        stone = world.survivor.inventory.stone,
        berries = world.survivor.inventory.berries,
        "run finished"
    );
    Ok(())
}
