//! The tick pipeline: systems run in a fixed order over one shared world.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::{
    rng::{RngManager, SystemRng},
    snapshot::SnapshotWriter,
    systems::{ClockSystem, HostileSystem, ResourceSystem, SurvivorSystem},
    world::{Weather, World, WorldSnapshot},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    /// The full pipeline in simulation order: clock, survivor decision,
    /// resource lifecycle, hostiles. The death check runs after all of them.
    pub fn standard(settings: EngineSettings) -> Self {
        EngineBuilder::new(settings)
            .with_system(ClockSystem::new())
            .with_system(SurvivorSystem::new())
            .with_system(ResourceSystem::new())
            .with_system(HostileSystem::new())
            .build()
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn rng_mut(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    /// One complete tick. Within it the survivor always resolves before the
    /// hostiles, and both before the death check.
    pub fn step(&mut self, world: &mut World) -> Result<TickSummary> {
        for system in &mut self.systems {
            let ctx = SystemContext {
                tick: world.time.tick(),
            };
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, world, &mut rng_stream)?;
        }
        let dead = world.death_due();
        let snapshot_path = self
            .snapshot_writer
            .maybe_write(world, &self.settings.scenario_name)?;
        Ok(TickSummary {
            tick: world.time.tick(),
            day: world.time.day(),
            weather: world.weather.condition,
            dead,
            snapshot_path,
        })
    }

    /// Runs up to `ticks` ticks, stopping early when the survivor dies.
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            let summary = self.step(world)?;
            if summary.dead {
                debug!(tick = summary.tick, "survivor died, stopping run");
                break;
            }
        }
        Ok(())
    }

    /// Like [`Engine::run`], but hands every completed tick's snapshot to
    /// `hook`. Observers never see a world mid-mutation.
    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        ticks: u64,
        mut hook: impl FnMut(WorldSnapshot),
    ) -> Result<()> {
        for _ in 0..ticks {
            let summary = self.step(world)?;
            hook(world.snapshot(&self.settings.scenario_name));
            if summary.dead {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub day: u64,
    pub weather: Weather,
    pub dead: bool,
    pub snapshot_path: Option<PathBuf>,
}

pub struct SystemContext {
    /// Tick value when the system starts. The clock system advances time, so
    /// every later system observes the advanced tick here.
    pub tick: u64,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
