//! Scenario configuration: grid shape, spawn densities, starting vitals.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

use crate::grid::{Position, ResourceRegistry, SpawnDensities};
use crate::rng::RngManager;
use crate::world::{HostileAgent, Survivor, World};

fn default_grid_size() -> i32 {
    100
}

fn default_snapshot_interval_ticks() -> u64 {
    30
}

fn default_hostiles() -> u32 {
    5
}

fn default_health() -> i32 {
    100
}

fn default_stamina() -> i32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_grid_size")]
    pub grid_size: i32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub spawn: SpawnDensities,
    #[serde(default = "default_hostiles")]
    pub hostiles: u32,
    #[serde(default)]
    pub survivor: SurvivorInit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurvivorInit {
    #[serde(default = "default_health")]
    pub health: i32,
    #[serde(default = "default_stamina")]
    pub stamina: i32,
}

impl Default for SurvivorInit {
    fn default() -> Self {
        Self {
            health: default_health(),
            stamina: default_stamina(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// The grid centre. The survivor starts here and no resource ever spawns
    /// here.
    pub fn origin(&self) -> Position {
        Position::new(self.grid_size / 2, self.grid_size / 2)
    }

    /// Rolls a fresh environment and survivor from the `worldgen` stream.
    /// Called at session start and again whenever the environment is
    /// regenerated (reset, load).
    pub fn build_world(&self, rng: &mut RngManager) -> World {
        let origin = self.origin();
        let mut stream = rng.stream("worldgen");
        let registry = ResourceRegistry::generate(self.grid_size, &self.spawn, origin, &mut stream);

        let mut hostiles = Vec::with_capacity(self.hostiles as usize);
        while hostiles.len() < self.hostiles as usize {
            let pos = Position::new(
                stream.gen_range(0..self.grid_size),
                stream.gen_range(0..self.grid_size),
            );
            if pos == origin {
                continue;
            }
            hostiles.push(HostileAgent::new(pos));
        }

        let survivor = Survivor::new(origin, self.survivor.health, self.survivor.stamina);
        World::new(survivor, hostiles, registry)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(2000)
    }

    /// Baseline scenario used by the test suites.
    pub fn meadow() -> Self {
        Self {
            name: "meadow".into(),
            description: None,
            seed: 7,
            grid_size: default_grid_size(),
            ticks: None,
            snapshot_interval_ticks: 0,
            spawn: SpawnDensities::default(),
            hostiles: default_hostiles(),
            survivor: SurvivorInit::default(),
        }
    }
}
