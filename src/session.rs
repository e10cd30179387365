//! Session state machine and the intent boundary the UI layer drives.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Scenario;
use crate::engine::{Engine, EngineSettings, TickSummary};
use crate::grid::Position;
use crate::world::{
    Inventory, SimulationTime, Task, Weapon, Weather, WeatherState, World, WorldSnapshot,
    HEALTH_MAX, STAMINA_MAX,
};

/// Session-level states. `Dead` is terminal until an explicit reset or a
/// successful load re-enters `Running`; the menu variants exist purely for
/// the external UI to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    MainMenu,
    Running,
    Paused,
    Dead,
}

/// UI intents. Each is a pure state transition, independent of rendering.
#[derive(Debug, Clone)]
pub enum Intent {
    Begin,
    TogglePause,
    SelectTask(Option<Task>),
    Craft(Weapon),
    Save,
    Load(Option<String>),
    Reset,
}

#[derive(Debug, Clone)]
pub enum IntentOutcome {
    None,
    Saved(SaveRecord),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("corrupt save data: {0}")]
    CorruptSave(#[source] serde_json::Error),
}

/// Everything the save/load collaborator persists. The environment is
/// deliberately absent: loading always rolls a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecord {
    pub position: Position,
    pub last_ate: u64,
    pub last_drank: u64,
    pub health: i32,
    pub stamina: i32,
    pub inventory: Inventory,
    pub weapon: Option<Weapon>,
    pub task: Option<Task>,
    pub tick: u64,
    pub day: u64,
    pub weather: Weather,
    pub saved_at: String,
}

impl SaveRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(data: &str) -> Result<Self, SessionError> {
        serde_json::from_str(data).map_err(SessionError::CorruptSave)
    }
}

pub struct Session {
    scenario: Scenario,
    engine: Engine,
    world: World,
    state: SessionState,
}

impl Session {
    pub fn new(scenario: Scenario, snapshot_dir: PathBuf) -> Self {
        let settings = EngineSettings {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            snapshot_interval_ticks: scenario.snapshot_interval_ticks,
            snapshot_dir,
        };
        let mut engine = Engine::standard(settings);
        let world = scenario.build_world(engine.rng_mut());
        Self {
            scenario,
            engine,
            world,
            state: SessionState::MainMenu,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access between ticks. The tick pipeline itself is the only
    /// writer while a tick is in progress.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(&self.scenario.name)
    }

    /// Advances one tick while the session is running; otherwise a no-op.
    pub fn tick(&mut self) -> Result<Option<TickSummary>> {
        if self.state != SessionState::Running {
            return Ok(None);
        }
        let summary = self.engine.step(&mut self.world)?;
        if summary.dead {
            info!(tick = summary.tick, day = summary.day, "survivor died");
            self.state = SessionState::Dead;
        }
        Ok(Some(summary))
    }

    pub fn apply(&mut self, intent: Intent) -> Result<IntentOutcome, SessionError> {
        match intent {
            Intent::Begin => {
                self.begin();
                Ok(IntentOutcome::None)
            }
            Intent::TogglePause => {
                self.toggle_pause();
                Ok(IntentOutcome::None)
            }
            Intent::SelectTask(task) => {
                self.select_task(task);
                Ok(IntentOutcome::None)
            }
            Intent::Craft(weapon) => {
                self.craft(weapon);
                Ok(IntentOutcome::None)
            }
            Intent::Save => Ok(IntentOutcome::Saved(self.save_record())),
            Intent::Load(payload) => {
                self.load(payload.as_deref())?;
                Ok(IntentOutcome::None)
            }
            Intent::Reset => {
                self.reset();
                Ok(IntentOutcome::None)
            }
        }
    }

    pub fn begin(&mut self) {
        if self.state == SessionState::MainMenu {
            self.state = SessionState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            other => other,
        };
    }

    pub fn select_task(&mut self, task: Option<Task>) {
        self.world.survivor.task = task;
    }

    /// Crafting with insufficient materials is a silent no-op.
    pub fn craft(&mut self, weapon: Weapon) {
        if !self.world.survivor.craft(weapon) {
            debug!(?weapon, "craft skipped, insufficient materials");
        }
    }

    pub fn save_record(&self) -> SaveRecord {
        let survivor = &self.world.survivor;
        SaveRecord {
            position: survivor.pos,
            last_ate: survivor.last_ate,
            last_drank: survivor.last_drank,
            health: survivor.health,
            stamina: survivor.stamina,
            inventory: survivor.inventory,
            weapon: survivor.weapon,
            task: survivor.task,
            tick: self.world.time.tick(),
            day: self.world.time.day(),
            weather: self.world.weather.condition,
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    /// `None` means no save exists and the session stays untouched. A
    /// payload that fails to decode also leaves the session untouched and
    /// surfaces [`SessionError::CorruptSave`].
    pub fn load(&mut self, payload: Option<&str>) -> Result<(), SessionError> {
        let Some(data) = payload else {
            return Ok(());
        };
        let record = SaveRecord::from_json(data)?;
        self.restore(&record);
        Ok(())
    }

    /// Rebuilds the session from a record. The environment is never
    /// persisted, so the registry and hostile set are rolled fresh from the
    /// scenario.
    pub fn restore(&mut self, record: &SaveRecord) {
        let mut world = self.scenario.build_world(self.engine.rng_mut());
        world.survivor.pos = record.position.wrapped(self.scenario.grid_size);
        world.survivor.health = record.health.clamp(0, HEALTH_MAX);
        world.survivor.stamina = record.stamina.clamp(0, STAMINA_MAX);
        world.survivor.last_ate = record.last_ate;
        world.survivor.last_drank = record.last_drank;
        world.survivor.inventory = record.inventory;
        world.survivor.weapon = record.weapon;
        world.survivor.task = record.task;
        world.time = SimulationTime::at(record.tick, record.day);
        world.weather = WeatherState::at(record.weather, record.tick);
        self.world = world;
        self.state = SessionState::Running;
    }

    /// Discards the world and starts over. Re-enters `Running` from any
    /// state, including `Dead`.
    pub fn reset(&mut self) {
        self.world = self.scenario.build_world(self.engine.rng_mut());
        self.state = SessionState::Running;
    }
}
