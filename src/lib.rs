//! Deterministic grid survival simulation engine.
//!
//! One controllable survivor on a toroidal grid satisfies hunger, thirst,
//! and stamina from depletable environmental resources while hostile agents
//! pursue it. Everything advances through a synchronous per-tick pipeline,
//! fully deterministic per scenario seed.

pub mod config;
pub mod engine;
pub mod grid;
pub mod needs;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod web;
pub mod world;

pub use config::{Scenario, ScenarioLoader};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use session::{Intent, IntentOutcome, SaveRecord, Session, SessionError, SessionState};
pub use world::{World, WorldSnapshot};
