//! Periodic world snapshots for out-of-band observers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::world::World;

/// Writes a JSON snapshot of the world every `interval_ticks` ticks. Writing
/// happens after a tick completes, never inside it.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(dir: &Path, interval_ticks: u64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            interval_ticks,
        }
    }

    /// Writes `tick_XXXXXX.json` when the tick lands on the interval. A zero
    /// interval disables writing entirely.
    pub fn maybe_write(&self, world: &World, scenario: &str) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 {
            return Ok(None);
        }
        let tick = world.time.tick();
        if tick % self.interval_ticks != 0 {
            return Ok(None);
        }

        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let json = serde_json::to_string_pretty(&world.snapshot(scenario))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
