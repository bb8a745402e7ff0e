use crate::state::RoomState;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Best-effort JSON mirror of the status snapshot.
///
/// Rewritten wholesale on every processed sensor event, using a
/// write-temp-then-rename so readers never see a partial file. The engine
/// never reads it back: the in-memory store is the source of truth and the
/// process starts empty after a restart.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file with the given snapshot.
    pub fn write(&self, snapshot: &BTreeMap<String, RoomState>) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .context("Failed to serialize state snapshot to JSON")?;

        let tmp_path = self.path.with_extension("tmp");

        {
            let mut file = File::create(&tmp_path)
                .context("Failed to create temporary state file")?;
            file.write_all(json.as_bytes())
                .context("Failed to write state snapshot")?;
            file.sync_all()
                .context("Failed to sync state file to disk")?;
        }

        fs::rename(&tmp_path, &self.path)
            .context("Failed to rename temporary state file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SwitchState;

    fn room_state(name: &str) -> RoomState {
        RoomState {
            name: name.to_string(),
            temp: 22.5,
            humidity: 45.0,
            lux: 250.0,
            co2: 800.0,
            occupancy: true,
            scheduled: true,
            lights: SwitchState::On,
            heating: SwitchState::Off,
            last_update: "10:15:00".to_string(),
        }
    }

    #[test]
    fn test_write_produces_status_shaped_json() {
        let dir = tempfile::tempdir().unwrap();
        let state_file = StateFile::new(dir.path().join("system_state.json"));

        let mut snapshot = BTreeMap::new();
        snapshot.insert("room_101".to_string(), room_state("Room 101"));
        state_file.write(&snapshot).unwrap();

        let contents = fs::read_to_string(state_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["room_101"]["name"], "Room 101");
        assert_eq!(value["room_101"]["occupancy"], "Yes");
        assert_eq!(value["room_101"]["scheduled"], "Class Active");
        assert_eq!(value["room_101"]["lights"], "ON");
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let state_file = StateFile::new(dir.path().join("system_state.json"));

        let mut snapshot = BTreeMap::new();
        snapshot.insert("room_a".to_string(), room_state("Room A"));
        snapshot.insert("room_b".to_string(), room_state("Room B"));
        state_file.write(&snapshot).unwrap();

        snapshot.remove("room_b");
        state_file.write(&snapshot).unwrap();

        let contents = fs::read_to_string(state_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(value.get("room_a").is_some());
        assert!(value.get("room_b").is_none());

        // No leftover temp file after a successful rename
        assert!(!state_file.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_write_to_unwritable_path_errors() {
        let state_file = StateFile::new("/nonexistent-dir/system_state.json");
        assert!(state_file.write(&BTreeMap::new()).is_err());
    }
}
