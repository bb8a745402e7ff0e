use crate::state::RoomState;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Concurrent per-room state store behind the status query.
///
/// One entry per known room, created on the first reading and fully
/// replaced on every subsequent one. Entries live for the process lifetime;
/// a room that stops sending keeps its last snapshot (known limitation, the
/// dashboard shows the stale `last_update`). Per-room reads and writes are
/// atomic; cross-room consistency is not guaranteed and not needed.
pub struct StateStore {
    rooms: DashMap<String, RoomState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Replace a room's entry wholesale with a complete merged state.
    pub fn upsert(&self, room_id: &str, state: RoomState) {
        self.rooms.insert(room_id.to_string(), state);
    }

    /// Latest state for a single room.
    pub fn get(&self, room_id: &str) -> Option<RoomState> {
        self.rooms.get(room_id).map(|entry| entry.clone())
    }

    /// Copy-on-read view of all rooms, sorted by room id so the state file
    /// and status report have a stable order.
    pub fn snapshot(&self) -> BTreeMap<String, RoomState> {
        self.rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
