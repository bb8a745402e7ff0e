use crate::catalog::Thresholds;
use crate::event::{RunStatus, SwitchState};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

mod channel;

pub use channel::{
    run_command_poller, status_report, AlertChannel, LogChannel, TelegramChannel,
};

/// CO2 alert severity; critical takes precedence when both thresholds are
/// crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Co2Severity {
    Warning,
    Critical,
}

/// Stateful change-detector and threshold-alert emitter.
///
/// Two independent alert families: actuator state-change alerts fire on
/// every distinct transition with no debounce, CO2 threshold alerts share a
/// single per-room debounce timestamp across both severities. That shared
/// timestamp means a CRITICAL can be suppressed by a recent WARNING for the
/// same room; the behavior is intentional and pinned by a test below.
pub struct NotificationEngine {
    channel: Arc<dyn AlertChannel>,
    co2_debounce: DashMap<String, Instant>,
    actuator_memory: DashMap<String, (SwitchState, RunStatus)>,
    debounce_window: Duration,
}

impl NotificationEngine {
    pub fn new(channel: Arc<dyn AlertChannel>, debounce_window: Duration) -> Self {
        Self {
            channel,
            co2_debounce: DashMap::new(),
            actuator_memory: DashMap::new(),
            debounce_window,
        }
    }

    /// Compare an observed actuator state against the remembered one and
    /// alert on any transition. Memory is updated unconditionally.
    pub fn observe_actuator(
        &self,
        room_id: &str,
        room_name: &str,
        lights: SwitchState,
        status: RunStatus,
    ) {
        let changed = self
            .actuator_memory
            .get(room_id)
            .map(|prev| *prev != (lights, status))
            .unwrap_or(true);

        if changed {
            let occupancy_text = match status {
                RunStatus::Active => "Occupied (Class Active)",
                RunStatus::EnergySave => "No Occupancy (Empty)",
            };

            self.channel.notify(format!(
                "State update: {}\nStatus: {}\nLights: {}",
                room_name, occupancy_text, lights
            ));
        }

        self.actuator_memory
            .insert(room_id.to_string(), (lights, status));
    }

    /// Check a CO2 reading against the room's thresholds and alert at most
    /// once per debounce window. Only the firing alert restarts the window.
    pub fn observe_co2(&self, room_id: &str, room_name: &str, co2: f64, thresholds: &Thresholds) {
        let severity = if co2 > thresholds.co2_critical {
            Co2Severity::Critical
        } else if co2 > thresholds.co2_warning {
            Co2Severity::Warning
        } else {
            return;
        };

        let now = Instant::now();
        // One timestamp per room, shared across both severities
        match self.co2_debounce.entry(room_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) <= self.debounce_window {
                    debug!(room_id = %room_id, "CO2 alert suppressed by debounce window");
                    return;
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        let message = match severity {
            Co2Severity::Critical => {
                format!("CRITICAL: High CO2 ({:.0} ppm) in {}!", co2, room_name)
            }
            Co2Severity::Warning => {
                format!("WARNING: Elevated CO2 ({:.0} ppm) in {}.", co2, room_name)
            }
        };

        self.channel.notify(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingChannel {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingChannel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl AlertChannel for RecordingChannel {
        fn notify(&self, message: String) {
            self.messages.lock().unwrap().push(message);
        }
    }

    fn engine(
        channel: Arc<RecordingChannel>,
        debounce_window: Duration,
    ) -> NotificationEngine {
        NotificationEngine::new(channel, debounce_window)
    }

    #[test]
    fn test_first_actuator_observation_alerts() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_actuator("room_101", "Room 101", SwitchState::On, RunStatus::Active);

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Room 101"));
        assert!(messages[0].contains("Occupied (Class Active)"));
        assert!(messages[0].contains("Lights: ON"));
    }

    #[test]
    fn test_repeated_actuator_state_alerts_once() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_actuator("room_101", "Room 101", SwitchState::On, RunStatus::Active);
        engine.observe_actuator("room_101", "Room 101", SwitchState::On, RunStatus::Active);

        assert_eq!(channel.messages().len(), 1);
    }

    #[test]
    fn test_each_distinct_transition_alerts() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_actuator("room_101", "Room 101", SwitchState::On, RunStatus::Active);
        engine.observe_actuator(
            "room_101",
            "Room 101",
            SwitchState::Off,
            RunStatus::EnergySave,
        );
        engine.observe_actuator("room_101", "Room 101", SwitchState::On, RunStatus::Active);

        let messages = channel.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].contains("No Occupancy (Empty)"));
        assert!(messages[1].contains("Lights: OFF"));
    }

    #[test]
    fn test_co2_below_warning_is_silent() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_co2("room_101", "Room 101", 800.0, &Thresholds::default());

        assert!(channel.messages().is_empty());
    }

    #[test]
    fn test_co2_critical_takes_precedence() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_co2("room_101", "Room 101", 1600.0, &Thresholds::default());

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("CRITICAL"));
        assert!(messages[0].contains("1600 ppm"));
    }

    #[test]
    fn test_co2_warning_between_thresholds() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_co2("room_101", "Room 101", 1100.0, &Thresholds::default());

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("WARNING"));
    }

    #[test]
    fn test_followup_alert_suppressed_inside_window() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        // 1600 fires CRITICAL; 1100 shortly after is swallowed by the window
        engine.observe_co2("room_101", "Room 101", 1600.0, &Thresholds::default());
        engine.observe_co2("room_101", "Room 101", 1100.0, &Thresholds::default());

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("CRITICAL"));
    }

    #[test]
    fn test_critical_suppressed_inside_window_after_warning() {
        // The debounce timestamp is shared across severities, so a WARNING
        // can silence a CRITICAL that follows within the window.
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_co2("room_101", "Room 101", 1100.0, &Thresholds::default());
        engine.observe_co2("room_101", "Room 101", 1600.0, &Thresholds::default());

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("WARNING"));
    }

    #[test]
    fn test_co2_alert_fires_again_after_window() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_millis(30));

        engine.observe_co2("room_101", "Room 101", 1100.0, &Thresholds::default());
        std::thread::sleep(Duration::from_millis(50));
        engine.observe_co2("room_101", "Room 101", 1100.0, &Thresholds::default());

        assert_eq!(channel.messages().len(), 2);
    }

    #[test]
    fn test_co2_debounce_is_per_room() {
        let channel = RecordingChannel::new();
        let engine = engine(channel.clone(), Duration::from_secs(300));

        engine.observe_co2("room_a", "Room A", 1600.0, &Thresholds::default());
        engine.observe_co2("room_b", "Room B", 1600.0, &Thresholds::default());

        assert_eq!(channel.messages().len(), 2);
    }
}
