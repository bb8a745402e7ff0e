use crate::config::AlertConfig;
use crate::outbound::{OutboundJob, OutboundQueue};
use crate::state::{RoomState, StateStore};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Abstract alert sink.
///
/// `notify` must not block message processing: implementations hand the
/// message to the outbound queue (or log it) and return immediately.
/// Delivery failures are logged and dropped, never retried.
pub trait AlertChannel: Send + Sync {
    fn notify(&self, message: String);
}

/// Telegram-compatible chat channel.
pub struct TelegramChannel {
    queue: OutboundQueue,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramChannel {
    pub fn new(queue: OutboundQueue, config: &AlertConfig) -> Self {
        Self {
            queue,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

impl AlertChannel for TelegramChannel {
    fn notify(&self, message: String) {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": message,
        });

        self.queue.submit(OutboundJob::PostJson {
            url: self.send_url(),
            body,
            label: "alert",
        });
    }
}

/// Fallback sink used when no bot token is configured: alerts land in the
/// log instead of a chat.
pub struct LogChannel;

impl AlertChannel for LogChannel {
    fn notify(&self, message: String) {
        info!(%message, "Alert (no channel configured)");
    }
}

// ── Operator command polling ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    result: Vec<ChatUpdate>,
}

#[derive(Debug, Deserialize)]
struct ChatUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<InboundMessage>,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(default)]
    text: Option<String>,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Long-poll the chat API for operator commands.
///
/// Only `/status` from the configured chat is recognized; it answers with a
/// report built from the live state store. Poll failures back off and keep
/// going; this loop runs for the process lifetime.
pub async fn run_command_poller(
    config: AlertConfig,
    store: Arc<StateStore>,
    channel: Arc<dyn AlertChannel>,
) {
    info!("Operator command poller started");

    let http = reqwest::Client::new();
    let api_base = config.api_base.trim_end_matches('/').to_string();
    let mut offset: i64 = 0;

    loop {
        let url = format!(
            "{}/bot{}/getUpdates?offset={}&timeout=10",
            api_base, config.bot_token, offset
        );

        let updates = match http
            .get(&url)
            .timeout(Duration::from_secs(15))
            .send()
            .await
        {
            Ok(response) => match response.json::<UpdatesResponse>().await {
                Ok(updates) => updates.result,
                Err(e) => {
                    warn!(error = %e, "Failed to parse command poll response");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            },
            Err(e) => {
                warn!(error = %e, "Command poll request failed");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            if message.chat.id.to_string() != config.chat_id {
                continue;
            }

            let text = message.text.unwrap_or_default();
            if text.trim().eq_ignore_ascii_case("/status") {
                info!("Operator requested status report");
                channel.notify(status_report(&store.snapshot()));
            }
        }
    }
}

/// Format the status snapshot as a chat report, one line per room.
pub fn status_report(snapshot: &BTreeMap<String, RoomState>) -> String {
    if snapshot.is_empty() {
        return "System is running, but no rooms have reported yet.".to_string();
    }

    let mut report = String::from("Campus status report");
    for state in snapshot.values() {
        let occupancy = if state.occupancy { "Yes" } else { "No" };
        let _ = write!(
            report,
            "\n{}: Occupied: {} | Lights: {} | Heating: {} | CO2: {:.0} ppm",
            state.name, occupancy, state.lights, state.heating, state.co2
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SwitchState;

    fn room_state(name: &str, occupied: bool, lights: SwitchState) -> RoomState {
        RoomState {
            name: name.to_string(),
            temp: 22.0,
            humidity: 45.0,
            lux: 300.0,
            co2: 750.0,
            occupancy: occupied,
            scheduled: occupied,
            lights,
            heating: SwitchState::Off,
            last_update: "10:15:00".to_string(),
        }
    }

    #[test]
    fn test_status_report_lists_every_room() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            "room_a".to_string(),
            room_state("Room A", true, SwitchState::On),
        );
        snapshot.insert(
            "room_b".to_string(),
            room_state("Room B", false, SwitchState::Off),
        );

        let report = status_report(&snapshot);
        assert!(report.starts_with("Campus status report"));
        assert!(report.contains("Room A: Occupied: Yes | Lights: ON"));
        assert!(report.contains("Room B: Occupied: No | Lights: OFF"));
        assert!(report.contains("750 ppm"));
    }

    #[test]
    fn test_status_report_with_no_rooms() {
        let report = status_report(&BTreeMap::new());
        assert!(report.contains("no rooms have reported"));
    }

    #[test]
    fn test_poll_response_decodes_sparse_updates() {
        // getUpdates entries without a message (edits, joins) must not break
        // the decode
        let payload = serde_json::json!({
            "ok": true,
            "result": [
                { "update_id": 7 },
                {
                    "update_id": 8,
                    "message": { "text": "/status", "chat": { "id": 42 } }
                }
            ]
        });

        let updates: UpdatesResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(updates.result.len(), 2);
        assert!(updates.result[0].message.is_none());
        assert_eq!(
            updates.result[1].message.as_ref().unwrap().text.as_deref(),
            Some("/status")
        );
        assert_eq!(updates.result[1].message.as_ref().unwrap().chat.id, 42);
    }
}
