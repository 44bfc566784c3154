//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{MonitorEvent, Topic};
use crate::service::MonitorService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events on subscribed topics from the [`broadcast::Receiver`].
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<MonitorEvent>,
    service: Arc<MonitorService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(monitor_event) => {
                        if subs.matches(monitor_event.topic()) {
                            let msg = WsMessage::event(
                                service.clock().now(),
                                serde_json::to_value(&monitor_event).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Splits raw topic names into known topics and the wildcard flag.
/// Unknown names are returned separately so the client can be told.
fn parse_topics(raw: &[String]) -> (Vec<Topic>, bool, Vec<String>) {
    let mut topics = Vec::new();
    let mut wildcard = false;
    let mut unknown = Vec::new();
    for name in raw {
        if name == "*" {
            wildcard = true;
        } else {
            match name.parse::<Topic>() {
                Ok(topic) => topics.push(topic),
                Err(_) => unknown.push(name.clone()),
            }
        }
    }
    (topics, wildcard, unknown)
}

fn topic_names(topics: &[Topic]) -> Vec<&'static str> {
    topics.iter().map(Topic::as_str).collect()
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    service: &MonitorService,
) -> Option<String> {
    let now = service.clock().now();

    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        let err = WsMessage::error(String::new(), now, 400, "malformed JSON");
        return serde_json::to_string(&err).ok();
    };

    if msg.msg_type != WsMessageType::Command {
        let err = WsMessage::error(msg.id, now, 400, "expected a command message");
        return serde_json::to_string(&err).ok();
    }

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        let err = WsMessage::error(msg.id, now, 404, "unknown command");
        return serde_json::to_string(&err).ok();
    };

    let payload = match command {
        WsCommand::Subscribe { topics } => {
            let (topics, wildcard, unknown) = parse_topics(&topics);
            subs.subscribe(&topics, wildcard);
            tracing::debug!(?topics, wildcard, "ws subscribe");
            serde_json::json!({
                "subscribed": topic_names(&topics),
                "active": topic_names(&subs.active_topics()),
                "wildcard": subs.is_subscribed_all(),
                "unknown": unknown,
            })
        }
        WsCommand::Unsubscribe { topics } => {
            let (topics, wildcard, unknown) = parse_topics(&topics);
            subs.unsubscribe(&topics, wildcard);
            serde_json::json!({
                "unsubscribed": topic_names(&topics),
                "active": topic_names(&subs.active_topics()),
                "unknown": unknown,
            })
        }
        WsCommand::Refresh => {
            let batch = service.refresh().await;
            serde_json::json!({
                "refreshed": true,
                "database_event_id": batch.database_event.id,
                "metrics": service.metrics().await,
            })
        }
        WsCommand::GetMetrics => serde_json::json!({
            "metrics": service.metrics().await,
        }),
    };

    let response = WsMessage::response(msg.id, now, payload);
    serde_json::to_string(&response).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::EventBus;
    use crate::generator::MockGenerator;
    use crate::service::MonitorSettings;

    fn make_service() -> MonitorService {
        MonitorService::new(
            MockGenerator::seeded(3),
            Arc::new(ManualClock::default()),
            EventBus::new(100),
            MonitorSettings::default(),
        )
    }

    fn command(id: &str, payload: serde_json::Value) -> String {
        serde_json::json!({
            "id": id,
            "type": "command",
            "timestamp": "2024-01-01T00:00:00Z",
            "payload": payload,
        })
        .to_string()
    }

    async fn reply(text: &str, subs: &mut SubscriptionManager, service: &MonitorService) -> WsMessage {
        let Some(json) = handle_text_message(text, subs, service).await else {
            panic!("expected a reply");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("reply is not an envelope");
        };
        msg
    }

    #[test]
    fn parse_topics_separates_wildcard_and_unknown() {
        let raw = vec!["queue".to_string(), "*".to_string(), "billing".to_string()];
        let (topics, wildcard, unknown) = parse_topics(&raw);
        assert_eq!(topics, vec![Topic::Queue]);
        assert!(wildcard);
        assert_eq!(unknown, vec!["billing".to_string()]);
    }

    #[tokio::test]
    async fn subscribe_updates_filter() {
        let service = make_service();
        let mut subs = SubscriptionManager::new();
        let text = command("s1", serde_json::json!({"command": "subscribe", "topics": ["email"]}));

        let msg = reply(&text, &mut subs, &service).await;
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.id, "s1");
        assert!(subs.matches(Topic::Email));
        assert!(!subs.matches(Topic::Queue));
    }

    #[tokio::test]
    async fn refresh_generates_records() {
        let service = make_service();
        let mut subs = SubscriptionManager::new();
        let text = command("r1", serde_json::json!({"command": "refresh"}));

        let msg = reply(&text, &mut subs, &service).await;
        assert_eq!(msg.payload["refreshed"], true);
        assert_eq!(service.metrics().await.total_events, 1);
    }

    #[tokio::test]
    async fn malformed_and_unknown_messages_yield_errors() {
        let service = make_service();
        let mut subs = SubscriptionManager::new();

        let msg = reply("not json", &mut subs, &service).await;
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 400);

        let text = command("u1", serde_json::json!({"command": "purge"}));
        let msg = reply(&text, &mut subs, &service).await;
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 404);
    }
}
