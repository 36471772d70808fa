//! Counter WebSocket endpoint - 订单实时推送
//!
//! GET /ws?counter=<1|2>
//!
//! 协议:
//! - Server → Terminal: `RealtimeEvent` JSON 文本帧
//! - Terminal → Server: `{"type":"join","counter":2}` 切换柜台房间
//!
//! 不带 counter 的连接在发送 join 之前不会收到任何事件。

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::message::RealtimeEvent;
use shared::models::Counter;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    counter: Option<Counter>,
}

/// Commands sent by a terminal
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum TerminalCommand {
    Join { counter: Counter },
}

/// GET /ws?counter=N
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_session(socket, state, query.counter))
}

async fn recv_event(
    rx: &mut Option<broadcast::Receiver<Arc<RealtimeEvent>>>,
) -> Result<Arc<RealtimeEvent>, broadcast::error::RecvError> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn ws_session(socket: WebSocket, state: ServerState, counter: Option<Counter>) {
    let (mut sink, mut stream) = socket.split();
    let session_id = uuid::Uuid::new_v4().simple().to_string();

    let mut room = counter;
    let mut hub_rx = room.map(|c| state.hub.subscribe(c));
    tracing::info!(session = %session_id, counter = ?room, "Terminal WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = recv_event(&mut hub_rx) => {
                match event {
                    Ok(event) => {
                        let text = match event.to_text() {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to encode realtime event");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(session = %session_id, counter = ?room, lagged = n, "Terminal subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<TerminalCommand>(&text) {
                            Ok(TerminalCommand::Join { counter }) => {
                                if room != Some(counter) {
                                    hub_rx = Some(state.hub.subscribe(counter));
                                    room = Some(counter);
                                    tracing::info!(session = %session_id, counter = %counter, "Terminal joined counter room");
                                }
                            }
                            Err(e) => {
                                tracing::debug!(session = %session_id, error = %e, "Ignoring unknown terminal message");
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(session = %session_id, counter = ?room, "Terminal WS disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_command() {
        let cmd: TerminalCommand = serde_json::from_str(r#"{"type":"join","counter":2}"#).unwrap();
        let TerminalCommand::Join { counter } = cmd;
        assert_eq!(counter, Counter::Two);
        assert!(serde_json::from_str::<TerminalCommand>(r#"{"type":"join","counter":3}"#).is_err());
    }

    #[test]
    fn test_query_counter_is_optional() {
        let q: WsQuery = serde_json::from_str("{}").unwrap();
        assert!(q.counter.is_none());
    }
}
