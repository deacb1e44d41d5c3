use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SessionError;
use crate::game::GameSnapshot;
use crate::game::types::{MatchId, PlayerId};
use crate::server::game_session::registry::ConnectionId;
use crate::server::game_session::server::MatchSession;

/// Client -> server frame: `{"type": ..., "data": ...}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Game-specific payload, decoded by the engine of the match.
    Move(Value),
    Chat(ChatPayload),
    /// Any `data` is accepted and ignored.
    Ping(Option<Value>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatPayload {
    pub content: String,
}

/// Chat line as relayed to the other participants. Sender and timestamp are
/// always filled in by the server.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

// Server -> client frame
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ServerFrame {
    State(GameSnapshot),
    Chat(ChatMessage),
    Pong,
    Error(ErrorBody),
}

impl ServerFrame {
    pub fn error(code: &str, message: &str, context: Option<Value>) -> Self {
        Self::Error(ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            context,
        })
    }
}

/// What a match session pushes to one connection.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub enum Outbound {
    Frame(ServerFrame),
    /// Close the connection after sending `frame`, if any.
    Close { frame: Option<ServerFrame>, reason: String },
}

pub type ConnectionHandle = Recipient<Outbound>;

/// Connection -> session: register a freshly upgraded connection.
#[derive(Message)]
#[rtype(result = "Result<(), SessionError>")]
pub struct Attach {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
    pub handle: ConnectionHandle,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Detach {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerMove {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
    pub data: Value,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerChat {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
    pub content: String,
}

/// Heartbeat seen on a connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Touch {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
}

/// Live view of a session, for observability and tests.
#[derive(Message)]
#[rtype(result = "SessionStatus")]
pub struct GetStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub match_id: MatchId,
    pub connected: Vec<PlayerId>,
    pub loop_running: bool,
    /// How many times a tick loop was started for this match.
    pub loop_starts: u32,
    pub finished: bool,
}

/// Hub: look up (or spin up) the live session of a match for a player.
#[derive(Message)]
#[rtype(result = "Result<Addr<MatchSession>, SessionError>")]
pub struct OpenSession {
    pub match_id: MatchId,
    pub player_id: PlayerId,
}

/// Hub: a match was just formed. Its session starts right away so that a
/// match nobody ever connects to still ends as abandoned.
#[derive(Message)]
#[rtype(result = "()")]
pub struct WatchMatch {
    pub match_id: MatchId,
}

/// Hub: a match session has stopped.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SessionClosed {
    pub match_id: MatchId,
    pub addr: Addr<MatchSession>,
}

/// Hub: ids of matches with a live session.
#[derive(Message)]
#[rtype(result = "Vec<MatchId>")]
pub struct ListSessions;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_frames_demultiplex_by_type() {
        let mv: ClientFrame =
            serde_json::from_value(json!({"type": "move", "data": {"index": 4}})).unwrap();
        assert_eq!(mv, ClientFrame::Move(json!({"index": 4})));

        let chat: ClientFrame =
            serde_json::from_value(json!({"type": "chat", "data": {"content": "gg"}})).unwrap();
        assert_eq!(chat, ClientFrame::Chat(ChatPayload { content: "gg".into() }));

        let ping: ClientFrame = serde_json::from_value(json!({"type": "ping"})).unwrap();
        assert_eq!(ping, ClientFrame::Ping(None));

        assert!(serde_json::from_value::<ClientFrame>(json!({"type": "shout"})).is_err());
    }

    #[test]
    fn test_ping_accepts_any_data() {
        for frame in [
            json!({"type": "ping", "data": null}),
            json!({"type": "ping", "data": {}}),
            json!({"type": "ping", "data": {"t": 1}}),
            json!({"type": "ping", "data": 42}),
        ] {
            let parsed: ClientFrame = serde_json::from_value(frame.clone()).unwrap();
            assert!(matches!(parsed, ClientFrame::Ping(_)), "{} did not parse as ping", frame);
        }
    }

    #[test]
    fn test_chat_message_uses_camel_case() {
        let line = ChatMessage {
            match_id: uuid::Uuid::nil(),
            player_id: "alice".into(),
            content: "gg".into(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["playerId"], "alice");
        assert_eq!(value["matchId"], uuid::Uuid::nil().to_string());
        assert!(value.get("player_id").is_none());
    }

    #[test]
    fn test_server_frame_envelope() {
        let pong = serde_json::to_value(ServerFrame::Pong).unwrap();
        assert_eq!(pong, json!({"type": "pong"}));

        let err = ServerFrame::error("NOT_YOUR_TURN", "not player's turn", None);
        let err = serde_json::to_value(err).unwrap();
        assert_eq!(
            err,
            json!({
                "type": "error",
                "data": {"code": "NOT_YOUR_TURN", "message": "not player's turn"}
            })
        );
    }
}
