/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Every error body carries a stable `code`, a human-readable `message` and
/// an optional `context` value.
use actix_web::{HttpResponse, http::StatusCode};
use log::error;
use serde_json::{Value, json};

use crate::server::game_session::messages::ServerFrame;

/// Formats a WebSocket error frame as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "NOT_YOUR_TURN").
/// - `message`: Human-readable error message.
/// - `context`: Optional context (e.g. playerId, matchId).
pub fn ws_error_message(code: &str, message: &str, context: Option<Value>) -> String {
    let frame = ServerFrame::error(code, message, context);
    serde_json::to_string(&frame).unwrap_or_else(|e| {
        error!("[WsError] Failed to serialize error frame {}: {}", code, e);
        r#"{"type":"error","data":{"code":"INTERNAL","message":"internal server error"}}"#
            .to_string()
    })
}

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `context`: Optional context string.
/// - `status`: HTTP status code.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let mut body = json!({ "code": code, "message": message });
    if let Some(context) = context {
        body["context"] = Value::from(context);
    }
    HttpResponse::build(status).json(json!({ "error": body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_error_message_is_an_error_frame() {
        let context = json!({"playerId": "alice"});
        let text = ws_error_message("MALFORMED_FRAME", "bad \"json\"", Some(context));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["data"]["code"], "MALFORMED_FRAME");
        assert_eq!(value["data"]["message"], "bad \"json\"");
        assert_eq!(value["data"]["context"]["playerId"], "alice");
    }

    #[test]
    fn test_http_error_response_status() {
        let resp = http_error_response("NOT_IN_QUEUE", "nope", None, StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
