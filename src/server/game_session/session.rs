/// WebSocket connection of one player to one match.
///
/// Reads client frames, forwards them to the match's `MatchSession`, writes
/// server frames back and keeps the connection alive with protocol pings.
use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, error, http::StatusCode, web};
use actix_web_actors::ws;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::{SessionError, TransportError};
use crate::game::types::{MatchId, PlayerId};
use crate::server::anti_spam::{FloodGuard, FloodVerdict};
use crate::server::game_session::messages::{
    Attach, ClientFrame, Detach, OpenSession, Outbound, PlayerChat, PlayerMove, ServerFrame, Touch,
};
use crate::server::game_session::registry::ConnectionId;
use crate::server::game_session::server::MatchSession;
use crate::server::state::AppState;
use crate::server::ws_error::{http_error_response, ws_error_message};

pub struct PlayerSocket {
    conn_id: ConnectionId,
    match_id: MatchId,
    player_id: PlayerId,
    session: Addr<MatchSession>,
    last_heartbeat: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    flood: FloodGuard,
}

impl PlayerSocket {
    pub fn new(
        match_id: MatchId,
        player_id: PlayerId,
        session: Addr<MatchSession>,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        let now = Instant::now();
        Self {
            conn_id: Uuid::new_v4(),
            match_id,
            player_id,
            session,
            last_heartbeat: now,
            heartbeat_interval,
            client_timeout,
            flood: FloodGuard::new(now),
        }
    }

    /// Ping the client every `heartbeat_interval`; give up on it once nothing
    /// was heard for `client_timeout`.
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > act.client_timeout {
                let err = TransportError::ReadTimeout(act.client_timeout.as_secs());
                warn!(
                    "[PlayerSocket] {} in match {}: {}, closing",
                    act.player_id, act.match_id, err
                );
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Away,
                    description: Some(err.to_string()),
                }));
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn seen(&mut self) {
        self.last_heartbeat = Instant::now();
        self.session.do_send(Touch {
            player_id: self.player_id.clone(),
            conn_id: self.conn_id,
        });
    }

    fn send_frame(&self, ctx: &mut ws::WebsocketContext<Self>, frame: &ServerFrame) {
        match serde_json::to_string(frame) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                warn!("[PlayerSocket] Failed to serialize frame: {}", e);
                ctx.text(ws_error_message("INTERNAL", "internal server error", None));
            }
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match self.flood.record_frame(Instant::now(), &self.player_id) {
            FloodVerdict::Accept => {}
            FloodVerdict::Drop { notify } => {
                if notify {
                    ctx.text(ws_error_message(
                        "RATE_LIMITED",
                        "Too many messages, slow down.",
                        None,
                    ));
                }
                return;
            }
            FloodVerdict::Disconnect => {
                warn!(
                    "[PlayerSocket] Closing flooding connection of {} in match {}",
                    self.player_id, self.match_id
                );
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some("flooding".into()),
                }));
                ctx.stop();
                return;
            }
        }

        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                let err = TransportError::MalformedFrame(e.to_string());
                debug!("[PlayerSocket] {} sent {}", self.player_id, err);
                ctx.text(ws_error_message(
                    err.code(),
                    &err.to_string(),
                    Some(serde_json::json!({ "playerId": self.player_id })),
                ));
                return;
            }
        };

        match frame {
            ClientFrame::Move(data) => self.session.do_send(PlayerMove {
                player_id: self.player_id.clone(),
                conn_id: self.conn_id,
                data,
            }),
            ClientFrame::Chat(payload) => self.session.do_send(PlayerChat {
                player_id: self.player_id.clone(),
                conn_id: self.conn_id,
                content: payload.content,
            }),
            ClientFrame::Ping(_) => self.send_frame(ctx, &ServerFrame::Pong),
        }
    }
}

impl Actor for PlayerSocket {
    type Context = ws::WebsocketContext<Self>;

    /// Register with the match session; the connection is refused if the
    /// session no longer accepts this player.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        self.session
            .send(Attach {
                player_id: self.player_id.clone(),
                conn_id: self.conn_id,
                handle: ctx.address().recipient(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        ctx.text(ws_error_message(e.code(), &e.to_string(), None));
                        ctx.close(Some(ws::CloseReason {
                            code: ws::CloseCode::Policy,
                            description: Some(e.to_string()),
                        }));
                        ctx.stop();
                    }
                    Err(e) => {
                        warn!(
                            "[PlayerSocket] Match session {} unreachable for {}: {}",
                            act.match_id, act.player_id, e
                        );
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.session.do_send(Detach {
            player_id: self.player_id.clone(),
            conn_id: self.conn_id,
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                self.seen();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Ping(payload)) => {
                self.seen();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => self.seen(),
            Ok(ws::Message::Binary(_)) => {
                ctx.text(ws_error_message(
                    "UNSUPPORTED_FRAME",
                    "Only JSON text frames are accepted.",
                    None,
                ));
            }
            Ok(ws::Message::Close(reason)) => {
                debug!("[PlayerSocket] {} closed: {:?}", self.player_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!(
                    "[PlayerSocket] Protocol error from {} in match {}: {}",
                    self.player_id, self.match_id, e
                );
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for PlayerSocket {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            Outbound::Frame(frame) => self.send_frame(ctx, &frame),
            Outbound::Close { frame, reason } => {
                if let Some(frame) = frame {
                    self.send_frame(ctx, &frame);
                }
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Normal,
                    description: Some(reason),
                }));
                ctx.stop();
            }
        }
    }
}

fn session_error_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::MatchNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::MatchEnded(_) => StatusCode::GONE,
        SessionError::NotParticipant { .. } => StatusCode::FORBIDDEN,
    }
}

/// WebSocket endpoint for a live match: `/ws/match/{match_id}/{player_id}`.
///
/// The player is checked against the match before the upgrade, so a refused
/// connection gets a plain HTTP error instead of a WebSocket.
pub async fn ws_match(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<(MatchId, PlayerId)>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (match_id, player_id) = path.into_inner();

    let session = match data
        .hub
        .send(OpenSession {
            match_id,
            player_id: player_id.clone(),
        })
        .await
        .map_err(error::ErrorInternalServerError)?
    {
        Ok(addr) => addr,
        Err(e) => {
            info!(
                "[PlayerSocket] Refused {} for match {}: {}",
                player_id, match_id, e
            );
            return Ok(http_error_response(
                e.code(),
                &e.to_string(),
                Some(&player_id),
                session_error_status(&e),
            ));
        }
    };

    let socket = PlayerSocket::new(
        match_id,
        player_id,
        session,
        data.config.heartbeat_interval,
        data.config.client_timeout,
    );
    ws::start(socket, &req, stream).inspect_err(|e| {
        let err = TransportError::UpgradeFailed(e.to_string());
        warn!("[PlayerSocket] {} for match {}", err, match_id);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::config::matchmaking::TICTACTOE_ID;
    use crate::server::game_session::messages::GetStatus;
    use crate::server::matchmaking::server::PollNow;
    use crate::server::registry::InMemoryMatchStore;
    use crate::server::router;
    use actix_web::dev::ServerHandle;
    use actix_web::{App, HttpServer};
    use futures::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    struct Served {
        data: web::Data<AppState>,
        addr: SocketAddr,
        match_id: MatchId,
        server: ServerHandle,
    }

    /// Serve the whole app on a free port with one running tic-tac-toe match.
    async fn serve(config: ServerConfig) -> Served {
        let data = web::Data::new(AppState::start(config, Arc::new(InMemoryMatchStore::new())));
        for player in ["alice", "bob"] {
            data.lobby.enqueue(player, TICTACTOE_ID).unwrap();
        }
        let match_id = data.matchmaker.send(PollNow).await.unwrap()[0].id;

        let app_data = data.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_data.clone())
                .configure(router::config)
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Served {
            data,
            addr,
            match_id,
            server: handle,
        }
    }

    fn config() -> ServerConfig {
        ServerConfig {
            matchmaking_interval: Duration::from_secs(3600),
            ..ServerConfig::default()
        }
    }

    async fn join(served: &Served, player: &str) -> Client {
        let url = format!("ws://{}/ws/match/{}/{}", served.addr, served.match_id, player);
        let (client, _) = connect_async(url).await.unwrap();
        client
    }

    async fn next_frame(client: &mut Client) -> Value {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("connection ended: {:?}", other),
            }
        }
    }

    #[actix_web::test]
    async fn test_ping_with_payload_gets_pong() {
        let served = serve(config()).await;
        let mut alice = join(&served, "alice").await;
        assert_eq!(next_frame(&mut alice).await["type"], "state");

        let ping = json!({"type": "ping", "data": {"t": 1}});
        alice.send(Message::Text(ping.to_string())).await.unwrap();
        assert_eq!(next_frame(&mut alice).await, json!({"type": "pong"}));

        served.server.stop(false).await;
    }

    #[actix_web::test]
    async fn test_game_traffic_keeps_connection_alive() {
        // no protocol pings during the test; only the frames we send count
        let served = serve(ServerConfig {
            heartbeat_interval: Duration::from_secs(30),
            client_timeout: Duration::from_secs(1),
            ..config()
        })
        .await;
        let mut alice = join(&served, "alice").await;
        assert_eq!(next_frame(&mut alice).await["type"], "state");

        let chat = json!({"type": "chat", "data": {"content": "anyone there?"}});
        for _ in 0..12 {
            alice.send(Message::Text(chat.to_string())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        let session = served
            .data
            .hub
            .send(OpenSession {
                match_id: served.match_id,
                player_id: "alice".into(),
            })
            .await
            .unwrap()
            .unwrap();
        let status = session.send(GetStatus).await.unwrap();
        assert_eq!(status.connected, vec!["alice".to_string()]);

        served.server.stop(false).await;
    }
}
