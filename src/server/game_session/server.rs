/// Live match sessions.
///
/// `MatchHub` maps match ids to their running `MatchSession`. Each
/// `MatchSession` is the single writer for one match: it owns the
/// connection registry and the tick loop, and funnels every move, tick and
/// chat line of that match through its mailbox.
use actix::prelude::*;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::session::{CHAT_MAX_LEN, SWEEP_INTERVAL};
use crate::error::{MoveError, SessionError};
use crate::game::types::{MatchId, Outcome, PlayerId};
use crate::game::{Engine, GameCatalog};
use crate::server::game_session::messages::{
    Attach, ChatMessage, ConnectionHandle, Detach, GetStatus, ListSessions, OpenSession, Outbound,
    PlayerChat, PlayerMove, ServerFrame, SessionClosed, SessionStatus, Touch, WatchMatch,
};
use crate::server::game_session::registry::{ConnectionId, SessionRegistry};
use crate::server::registry::{Match, MatchRegistry};

/// Timing knobs shared by every session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub tick_interval: Duration,
    pub client_timeout: Duration,
    pub abandon_timeout: Duration,
    pub sweep_interval: Duration,
}

impl SessionTimings {
    /// The sweep runs at least twice per timeout so that stale connections
    /// and abandoned matches are noticed close to their deadline.
    pub fn new(
        tick_interval: Duration,
        client_timeout: Duration,
        abandon_timeout: Duration,
    ) -> Self {
        let sweep_interval = Duration::from_secs(SWEEP_INTERVAL)
            .min(client_timeout / 2)
            .min(abandon_timeout / 2)
            .max(Duration::from_millis(10));
        Self {
            tick_interval,
            client_timeout,
            abandon_timeout,
            sweep_interval,
        }
    }
}

pub struct MatchSession {
    match_id: MatchId,
    engine: Arc<Engine>,
    registry: Arc<MatchRegistry>,
    hub: Recipient<SessionClosed>,
    sessions: SessionRegistry<ConnectionHandle>,
    timings: SessionTimings,
    tick_handle: Option<SpawnHandle>,
    loop_starts: u32,
    finished: bool,
    /// Set while nobody is connected.
    idle_since: Option<Instant>,
}

impl MatchSession {
    pub fn new(
        record: &Match,
        engine: Arc<Engine>,
        registry: Arc<MatchRegistry>,
        hub: Recipient<SessionClosed>,
        timings: SessionTimings,
    ) -> Self {
        Self {
            match_id: record.id,
            sessions: SessionRegistry::new(record, engine.is_tick_based()),
            engine,
            registry,
            hub,
            timings,
            tick_handle: None,
            loop_starts: 0,
            finished: false,
            idle_since: Some(Instant::now()),
        }
    }

    fn send_to(handle: &ConnectionHandle, frame: ServerFrame) {
        handle.do_send(Outbound::Frame(frame));
    }

    fn send_state_to(&self, handle: &ConnectionHandle) {
        if let Some(snapshot) = self.engine.get_state(self.match_id) {
            Self::send_to(handle, ServerFrame::State(snapshot));
        }
    }

    /// Push the current snapshot to every live connection of the match.
    fn broadcast_state(&self) {
        let Some(snapshot) = self.engine.get_state(self.match_id) else {
            return;
        };
        debug!(
            "[MatchSession] Broadcast state: match_id={} connections={}",
            self.match_id,
            self.sessions.len()
        );
        let frame = ServerFrame::State(snapshot);
        for handle in self.sessions.handles() {
            Self::send_to(handle, frame.clone());
        }
    }

    fn send_error(&self, player: &str, code: &str, message: &str) {
        if let Some(conn) = self.sessions.get(player) {
            Self::send_to(&conn.handle, ServerFrame::error(code, message, None));
        }
    }

    fn start_loop(&mut self, ctx: &mut Context<Self>) {
        if self.tick_handle.is_some() {
            return;
        }
        self.loop_starts += 1;
        info!(
            "[MatchSession] Tick loop started for match {} every {:?}",
            self.match_id, self.timings.tick_interval
        );
        self.tick_handle = Some(ctx.run_interval(self.timings.tick_interval, |act, ctx| {
            act.on_tick(ctx);
        }));
    }

    fn cancel_loop(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.tick_handle.take() {
            ctx.cancel_future(handle);
            info!("[MatchSession] Tick loop stopped for match {}", self.match_id);
        }
    }

    fn on_tick(&mut self, ctx: &mut Context<Self>) {
        match self.engine.tick(self.match_id) {
            Ok(outcome) => {
                self.broadcast_state();
                if let Some(result) = outcome.finished {
                    self.conclude(result, ctx);
                }
            }
            Err(e) => {
                warn!("[MatchSession] Tick failed for match {}: {}", self.match_id, e);
                if matches!(e, MoveError::MatchNotFound(_)) {
                    // state is gone, nothing left to drive
                    self.sessions.halt_loop();
                    self.cancel_loop(ctx);
                }
            }
        }
    }

    /// Record the end of the match. Called after the final snapshot went out.
    fn conclude(&mut self, outcome: Outcome, ctx: &mut Context<Self>) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.sessions.halt_loop();
        self.cancel_loop(ctx);
        match self.registry.end(self.match_id, outcome) {
            Ok(record) => info!(
                "[MatchSession] Match {} over: {:?}",
                self.match_id, record.outcome
            ),
            Err(e) => error!("[MatchSession] Could not end match {}: {}", self.match_id, e),
        }
        self.engine.discard(self.match_id);
        if self.sessions.is_empty() {
            ctx.stop();
        }
    }

    fn remove_connection(&mut self, player: &str, conn_id: ConnectionId, ctx: &mut Context<Self>) {
        let Some(detached) = self.sessions.detach(player, conn_id) else {
            return;
        };
        info!(
            "[MatchSession] Player {} disconnected from match {} ({} left)",
            player,
            self.match_id,
            self.sessions.len()
        );
        if detached.stop_loop {
            self.cancel_loop(ctx);
        }
        if self.sessions.is_empty() {
            if self.finished {
                ctx.stop();
            } else {
                self.idle_since = Some(Instant::now());
            }
        }
    }

    fn sweep(&mut self, ctx: &mut Context<Self>) {
        let stale = self
            .sessions
            .stale(Instant::now(), self.timings.client_timeout);
        for (player, conn_id) in stale {
            warn!(
                "[MatchSession] Dropping silent connection of {} in match {}",
                player, self.match_id
            );
            if let Some(conn) = self.sessions.get(&player) {
                conn.handle.do_send(Outbound::Close {
                    frame: None,
                    reason: "heartbeat timeout".into(),
                });
            }
            self.remove_connection(&player, conn_id, ctx);
        }
        self.check_abandoned(ctx);
    }

    /// End the match once nobody has been connected for `abandon_timeout`.
    fn check_abandoned(&mut self, ctx: &mut Context<Self>) {
        if self.finished {
            return;
        }
        let Some(since) = self.idle_since else {
            return;
        };
        if since.elapsed() >= self.timings.abandon_timeout {
            warn!(
                "[MatchSession] Nobody connected to match {} for {:?}, ending it as abandoned",
                self.match_id, self.timings.abandon_timeout
            );
            self.conclude(Outcome::Abandoned, ctx);
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            match_id: self.match_id,
            connected: self.sessions.connected(),
            loop_running: self.tick_handle.is_some(),
            loop_starts: self.loop_starts,
            finished: self.finished,
        }
    }
}

impl Actor for MatchSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        debug!("[MatchSession] Session actor up for match {}", self.match_id);
        ctx.run_interval(self.timings.sweep_interval, |act, ctx| act.sweep(ctx));
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        debug!("[MatchSession] Session actor down for match {}", self.match_id);
        self.hub.do_send(SessionClosed {
            match_id: self.match_id,
            addr: ctx.address(),
        });
    }
}

impl Handler<Attach> for MatchSession {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, msg: Attach, ctx: &mut Context<Self>) -> Self::Result {
        if self.finished {
            return Err(SessionError::MatchEnded(self.match_id));
        }
        let attached = self
            .sessions
            .attach(&msg.player_id, msg.conn_id, msg.handle.clone(), Instant::now())?;
        self.idle_since = None;

        if let Some(old) = attached.replaced {
            info!(
                "[MatchSession] Player {} reconnected to match {}, closing previous connection",
                msg.player_id, self.match_id
            );
            old.handle.do_send(Outbound::Close {
                frame: Some(ServerFrame::error(
                    "SESSION_REPLACED",
                    "You have been disconnected because another connection joined with your \
                     player id.",
                    None,
                )),
                reason: "replaced".into(),
            });
        } else {
            info!(
                "[MatchSession] Player {} connected to match {}",
                msg.player_id, self.match_id
            );
        }

        self.send_state_to(&msg.handle);
        if attached.start_loop {
            self.start_loop(ctx);
        }
        Ok(())
    }
}

impl Handler<Detach> for MatchSession {
    type Result = ();

    fn handle(&mut self, msg: Detach, ctx: &mut Context<Self>) -> Self::Result {
        self.remove_connection(&msg.player_id, msg.conn_id, ctx);
    }
}

impl Handler<PlayerMove> for MatchSession {
    type Result = ();

    fn handle(&mut self, msg: PlayerMove, ctx: &mut Context<Self>) -> Self::Result {
        if !self.sessions.is_current(&msg.player_id, msg.conn_id) {
            debug!(
                "[MatchSession] Ignoring move from superseded connection of {}",
                msg.player_id
            );
            return;
        }
        if self.finished {
            let err = MoveError::GameOver;
            self.send_error(&msg.player_id, err.code(), &err.to_string());
            return;
        }
        match self.engine.handle_move(self.match_id, &msg.player_id, msg.data) {
            Ok(outcome) => {
                self.broadcast_state();
                if let Some(result) = outcome.finished {
                    self.conclude(result, ctx);
                }
            }
            Err(e) => {
                debug!(
                    "[MatchSession] Move rejected for {} in match {}: {}",
                    msg.player_id, self.match_id, e
                );
                self.send_error(&msg.player_id, e.code(), &e.to_string());
            }
        }
    }
}

impl Handler<PlayerChat> for MatchSession {
    type Result = ();

    fn handle(&mut self, msg: PlayerChat, _ctx: &mut Context<Self>) -> Self::Result {
        if !self.sessions.is_current(&msg.player_id, msg.conn_id) {
            return;
        }
        let content = msg.content.trim();
        if content.is_empty() || content.chars().count() > CHAT_MAX_LEN {
            self.send_error(
                &msg.player_id,
                "INVALID_CHAT",
                &format!("chat messages must be 1 to {} characters", CHAT_MAX_LEN),
            );
            return;
        }
        let line = ChatMessage {
            match_id: self.match_id,
            player_id: msg.player_id.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        for handle in self.sessions.handles_except(&msg.player_id) {
            Self::send_to(handle, ServerFrame::Chat(line.clone()));
        }
    }
}

impl Handler<Touch> for MatchSession {
    type Result = ();

    fn handle(&mut self, msg: Touch, _ctx: &mut Context<Self>) -> Self::Result {
        self.sessions.touch(&msg.player_id, msg.conn_id, Instant::now());
    }
}

impl Handler<GetStatus> for MatchSession {
    type Result = MessageResult<GetStatus>;

    fn handle(&mut self, _msg: GetStatus, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.status())
    }
}

/// Owner of every live match session.
pub struct MatchHub {
    catalog: Arc<GameCatalog>,
    registry: Arc<MatchRegistry>,
    timings: SessionTimings,
    sessions: HashMap<MatchId, Addr<MatchSession>>,
}

impl MatchHub {
    pub fn new(
        catalog: Arc<GameCatalog>,
        registry: Arc<MatchRegistry>,
        timings: SessionTimings,
    ) -> Self {
        Self {
            catalog,
            registry,
            timings,
            sessions: HashMap::new(),
        }
    }

    /// Check that `player` may join the live session of `match_id`.
    fn admit(&self, match_id: MatchId, player: &PlayerId) -> Result<Match, SessionError> {
        let record = self
            .registry
            .get(match_id)
            .ok_or(SessionError::MatchNotFound(match_id))?;
        if !record.is_active() {
            return Err(SessionError::MatchEnded(match_id));
        }
        if !record.has_player(player) {
            return Err(SessionError::NotParticipant {
                match_id,
                player: player.clone(),
            });
        }
        Ok(record)
    }

    /// Address of the live session of `record`, started on first use.
    fn ensure_session(
        &mut self,
        record: &Match,
        ctx: &mut Context<Self>,
    ) -> Result<Addr<MatchSession>, SessionError> {
        if let Some(addr) = self.sessions.get(&record.id) {
            if addr.connected() {
                return Ok(addr.clone());
            }
        }

        let engine = self.catalog.get(&record.game_id).ok_or_else(|| {
            error!(
                "[MatchHub] Match {} refers to unregistered game {}",
                record.id, record.game_id
            );
            SessionError::MatchNotFound(record.id)
        })?;
        let addr = MatchSession::new(
            record,
            engine,
            self.registry.clone(),
            ctx.address().recipient(),
            self.timings,
        )
        .start();
        info!("[MatchHub] Live session opened for match {}", record.id);
        self.sessions.insert(record.id, addr.clone());
        Ok(addr)
    }
}

impl Actor for MatchHub {
    type Context = Context<Self>;
}

impl Handler<OpenSession> for MatchHub {
    type Result = Result<Addr<MatchSession>, SessionError>;

    fn handle(&mut self, msg: OpenSession, ctx: &mut Context<Self>) -> Self::Result {
        let record = self.admit(msg.match_id, &msg.player_id)?;
        self.ensure_session(&record, ctx)
    }
}

impl Handler<WatchMatch> for MatchHub {
    type Result = ();

    fn handle(&mut self, msg: WatchMatch, ctx: &mut Context<Self>) -> Self::Result {
        match self.registry.get(msg.match_id) {
            Some(record) if record.is_active() => {
                if let Err(e) = self.ensure_session(&record, ctx) {
                    warn!("[MatchHub] Cannot watch match {}: {}", msg.match_id, e);
                }
            }
            _ => debug!("[MatchHub] Match {} is gone, nothing to watch", msg.match_id),
        }
    }
}

impl Handler<SessionClosed> for MatchHub {
    type Result = ();

    fn handle(&mut self, msg: SessionClosed, _ctx: &mut Context<Self>) -> Self::Result {
        // only forget the session if it has not been replaced meanwhile
        if self.sessions.get(&msg.match_id) == Some(&msg.addr) {
            self.sessions.remove(&msg.match_id);
            info!("[MatchHub] Live session closed for match {}", msg.match_id);
        }
    }
}

impl Handler<ListSessions> for MatchHub {
    type Result = MessageResult<ListSessions>;

    fn handle(&mut self, _msg: ListSessions, _ctx: &mut Context<Self>) -> Self::Result {
        let mut ids: Vec<MatchId> = self.sessions.keys().copied().collect();
        ids.sort();
        MessageResult(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::matchmaking::{SNAKE_ID, TICTACTOE_ID};
    use crate::game::GameSnapshot;
    use crate::server::registry::{InMemoryMatchStore, MatchState};
    use parking_lot::Mutex;
    use serde_json::json;
    use uuid::Uuid;

    /// Stands in for a player's socket and records what it is sent.
    #[derive(Default, Clone)]
    struct FakeSocket {
        received: Arc<Mutex<Vec<Outbound>>>,
    }

    impl Actor for FakeSocket {
        type Context = Context<Self>;
    }

    impl Handler<Outbound> for FakeSocket {
        type Result = ();

        fn handle(&mut self, msg: Outbound, _ctx: &mut Context<Self>) -> Self::Result {
            self.received.lock().push(msg);
        }
    }

    impl FakeSocket {
        fn frames(&self) -> Vec<ServerFrame> {
            self.received
                .lock()
                .iter()
                .filter_map(|m| match m {
                    Outbound::Frame(f) => Some(f.clone()),
                    Outbound::Close { .. } => None,
                })
                .collect()
        }

        fn was_closed(&self) -> bool {
            self.received
                .lock()
                .iter()
                .any(|m| matches!(m, Outbound::Close { .. }))
        }
    }

    struct Fixture {
        hub: Addr<MatchHub>,
        registry: Arc<MatchRegistry>,
        catalog: Arc<GameCatalog>,
    }

    fn fixture(tick: Duration) -> Fixture {
        fixture_with(tick, Duration::from_secs(60))
    }

    fn fixture_with(tick: Duration, abandon_timeout: Duration) -> Fixture {
        let catalog = Arc::new(GameCatalog::default());
        let registry = Arc::new(MatchRegistry::new(Arc::new(InMemoryMatchStore::new())));
        let hub = MatchHub::new(
            catalog.clone(),
            registry.clone(),
            SessionTimings::new(tick, Duration::from_secs(60), abandon_timeout),
        )
        .start();
        Fixture {
            hub,
            registry,
            catalog,
        }
    }

    /// Register a running match the way the matchmaker does.
    fn running_match(fx: &Fixture, game: &str) -> MatchId {
        let record = Match::new(game.into(), vec!["alice".into(), "bob".into()]);
        let id = record.id;
        fx.registry.create(record.clone()).unwrap();
        fx.catalog
            .get(game)
            .unwrap()
            .initialize_state(id, &record.players)
            .unwrap();
        fx.registry.start(id).unwrap();
        id
    }

    async fn connect(
        fx: &Fixture,
        match_id: MatchId,
        player: &str,
    ) -> (Addr<MatchSession>, FakeSocket, ConnectionId) {
        let session = fx
            .hub
            .send(OpenSession {
                match_id,
                player_id: player.into(),
            })
            .await
            .unwrap()
            .unwrap();
        let socket = FakeSocket::default();
        let conn_id = Uuid::new_v4();
        session
            .send(Attach {
                player_id: player.into(),
                conn_id,
                handle: socket.clone().start().recipient(),
            })
            .await
            .unwrap()
            .unwrap();
        (session, socket, conn_id)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    #[actix::test]
    async fn test_open_session_validates_participant() {
        let fx = fixture(Duration::from_secs(1));
        let id = running_match(&fx, TICTACTOE_ID);

        let outsider = fx
            .hub
            .send(OpenSession {
                match_id: id,
                player_id: "mallory".into(),
            })
            .await
            .unwrap();
        assert!(matches!(outsider, Err(SessionError::NotParticipant { .. })));

        let unknown = fx
            .hub
            .send(OpenSession {
                match_id: Uuid::new_v4(),
                player_id: "alice".into(),
            })
            .await
            .unwrap();
        assert!(matches!(unknown, Err(SessionError::MatchNotFound(_))));
        assert!(fx.hub.send(ListSessions).await.unwrap().is_empty());
    }

    #[actix::test]
    async fn test_turn_based_flow_until_win() {
        let fx = fixture(Duration::from_secs(1));
        let id = running_match(&fx, TICTACTOE_ID);
        let (session, alice, a) = connect(&fx, id, "alice").await;
        let (_, bob, b) = connect(&fx, id, "bob").await;
        settle().await;
        assert!(matches!(alice.frames().first(), Some(ServerFrame::State(_))));
        assert!(matches!(bob.frames().first(), Some(ServerFrame::State(_))));

        // out of turn: only bob hears about it
        session.do_send(PlayerMove {
            player_id: "bob".into(),
            conn_id: b,
            data: json!({"index": 0}),
        });
        settle().await;
        assert!(matches!(
            bob.frames().last(),
            Some(ServerFrame::Error(body)) if body.code == "NOT_YOUR_TURN"
        ));
        assert_eq!(alice.frames().len(), 1);

        let moves = [
            ("alice", a, 0),
            ("bob", b, 3),
            ("alice", a, 1),
            ("bob", b, 4),
            ("alice", a, 2),
        ];
        for (player, conn, index) in moves {
            session.do_send(PlayerMove {
                player_id: player.into(),
                conn_id: conn,
                data: json!({ "index": index }),
            });
        }
        settle().await;

        match alice.frames().last() {
            Some(ServerFrame::State(GameSnapshot::TicTacToe(board))) => {
                assert_eq!(board.winner.as_deref(), Some("alice"));
            }
            other => panic!("unexpected frame {:?}", other),
        }
        let record = fx.registry.get(id).unwrap();
        assert_eq!(record.state, MatchState::Ended);
        assert_eq!(record.outcome, Some(Outcome::Winner("alice".into())));
        assert!(!fx.registry.is_in_match("bob"));

        let status = session.send(GetStatus).await.unwrap();
        assert!(status.finished);
        assert_eq!(status.loop_starts, 0);
    }

    #[actix::test]
    async fn test_chat_is_stamped_and_fanned_out() {
        let fx = fixture(Duration::from_secs(1));
        let id = running_match(&fx, TICTACTOE_ID);
        let (session, alice, a) = connect(&fx, id, "alice").await;
        let (_, bob, _) = connect(&fx, id, "bob").await;

        session.do_send(PlayerChat {
            player_id: "alice".into(),
            conn_id: a,
            content: "  good luck ".into(),
        });
        settle().await;

        let chats: Vec<ChatMessage> = bob
            .frames()
            .into_iter()
            .filter_map(|f| match f {
                ServerFrame::Chat(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].player_id, "alice");
        assert_eq!(chats[0].content, "good luck");
        assert_eq!(chats[0].match_id, id);
        assert!(!alice.frames().iter().any(|f| matches!(f, ServerFrame::Chat(_))));
    }

    #[actix::test]
    async fn test_first_connections_start_one_loop() {
        let fx = fixture(Duration::from_millis(500));
        let id = running_match(&fx, SNAKE_ID);
        let (first, second) = tokio::join!(connect(&fx, id, "alice"), connect(&fx, id, "bob"));
        assert!(first.0 == second.0);

        let status = first.0.send(GetStatus).await.unwrap();
        assert!(status.loop_running);
        assert_eq!(status.loop_starts, 1);
        assert_eq!(status.connected, vec!["alice".to_string(), "bob".to_string()]);

        first.0.do_send(Detach {
            player_id: "alice".into(),
            conn_id: first.2,
        });
        first.0.do_send(Detach {
            player_id: "bob".into(),
            conn_id: second.2,
        });
        let status = first.0.send(GetStatus).await.unwrap();
        assert!(!status.loop_running);
        assert!(!status.finished);
    }

    #[actix::test]
    async fn test_reconnect_replaces_old_connection() {
        let fx = fixture(Duration::from_secs(1));
        let id = running_match(&fx, TICTACTOE_ID);
        let (session, old_socket, old_conn) = connect(&fx, id, "alice").await;
        let (_, new_socket, new_conn) = connect(&fx, id, "alice").await;
        settle().await;
        assert!(old_socket.was_closed());
        assert!(!new_socket.was_closed());

        // the old socket's late detach leaves the new one in place
        session.do_send(Detach {
            player_id: "alice".into(),
            conn_id: old_conn,
        });
        session.do_send(PlayerMove {
            player_id: "alice".into(),
            conn_id: new_conn,
            data: json!({"index": 4}),
        });
        settle().await;
        let status = session.send(GetStatus).await.unwrap();
        assert_eq!(status.connected, vec!["alice".to_string()]);
        assert_eq!(new_socket.frames().len(), 2);
    }

    #[actix::test]
    async fn test_snake_match_runs_to_completion() {
        let fx = fixture(Duration::from_millis(5));
        let id = running_match(&fx, SNAKE_ID);
        let (session, alice, _) = connect(&fx, id, "alice").await;

        // snakes head into the walls without steering
        tokio::time::sleep(Duration::from_millis(600)).await;

        let record = fx.registry.get(id).unwrap();
        assert_eq!(record.state, MatchState::Ended);
        assert!(record.outcome.is_some());
        assert!(fx.catalog.get(SNAKE_ID).unwrap().get_state(id).is_none());
        match alice.frames().last() {
            Some(ServerFrame::State(GameSnapshot::Snake(arena))) => assert!(arena.is_over),
            other => panic!("unexpected frame {:?}", other),
        }
        let status = session.send(GetStatus).await.unwrap();
        assert!(status.finished);
        assert!(!status.loop_running);
    }

    #[test]
    fn test_sweep_runs_twice_per_timeout() {
        let timings = SessionTimings::new(
            Duration::from_millis(200),
            Duration::from_secs(4),
            Duration::from_secs(60),
        );
        assert_eq!(timings.sweep_interval, Duration::from_secs(2));
        let timings = SessionTimings::new(
            Duration::from_millis(200),
            Duration::from_secs(60),
            Duration::from_millis(100),
        );
        assert_eq!(timings.sweep_interval, Duration::from_millis(50));
    }

    #[actix::test]
    async fn test_match_nobody_joins_is_abandoned() {
        let fx = fixture_with(Duration::from_millis(50), Duration::from_millis(100));
        let id = running_match(&fx, SNAKE_ID);
        fx.hub.do_send(WatchMatch { match_id: id });
        settle().await;
        assert_eq!(fx.hub.send(ListSessions).await.unwrap(), vec![id]);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let record = fx.registry.get(id).unwrap();
        assert_eq!(record.state, MatchState::Ended);
        assert_eq!(record.outcome, Some(Outcome::Abandoned));
        assert!(!fx.registry.is_in_match("alice"));
        assert!(fx.catalog.get(SNAKE_ID).unwrap().get_state(id).is_none());
        assert!(fx.hub.send(ListSessions).await.unwrap().is_empty());
    }

    #[actix::test]
    async fn test_match_abandoned_once_everyone_left() {
        let fx = fixture_with(Duration::from_secs(1), Duration::from_millis(100));
        let id = running_match(&fx, TICTACTOE_ID);
        let (session, _alice, a) = connect(&fx, id, "alice").await;

        // a connected player keeps the match alive
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fx.registry.get(id).unwrap().state, MatchState::Running);

        session.do_send(Detach {
            player_id: "alice".into(),
            conn_id: a,
        });
        tokio::time::sleep(Duration::from_millis(400)).await;
        let record = fx.registry.get(id).unwrap();
        assert_eq!(record.outcome, Some(Outcome::Abandoned));
        assert!(!fx.registry.is_in_match("bob"));
    }

    #[actix::test]
    async fn test_watching_an_ended_match_opens_nothing() {
        let fx = fixture(Duration::from_secs(1));
        let id = running_match(&fx, TICTACTOE_ID);
        fx.registry.end(id, Outcome::Draw).unwrap();
        fx.hub.do_send(WatchMatch { match_id: id });
        fx.hub.do_send(WatchMatch {
            match_id: Uuid::new_v4(),
        });
        settle().await;
        assert!(fx.hub.send(ListSessions).await.unwrap().is_empty());
    }
}
