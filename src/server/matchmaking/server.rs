/// Matchmaking server actor.
///
/// Periodically scans every game's wait queue and turns the oldest waiting
/// players into a new match once enough of them are present. Formation is
/// all-or-nothing: the match is persisted and its game state initialized
/// before the players leave the queue.
use actix::prelude::*;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::error::MatchmakingError;
use crate::game::types::{MatchId, PlayerId};
use crate::game::{Engine, GameCatalog};
use crate::server::game_session::messages::WatchMatch;
use crate::server::matchmaking::queue::QueueManager;
use crate::server::registry::{Match, MatchRegistry};

pub struct Matchmaker {
    catalog: Arc<GameCatalog>,
    queues: Arc<QueueManager>,
    registry: Arc<MatchRegistry>,
    interval: Duration,
    /// Told about every formed match.
    watcher: Option<Recipient<WatchMatch>>,
}

impl Matchmaker {
    pub fn new(
        catalog: Arc<GameCatalog>,
        queues: Arc<QueueManager>,
        registry: Arc<MatchRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            catalog,
            queues,
            registry,
            interval,
            watcher: None,
        }
    }

    pub fn with_watcher(mut self, watcher: Recipient<WatchMatch>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// One matchmaking pass over every registered game. A failure for one
    /// game is logged and never prevents the others from being served.
    pub fn poll(&self) -> Vec<Match> {
        let mut formed = Vec::new();
        for engine in self.catalog.iter() {
            match self.try_form(engine) {
                Ok(Some(record)) => {
                    if let Some(watcher) = &self.watcher {
                        watcher.do_send(WatchMatch { match_id: record.id });
                    }
                    formed.push(record);
                }
                Ok(None) => {}
                Err(e) => warn!(
                    "[Matchmaking] Could not form a {} match, players stay queued: {}",
                    engine.id(),
                    e
                ),
            }
        }
        formed
    }

    /// Form at most one match for `engine` from the head of its queue.
    fn try_form(&self, engine: &Engine) -> Result<Option<Match>, MatchmakingError> {
        self.queues
            .take_quorum(engine.id(), engine.required_players(), |players| {
                self.create_running(engine, players)
            })
            .inspect(|formed| {
                if let Some(record) = formed {
                    info!(
                        "[Matchmaking] Match {} formed for game {} with players {:?}",
                        record.id, record.game_id, record.players
                    );
                }
            })
    }

    /// Persist, initialize and start a match for `players`, undoing every
    /// step already taken when a later one fails.
    fn create_running(
        &self,
        engine: &Engine,
        players: &[PlayerId],
    ) -> Result<Match, MatchmakingError> {
        let record = Match::new(engine.id().to_string(), players.to_vec());
        let match_id = record.id;
        self.registry.create(record)?;

        if let Err(e) = engine.initialize_state(match_id, players) {
            self.rollback(match_id);
            return Err(e.into());
        }
        match self.registry.start(match_id) {
            Ok(running) => Ok(running),
            Err(e) => {
                engine.discard(match_id);
                self.rollback(match_id);
                Err(e.into())
            }
        }
    }

    fn rollback(&self, match_id: MatchId) {
        if let Err(e) = self.registry.discard(match_id) {
            warn!("[Matchmaking] Rollback of match {} failed: {}", match_id, e);
        }
    }
}

impl Actor for Matchmaker {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[Matchmaking] Started, polling every {:?}", self.interval);
        ctx.run_interval(self.interval, |act, _ctx| {
            let formed = act.poll();
            if !formed.is_empty() {
                debug!("[Matchmaking] {} match(es) formed this pass", formed.len());
            }
        });
    }
}

/// Message: run a matchmaking pass right away.
#[derive(Message)]
#[rtype(result = "Vec<Match>")]
pub struct PollNow;

impl Handler<PollNow> for Matchmaker {
    type Result = MessageResult<PollNow>;

    fn handle(&mut self, _msg: PollNow, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.poll())
    }
}
