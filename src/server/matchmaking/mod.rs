/// Matchmaking module: wait queues, queue admission and match formation.

pub mod lobby;
pub mod queue;
pub mod server;
