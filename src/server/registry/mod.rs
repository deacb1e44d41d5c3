/// Match registry module: match records, lifecycle and persistence.

pub mod matches;
pub mod store;

pub use matches::{Match, MatchRegistry, MatchState};
pub use store::{InMemoryMatchStore, JsonLinesMatchStore, MatchStore};
