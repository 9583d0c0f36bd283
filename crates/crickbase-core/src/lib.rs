// Shared building blocks: configuration, player records, the SQLite player
// store, list queries and roster import.

pub mod config;
pub mod db;
pub mod import;
pub mod player;
pub mod query;
pub mod source;
