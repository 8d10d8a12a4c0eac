//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Storage of the exported data document (snapshot_store)
//! - Application state (state)

pub mod config;
pub mod db;
pub mod seed;
pub mod server;
pub mod snapshot_store;
pub mod state;

pub use state::AppState;
