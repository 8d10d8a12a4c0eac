//! Optional modules - Features outside the catalog core
//!
//! - `import`: loads an exported data document back into the database
//! - `integrations`: clients for external services (search index)

pub mod import;
pub mod integrations;
