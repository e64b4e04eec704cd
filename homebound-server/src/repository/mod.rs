//! Repository Module
//!
//! Data access layer for the server.
//! Location history is read-only; jobs live in memory and have no repository.

pub mod location;

pub use location::{LocationRepository, PgLocationRepository};
