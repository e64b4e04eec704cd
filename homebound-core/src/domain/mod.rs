//! Core domain types
//!
//! These types describe the data a distance job reads (locations) and the
//! payloads it carries through the job queue (request parameters and the
//! resulting report).

pub mod distance;
pub mod location;
