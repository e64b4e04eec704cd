//! Service Module
//!
//! Business logic layer for the server.
//! Services combine repositories, the calculator and the exporter into the
//! work executed by the job queue.

pub mod distance;

pub use distance::{DistanceProcessor, DistanceQueue};
