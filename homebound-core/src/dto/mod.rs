//! Data Transfer Objects for the HTTP API
//!
//! DTOs are flat, string-typed views of the domain types, shaped for JSON
//! clients rather than for the job queue.

pub mod job;
