//! Homebound Core
//!
//! Core types and calculations shared by the Homebound services.
//!
//! This crate contains:
//! - Domain types: location records and distance request/report payloads
//! - Calculator: great-circle distances and per-day distance metrics
//! - DTOs: wire representations used by the HTTP API

pub mod calculator;
pub mod domain;
pub mod dto;
