//! Hubsim - in-memory social-protocol hub simulator
//!
//! Hubsim stores signed, content-addressed records (casts, replies, profile
//! attributes) behind a multi-index store with cursor pagination, pairs
//! every write with an append-only hub event, and ships a workload
//! generator that populates a realistic dataset at scale.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod store;
