//! Fitness and rarity scoring for uploaded artifact inventories.
//!
//! The [`scoring`] module tree holds the engine: the stat model, the two
//! scorers, the orchestrated scoring pass, and the result cache. `config`,
//! `telemetry`, and `error` carry the service plumbing around it.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
