//! weekly_metrics: calendar-window resolution and metrics aggregation for
//! recurring e-commerce reporting.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
