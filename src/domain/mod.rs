//! Reporting domain: calendar windows, order counting, metrics and shares.

pub mod error;
pub mod record;
pub mod calendar;
pub mod dataset;
pub mod scope;
pub mod dedup;
pub mod growth;
pub mod metrics;
pub mod markets;
pub mod category;
pub mod contribution;
pub mod products;
pub mod report;
pub mod config;
