//! pollcast library
//!
//! Live polls with a single active poll, timed voting windows, one vote per
//! voter per launch, and percentage/winner results.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod polls;
pub mod service;
