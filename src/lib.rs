//! Hourly merit-order electricity dispatch simulator.
//!
//! A [`sim::Context`] holds demand, a region map and a fleet of
//! [`generators::Generator`]s in merit order. Each run walks the timeline hour
//! by hour, dispatching the fleet under a non-synchronous penetration limit and
//! offering surplus to storage.

pub mod config;
pub mod demand;
pub mod error;
pub mod generators;
pub mod io;
pub mod regions;
pub mod reporting;
/// Dispatch engine, spill routing, and the simulation runner.
pub mod sim;
pub mod traces;
