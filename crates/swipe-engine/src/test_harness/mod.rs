//! Simulation harness
//!
//! Seeded in-memory backend plus a session simulator used by the
//! `swipe-sim` binary and the integration tests.

pub mod catalog;
pub mod simulator;

pub use catalog::{CatalogCalls, CatalogConfig, CatalogService};
pub use simulator::{run_simulator, SimulationReport, SimulatorConfig, SimulatorStats, Violation};
