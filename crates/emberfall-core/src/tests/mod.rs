//! Scenario and property tests spanning several modules.
//!
//! - `integration.rs`: full input-to-replication loops through [`Simulation`](crate::simulation::Simulation)
//! - `properties.rs`: proptest checks for hover balance, launch rotation,
//!   effect resolution and replication ordering
//! - `helpers.rs`: scene setup shared by both

mod helpers;

pub use helpers::*;
