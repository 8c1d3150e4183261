//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `Poller`: Periodic fetch → extract → write loop

pub mod poller;

pub use poller::{CycleOutcome, Poller, PollerSettings, PollerState};
