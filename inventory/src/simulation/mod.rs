//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module provides tools for testing the inventory store with:
//! - In-memory storage with fault injection
//! - Reproducible random operation generation
//! - A reference model and invariant checking after each operation
//!
//! # Design Principles
//!
//! 1. All I/O goes through the `Storage` trait and can be simulated
//! 2. All randomness is seeded for reproducibility
//! 3. Faults can be injected at any storage call
//! 4. Given the same seed, execution is identical
//!
//! # Usage
//!
//! ```
//! use inventory::simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345).with_malformed_rate(0.1);
//!
//! let mut sim = Simulator::new(config);
//! let result = sim.run(100);
//!
//! assert!(result.passed());
//! ```

mod invariants;
mod model;
mod operation_gen;
mod simulator;
mod storage;

pub use invariants::{InvariantChecker, InvariantViolation};
pub use model::{ModelInventory, Outcome, Rejection};
pub use operation_gen::{MalformationType, Operation, OperationGenConfig, OperationGenerator};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig};
pub use storage::{FaultConfig, SimulatedStorage, SimulatedStorageStats};
