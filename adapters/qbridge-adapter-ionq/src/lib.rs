//! qbridge adapter for IonQ
//!
//! Reads and writes IonQ's `ionq.circuit.v0` JSON in the `qis` gate set.
//!
//! IonQ accepts point-valued rotations only and measures every qubit at the
//! end of a job. Encoding therefore needs a binding for every free parameter
//! and drops `Measure` instructions. Gates take at most one control, so
//! `CCX` and `CSwap` are reached through their Clifford+T substitutes.

mod adapter;
mod circuit;

pub use adapter::{IONQ_TABLE, IonQAdapter};
pub use circuit::{IONQ_FORMAT, IonQCircuit, IonQGate, QIS_GATESET};
