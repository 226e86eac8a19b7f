//! qbridge: cross-framework quantum circuit transpiler
//!
//! Converts circuits between Qiskit, Cirq, Braket, IonQ and OpenQASM 2/3
//! through one shared IR, decomposing gates the target cannot express and
//! checking results with a dense unitary oracle.
//!
//! # Pipeline
//!
//! ```text
//!  native ──decode──→ Circuit ──compress?──→ Circuit ──lower──→ Circuit ──encode──→ native
//!                                                        │
//!                                            closed-form rules, ZYZ, KAK
//! ```
//!
//! # Example
//!
//! ```rust
//! use qbridge::{FrameworkId, NativeCircuit, TranspileOptions, circuits_equivalent, transpile};
//!
//! let source = NativeCircuit::detect(
//!     "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[3];\nccx q[0], q[1], q[2];\n",
//! )
//! .unwrap();
//!
//! let ionq = transpile(&source, FrameworkId::IonQ, &TranspileOptions::default()).unwrap();
//! let NativeCircuit::IonQ(ref program) = ionq else { unreachable!() };
//! assert_eq!(program.circuit.len(), 15);
//! assert!(circuits_equivalent(&source, &ionq, None).unwrap());
//! ```
//!
//! # Configuration
//!
//! [`Config`] reads defaults from YAML and `QBRIDGE_*` environment
//! variables; [`TranspileOptions::from`] seeds per-call options from it.
//! [`tracing_config::init_tracing`] installs a console or JSON subscriber.

pub mod config;
pub mod error;
pub mod native;
pub mod options;
pub mod registry;
pub mod tracing_config;
mod transpile;

pub use config::{Config, ConfigError};
pub use error::{TranspileError, TranspileResult};
pub use native::NativeCircuit;
pub use options::TranspileOptions;
pub use transpile::{circuits_equivalent, circuits_equivalent_with, transpile, transpile_text};

pub use qbridge_ir::{Bindings, Circuit, FrameworkId, GateTag};
