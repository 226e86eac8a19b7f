//! qbridge Circuit Intermediate Representation
//!
//! Framework-neutral circuit model that every qbridge adapter decodes into
//! and encodes from.
//!
//! # Core Components
//!
//! - **Gates**: [`GateTag`] is the closed set of gate kinds; [`Gate`] adds
//!   parameters, an optional dense matrix, and the base gate of controlled tags
//! - **Parameters**: [`ParameterRegistry`] issues [`ParamRef`] handles for free
//!   parameters; [`Param`] expressions reference them
//! - **Circuits**: [`Instruction`] and the immutable [`Circuit`], built through
//!   [`CircuitBuilder`]
//! - **Canonicalization**: [`canonical::compress`] and [`canonical::expand`]
//! - **Dispatch**: [`DispatchTable`], the per-framework tag <-> native map
//!
//! # Qubit order
//!
//! Matrices are big-endian: the first qubit of an instruction, and qubit 0 of
//! a circuit, is the most significant bit of the basis-state index.
//!
//! # Example: Bell pair
//!
//! ```rust
//! use qbridge_ir::{Circuit, ClbitId, GateTag, QubitId};
//!
//! let mut b = Circuit::builder(2, 2);
//! b.h(QubitId(0)).unwrap();
//! b.cx(QubitId(0), QubitId(1)).unwrap();
//! b.measure(QubitId(0), ClbitId(0)).unwrap();
//! let circuit = b.build();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.gate_counts()[&GateTag::CX], 1);
//! ```
//!
//! # Example: free parameters
//!
//! ```rust
//! use qbridge_ir::{Bindings, Circuit, QubitId};
//!
//! let mut b = Circuit::builder(1, 0);
//! let theta = b.param("theta");
//! b.rx(theta, QubitId(0)).unwrap();
//! let circuit = b.build();
//! assert!(circuit.is_parameterized());
//!
//! let bound = circuit.bind(&Bindings::new().with("theta", 0.5)).unwrap();
//! assert!(!bound.is_parameterized());
//! ```

pub mod canonical;
pub mod circuit;
pub mod dispatch;
pub mod error;
pub mod framework;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod param_text;
pub mod parameter;
pub mod qubit;

pub use circuit::{Circuit, CircuitBuilder, DenseLayout};
pub use dispatch::DispatchTable;
pub use error::{IrError, IrResult};
pub use framework::FrameworkId;
pub use gate::{Gate, GateTag, standard_matrix};
pub use instruction::Instruction;
pub use matrix::GateMatrix;
pub use param_text::parse_param;
pub use parameter::{Bindings, Param, ParamRef, ParameterRegistry};
pub use qubit::{ClbitId, QubitId};
