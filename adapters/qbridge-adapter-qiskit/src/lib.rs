//! qbridge adapter for Qiskit
//!
//! Converts between the JSON form of a Qiskit `QuantumCircuit` and the
//! qbridge IR. Every [`GateTag`](qbridge_ir::GateTag) is native, so encoding
//! never decomposes; free parameters travel as expression strings.
//!
//! # Example
//!
//! ```rust
//! use qbridge_adapter_qiskit::{QiskitAdapter, QiskitCircuit};
//! use qbridge_ir::Bindings;
//! use qbridge_synth::FrameworkAdapter;
//!
//! let native = QiskitCircuit::from_json(
//!     r#"{"num_qubits": 2, "data": [
//!         {"name": "h", "qubits": [0]},
//!         {"name": "cx", "qubits": [0, 1]}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let circuit = QiskitAdapter.decode(&native).unwrap();
//! assert_eq!(circuit.len(), 2);
//!
//! let again = QiskitAdapter.encode(&circuit, &Bindings::new()).unwrap();
//! assert_eq!(again.data[1].name, "cx");
//! ```

mod adapter;
mod model;

pub use adapter::{QISKIT_TABLE, QiskitAdapter};
pub use model::{QiskitCircuit, QiskitInstruction, QiskitParam};
