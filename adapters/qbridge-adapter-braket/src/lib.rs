//! qbridge adapter for Amazon Braket
//!
//! Converts between Braket JAQCD programs (`braket.ir.jaqcd.program`) and the
//! qbridge IR.
//!
//! Braket has no declared width: a decoded circuit spans up to the highest
//! qubit index used. Measurement is implicit, so encoding drops `Measure`
//! instructions and decoding produces none. Angles may be free-parameter
//! expressions such as `"2*alpha"`.
//!
//! # Example
//!
//! ```rust
//! use qbridge_adapter_braket::{BraketAdapter, BraketProgram};
//! use qbridge_ir::GateTag;
//! use qbridge_synth::FrameworkAdapter;
//!
//! let program = BraketProgram::from_json(
//!     r#"{"braketSchemaHeader": {"name": "braket.ir.jaqcd.program", "version": "1"},
//!         "instructions": [{"type": "h", "target": 0},
//!                          {"type": "cnot", "control": 0, "target": 1}]}"#,
//! )
//! .unwrap();
//! let circuit = BraketAdapter.decode(&program).unwrap();
//! assert_eq!(circuit.instructions()[1].tag(), GateTag::CX);
//! ```

mod adapter;
mod program;

pub use adapter::{BRAKET_TABLE, BraketAdapter};
pub use program::{BraketAngle, BraketInstruction, BraketProgram, JAQCD_SCHEMA, SchemaHeader};
