//! OpenQASM 2.0 and 3.0 adapters for qbridge
//!
//! Parses OpenQASM text into the qbridge IR and emits lowered circuits back
//! to text. Both versions share one lexer and parser; [`QasmAdapter`] picks
//! the version-specific dispatch table and header.
//!
//! # Supported Features
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version declaration | ✅ | `OPENQASM 2.0;`, `OPENQASM 3.0;` |
//! | Registers | ✅ | `qreg q[5];`, `qubit[5] q;`, `bit[5] c;` |
//! | Free parameters (3.0) | ✅ | `input float[64] theta;` |
//! | Standard gates and aliases | ✅ | `h q[0];`, `u3(a,b,c) q[0];`, `cnot q[0], q[1];` |
//! | Register broadcast | ✅ | `h q;`, `measure q -> c;` |
//! | Gate definitions | ✅ inlined | `gate bell a, b { h a; cx a, b; }` |
//! | Measurements | ✅ | `c = measure q;` |
//! | Barriers | elided | `barrier q;` |
//! | Reset, classical control | ❌ | `reset q[0];` |
//!
//! # Example: Parsing QASM
//!
//! ```rust
//! use qbridge_qasm::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.len(), 4);
//! ```
//!
//! # Example: Round-Trip through the adapter
//!
//! ```rust
//! use qbridge_ir::Bindings;
//! use qbridge_qasm::QasmAdapter;
//! use qbridge_synth::FrameworkAdapter;
//!
//! let adapter = QasmAdapter::v3();
//! let source = "OPENQASM 3.0;\nqubit[2] q;\nh q[0];\ncx q[0], q[1];\n".to_string();
//!
//! let circuit = adapter.decode(&source).unwrap();
//! let emitted = adapter.encode(&circuit, &Bindings::new()).unwrap();
//! assert!(emitted.contains("cx q[0], q[1];"));
//! assert_eq!(adapter.decode(&emitted).unwrap(), circuit);
//! ```

mod adapter;
mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use adapter::{QASM2_TABLE, QASM3_TABLE, QasmAdapter, QasmVersion};
pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_program};

/// Syntax tree types, for callers that want the program before lowering.
pub mod syntax {
    pub use crate::ast::*;
}
