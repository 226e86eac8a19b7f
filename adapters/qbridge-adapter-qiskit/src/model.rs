//! Serde model of a serialized Qiskit `QuantumCircuit`.
//!
//! ```json
//! {
//!   "num_qubits": 2,
//!   "num_clbits": 2,
//!   "parameters": ["theta"],
//!   "data": [
//!     {"name": "h", "qubits": [0]},
//!     {"name": "rz", "qubits": [1], "params": ["2*theta"]},
//!     {"name": "cx", "qubits": [0, 1]},
//!     {"name": "measure", "qubits": [0], "clbits": [0]}
//!   ]
//! }
//! ```
//!
//! Dense matrices (`unitary` instructions) are rows of `[re, im]` pairs in
//! Qiskit's little-endian qubit order.

use qbridge_ir::FrameworkId;
use qbridge_synth::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

/// A circuit as Qiskit serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QiskitCircuit {
    /// Circuit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Width of the quantum register.
    pub num_qubits: u32,
    /// Width of the classical register.
    #[serde(default)]
    pub num_clbits: u32,
    /// Global phase in radians. Ignored on decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_phase: Option<f64>,
    /// Declared `Parameter` names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// Instructions in program order.
    pub data: Vec<QiskitInstruction>,
}

/// One `CircuitInstruction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QiskitInstruction {
    /// Operation name, e.g. `"cx"`.
    pub name: String,
    /// Qubit indices.
    pub qubits: Vec<u32>,
    /// Classical bit indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<u32>,
    /// Gate parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<QiskitParam>,
    /// The operation's matrix, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<[f64; 2]>>>,
}

/// A bound value or a `ParameterExpression` rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QiskitParam {
    /// A numeric value.
    Value(f64),
    /// An expression such as `"2*theta + pi/4"`.
    Expression(String),
}

impl QiskitCircuit {
    /// Parse the JSON form.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ConvertError::malformed(FrameworkId::Qiskit, e.to_string()))
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> ConvertResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::malformed(FrameworkId::Qiskit, e.to_string()))
    }
}
