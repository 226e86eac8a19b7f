//! Braket JAQCD program model.

use qbridge_ir::FrameworkId;
use qbridge_synth::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

/// Schema name every JAQCD program carries.
pub const JAQCD_SCHEMA: &str = "braket.ir.jaqcd.program";

/// A `braket.ir.jaqcd.Program`.
///
/// Result types and basis rotations are not modeled; serde skips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraketProgram {
    #[serde(rename = "braketSchemaHeader")]
    pub header: SchemaHeader,
    pub instructions: Vec<BraketInstruction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaHeader {
    pub name: String,
    pub version: String,
}

impl Default for SchemaHeader {
    fn default() -> Self {
        Self {
            name: JAQCD_SCHEMA.to_string(),
            version: "1".to_string(),
        }
    }
}

/// One instruction. Operand fields depend on the gate type: single-qubit
/// gates use `target`, controlled gates add `control` or `controls`, and
/// symmetric multi-qubit gates list `targets`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BraketInstruction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<BraketAngle>,
    /// Rows of `[re, im]` pairs, big-endian.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<[f64; 2]>>>,
}

/// A rotation angle: a value, or an expression over free parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BraketAngle {
    Value(f64),
    FreeParameter(String),
}

impl BraketInstruction {
    /// Operands in IR order: controls first, then targets.
    pub fn qubits(&self) -> Vec<u32> {
        self.control
            .into_iter()
            .chain(self.controls.iter().flatten().copied())
            .chain(self.target)
            .chain(self.targets.iter().flatten().copied())
            .collect()
    }
}

impl BraketProgram {
    /// A program with the default header.
    pub fn new(instructions: Vec<BraketInstruction>) -> Self {
        Self {
            header: SchemaHeader::default(),
            instructions,
        }
    }

    /// Parse the JSON form.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ConvertError::malformed(FrameworkId::Braket, e.to_string()))
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> ConvertResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::malformed(FrameworkId::Braket, e.to_string()))
    }

    /// One past the highest qubit any instruction touches.
    pub fn num_qubits(&self) -> ConvertResult<u32> {
        let Some(highest) = self
            .instructions
            .iter()
            .flat_map(BraketInstruction::qubits)
            .max()
        else {
            return Ok(0);
        };
        highest.checked_add(1).ok_or_else(|| {
            ConvertError::malformed(
                FrameworkId::Braket,
                format!("qubit index {highest} is out of range"),
            )
        })
    }
}
