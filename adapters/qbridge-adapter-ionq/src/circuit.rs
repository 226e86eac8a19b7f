//! IonQ `ionq.circuit.v0` JSON model.

use qbridge_ir::FrameworkId;
use qbridge_synth::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

/// Value of the `format` field.
pub const IONQ_FORMAT: &str = "ionq.circuit.v0";

/// The abstract gate set; the hardware-native `gpi`/`ms` set is not accepted.
pub const QIS_GATESET: &str = "qis";

/// An IonQ circuit payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonQCircuit {
    /// Always [`IONQ_FORMAT`].
    pub format: String,
    /// Gate set the circuit is written in.
    #[serde(default = "default_gateset")]
    pub gateset: String,
    /// Number of qubits the job reserves.
    pub qubits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gates in program order.
    pub circuit: Vec<IonQGate>,
}

fn default_gateset() -> String {
    QIS_GATESET.to_string()
}

/// One gate entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IonQGate {
    pub gate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<u32>>,
    /// Rotation angle in radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl IonQGate {
    /// Control qubits, whichever field holds them.
    pub fn control_qubits(&self) -> Vec<u32> {
        self.control
            .into_iter()
            .chain(self.controls.iter().flatten().copied())
            .collect()
    }

    /// Operands in IR order: controls first, then targets.
    pub fn qubits(&self) -> Vec<u32> {
        let mut out = self.control_qubits();
        out.extend(self.target);
        out.extend(self.targets.iter().flatten().copied());
        out
    }
}

impl IonQCircuit {
    /// A `qis` circuit over `qubits` qubits.
    pub fn new(qubits: u32, circuit: Vec<IonQGate>) -> Self {
        Self {
            format: IONQ_FORMAT.to_string(),
            gateset: default_gateset(),
            qubits,
            name: None,
            circuit,
        }
    }

    /// Parse the JSON form.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ConvertError::malformed(FrameworkId::IonQ, e.to_string()))
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> ConvertResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::malformed(FrameworkId::IonQ, e.to_string()))
    }
}
