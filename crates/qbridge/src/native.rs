//! Native circuit values and framework detection.

use qbridge_adapter_braket::BraketProgram;
use qbridge_adapter_cirq::CirqCircuit;
use qbridge_adapter_ionq::{IONQ_FORMAT, IonQCircuit};
use qbridge_adapter_qiskit::QiskitCircuit;
use qbridge_ir::FrameworkId;
use qbridge_qasm::QasmVersion;
use serde_json::Value;
use tracing::debug;

use crate::error::{TranspileError, TranspileResult};

/// A circuit in one framework's native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCircuit {
    /// Qiskit `QuantumCircuit` JSON model.
    Qiskit(QiskitCircuit),
    /// Cirq JSON circuit.
    Cirq(CirqCircuit),
    /// Braket JAQCD program.
    Braket(BraketProgram),
    /// IonQ `ionq.circuit.v0` circuit.
    IonQ(IonQCircuit),
    /// OpenQASM 2.0 source.
    OpenQasm2(String),
    /// OpenQASM 3.0 source.
    OpenQasm3(String),
}

impl NativeCircuit {
    /// Framework the circuit belongs to.
    pub fn framework(&self) -> FrameworkId {
        match self {
            NativeCircuit::Qiskit(_) => FrameworkId::Qiskit,
            NativeCircuit::Cirq(_) => FrameworkId::Cirq,
            NativeCircuit::Braket(_) => FrameworkId::Braket,
            NativeCircuit::IonQ(_) => FrameworkId::IonQ,
            NativeCircuit::OpenQasm2(_) => FrameworkId::OpenQasm2,
            NativeCircuit::OpenQasm3(_) => FrameworkId::OpenQasm3,
        }
    }

    /// Work out which framework `text` was written for and parse it.
    ///
    /// | Input | Framework |
    /// |-------|-----------|
    /// | `OPENQASM 2.x;` header | OpenQASM 2 |
    /// | `OPENQASM 3.x;` header | OpenQASM 3 |
    /// | JSON with `braketSchemaHeader` | Braket |
    /// | JSON with `format: "ionq.circuit.v0"` | IonQ |
    /// | JSON with `cirq_type: "Circuit"` | Cirq |
    /// | JSON with `data` and `num_qubits` | Qiskit |
    pub fn detect(text: &str) -> TranspileResult<Self> {
        if let Some(version) = QasmVersion::detect(text) {
            debug!(framework = %version.framework(), "detected OpenQASM source");
            return Ok(match version {
                QasmVersion::V2 => NativeCircuit::OpenQasm2(text.to_string()),
                QasmVersion::V3 => NativeCircuit::OpenQasm3(text.to_string()),
            });
        }

        let value: Value = serde_json::from_str(text).map_err(|_| {
            TranspileError::UnsupportedCircuit(
                "input is neither OpenQASM nor a JSON circuit".into(),
            )
        })?;
        let framework = detect_json(&value).ok_or_else(|| {
            TranspileError::UnsupportedCircuit("JSON does not match any known circuit model".into())
        })?;
        debug!(%framework, "detected JSON circuit");
        Self::parse(framework, text)
    }

    /// Parse `text` as a circuit of a known framework.
    pub fn parse(framework: FrameworkId, text: &str) -> TranspileResult<Self> {
        Ok(match framework {
            FrameworkId::Qiskit => NativeCircuit::Qiskit(QiskitCircuit::from_json(text)?),
            FrameworkId::Cirq => NativeCircuit::Cirq(CirqCircuit::from_json(text)?),
            FrameworkId::Braket => NativeCircuit::Braket(BraketProgram::from_json(text)?),
            FrameworkId::IonQ => NativeCircuit::IonQ(IonQCircuit::from_json(text)?),
            FrameworkId::OpenQasm2 => NativeCircuit::OpenQasm2(text.to_string()),
            FrameworkId::OpenQasm3 => NativeCircuit::OpenQasm3(text.to_string()),
        })
    }

    /// Render as text: pretty-printed JSON or OpenQASM source.
    pub fn to_text(&self) -> TranspileResult<String> {
        Ok(match self {
            NativeCircuit::Qiskit(c) => c.to_json()?,
            NativeCircuit::Cirq(c) => c.to_json()?,
            NativeCircuit::Braket(c) => c.to_json()?,
            NativeCircuit::IonQ(c) => c.to_json()?,
            NativeCircuit::OpenQasm2(text) | NativeCircuit::OpenQasm3(text) => text.clone(),
        })
    }
}

fn detect_json(value: &Value) -> Option<FrameworkId> {
    let object = value.as_object()?;
    if object.contains_key("braketSchemaHeader") {
        return Some(FrameworkId::Braket);
    }
    if object.get("format").and_then(Value::as_str) == Some(IONQ_FORMAT) {
        return Some(FrameworkId::IonQ);
    }
    if object.get("cirq_type").and_then(Value::as_str) == Some("Circuit") {
        return Some(FrameworkId::Cirq);
    }
    if object.contains_key("data") && object.contains_key("num_qubits") {
        return Some(FrameworkId::Qiskit);
    }
    None
}

impl From<QiskitCircuit> for NativeCircuit {
    fn from(c: QiskitCircuit) -> Self {
        NativeCircuit::Qiskit(c)
    }
}

impl From<CirqCircuit> for NativeCircuit {
    fn from(c: CirqCircuit) -> Self {
        NativeCircuit::Cirq(c)
    }
}

impl From<BraketProgram> for NativeCircuit {
    fn from(c: BraketProgram) -> Self {
        NativeCircuit::Braket(c)
    }
}

impl From<IonQCircuit> for NativeCircuit {
    fn from(c: IonQCircuit) -> Self {
        NativeCircuit::IonQ(c)
    }
}
