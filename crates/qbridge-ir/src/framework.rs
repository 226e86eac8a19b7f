//! Identifiers of the supported source/target frameworks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A quantum programming framework with its own native circuit model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkId {
    /// IBM Qiskit (`QuantumCircuit` JSON model).
    Qiskit,
    /// Google Cirq (`cirq.to_json` model).
    Cirq,
    /// Amazon Braket (JAQCD program).
    Braket,
    /// IonQ (`ionq.circuit.v0` JSON).
    #[serde(rename = "ionq")]
    IonQ,
    /// OpenQASM 2.0 text.
    #[serde(rename = "qasm2")]
    OpenQasm2,
    /// OpenQASM 3.0 text.
    #[serde(rename = "qasm3")]
    OpenQasm3,
}

impl FrameworkId {
    /// Every supported framework.
    pub const ALL: [FrameworkId; 6] = [
        FrameworkId::Qiskit,
        FrameworkId::Cirq,
        FrameworkId::Braket,
        FrameworkId::IonQ,
        FrameworkId::OpenQasm2,
        FrameworkId::OpenQasm3,
    ];

    /// Short lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            FrameworkId::Qiskit => "qiskit",
            FrameworkId::Cirq => "cirq",
            FrameworkId::Braket => "braket",
            FrameworkId::IonQ => "ionq",
            FrameworkId::OpenQasm2 => "qasm2",
            FrameworkId::OpenQasm3 => "qasm3",
        }
    }
}

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qiskit" => Ok(FrameworkId::Qiskit),
            "cirq" => Ok(FrameworkId::Cirq),
            "braket" => Ok(FrameworkId::Braket),
            "ionq" => Ok(FrameworkId::IonQ),
            "qasm2" | "openqasm2" => Ok(FrameworkId::OpenQasm2),
            "qasm3" | "openqasm3" => Ok(FrameworkId::OpenQasm3),
            other => Err(format!("unknown framework '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for fw in FrameworkId::ALL {
            assert_eq!(fw.name().parse::<FrameworkId>().unwrap(), fw);
        }
        assert!("quil".parse::<FrameworkId>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FrameworkId::OpenQasm3).unwrap();
        assert_eq!(json, "\"qasm3\"");
        let fw: FrameworkId = serde_json::from_str("\"ionq\"").unwrap();
        assert_eq!(fw, FrameworkId::IonQ);
    }
}
