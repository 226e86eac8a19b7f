//! Error types for transpilation.

use qbridge_ir::{FrameworkId, GateTag, IrError};
use qbridge_synth::{ConvertError, SynthError};
use thiserror::Error;

/// Errors raised by [`transpile`](crate::transpile) and
/// [`circuits_equivalent`](crate::circuits_equivalent).
///
/// Every variant is terminal for the call that raised it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspileError {
    /// The input's framework could not be determined.
    #[error("Unsupported circuit: {0}")]
    UnsupportedCircuit(String),

    /// A native operation matches no gate tag and carries no matrix.
    #[error("{framework}: unsupported gate '{native}'")]
    UnsupportedGate {
        /// Framework being decoded.
        framework: FrameworkId,
        /// Native operation name.
        native: String,
    },

    /// Encoding or decoding failed.
    #[error("{framework}: conversion failed: {reason}")]
    Conversion {
        /// Framework being converted.
        framework: FrameworkId,
        /// What went wrong.
        reason: String,
        /// The gate involved, when one is.
        tag: Option<GateTag>,
        /// Its qubit arity, when a gate is involved.
        arity: Option<u32>,
        /// The underlying failure.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No closed-form or numeric substitute exists for a gate.
    #[error("Cannot decompose {arity}-qubit gate '{tag}': {reason}")]
    Decomposition {
        /// The gate.
        tag: GateTag,
        /// Its qubit arity.
        arity: u32,
        /// Why no substitute was produced.
        reason: String,
    },

    /// A free parameter reached a framework that needs point values.
    #[error("{framework}: parameter '{name}' is unbound")]
    UnboundParameter {
        /// Target framework.
        framework: FrameworkId,
        /// Name of the parameter.
        name: String,
    },

    /// The circuit is too wide for dense unitary comparison.
    #[error("Circuit has {qubits} qubits; unitary comparison is limited to {limit}")]
    ResourceLimit {
        /// Width of the circuit.
        qubits: u32,
        /// Configured ceiling.
        limit: u32,
    },
}

/// Result type for transpilation.
pub type TranspileResult<T> = Result<T, TranspileError>;

impl TranspileError {
    /// Attach a framework to an oracle or IR failure.
    pub(crate) fn from_synth(framework: FrameworkId, err: SynthError) -> Self {
        match err {
            SynthError::Decomposition { tag, arity, reason } => {
                TranspileError::Decomposition { tag, arity, reason }
            }
            SynthError::ResourceLimit { qubits, limit } => {
                TranspileError::ResourceLimit { qubits, limit }
            }
            SynthError::Ir(IrError::UnboundParameter(name)) => {
                TranspileError::UnboundParameter { framework, name }
            }
            other => TranspileError::Conversion {
                framework,
                reason: other.to_string(),
                tag: None,
                arity: None,
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<ConvertError> for TranspileError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::UnsupportedGate { framework, native } => {
                TranspileError::UnsupportedGate { framework, native }
            }
            ConvertError::UnboundParameter { framework, name } => {
                TranspileError::UnboundParameter { framework, name }
            }
            ConvertError::Conversion {
                framework,
                tag,
                arity,
                source,
            } => TranspileError::Conversion {
                framework,
                reason: source.to_string(),
                tag: Some(tag),
                arity: Some(arity),
                source: Some(Box::new(source)),
            },
            other => {
                let framework = other.framework();
                TranspileError::Conversion {
                    framework,
                    reason: other.to_string(),
                    tag: None,
                    arity: None,
                    source: Some(Box::new(other)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowering_failure_keeps_gate_and_arity() {
        let err = TranspileError::from(ConvertError::Conversion {
            framework: FrameworkId::IonQ,
            tag: GateTag::Unitary,
            arity: 3,
            source: SynthError::Decomposition {
                tag: GateTag::Unitary,
                arity: 3,
                reason: "no rule".into(),
            },
        });
        assert!(matches!(
            err,
            TranspileError::Conversion {
                framework: FrameworkId::IonQ,
                tag: Some(GateTag::Unitary),
                arity: Some(3),
                ..
            }
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_oracle_errors_map_to_taxonomy() {
        let err = TranspileError::from_synth(
            FrameworkId::Qiskit,
            SynthError::ResourceLimit {
                qubits: 13,
                limit: 12,
            },
        );
        assert!(matches!(
            err,
            TranspileError::ResourceLimit {
                qubits: 13,
                limit: 12
            }
        ));

        let err = TranspileError::from_synth(
            FrameworkId::Cirq,
            SynthError::Ir(IrError::UnboundParameter("phi".into())),
        );
        assert!(matches!(
            err,
            TranspileError::UnboundParameter { ref name, .. } if name == "phi"
        ));
    }

    #[test]
    fn test_unbound_passes_through() {
        let err = TranspileError::from(ConvertError::UnboundParameter {
            framework: FrameworkId::OpenQasm2,
            name: "theta".into(),
        });
        assert_eq!(err.to_string(), "qasm2: parameter 'theta' is unbound");
    }
}
