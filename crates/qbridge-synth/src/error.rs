//! Error types for decomposition, equivalence checking and target lowering.

use qbridge_ir::{FrameworkId, GateTag, IrError};
use thiserror::Error;

/// Errors raised by the decomposition engine and the equivalence oracle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// No rule or numeric synthesis applies to the gate.
    #[error("Cannot decompose {arity}-qubit gate '{tag}': {reason}")]
    Decomposition {
        /// The gate that could not be lowered.
        tag: GateTag,
        /// Its qubit arity.
        arity: u32,
        /// Why no substitute was produced.
        reason: String,
    },

    /// The equivalence oracle refused a circuit wider than its ceiling.
    #[error("Circuit has {qubits} qubits; unitary comparison is limited to {limit}")]
    ResourceLimit {
        /// Width of the offending circuit.
        qubits: u32,
        /// Configured ceiling.
        limit: u32,
    },

    /// The two circuits under comparison act on different qubit counts.
    #[error("Cannot compare a {left}-qubit circuit with a {right}-qubit circuit")]
    QubitCountMismatch {
        /// Width of the first circuit.
        left: u32,
        /// Width of the second circuit.
        right: u32,
    },

    /// IR construction failed while building substitutes.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors raised while decoding from or encoding to a framework.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The source contains an operation the framework's table does not know.
    #[error("{framework}: unsupported gate '{native}'")]
    UnsupportedGate {
        /// Framework being decoded.
        framework: FrameworkId,
        /// Native operation name.
        native: String,
    },

    /// A gate could not be expressed in the target framework.
    #[error("{framework}: cannot convert {arity}-qubit gate '{tag}': {source}")]
    Conversion {
        /// Target framework.
        framework: FrameworkId,
        /// The gate that failed to lower.
        tag: GateTag,
        /// Its qubit arity.
        arity: u32,
        /// The underlying decomposition failure.
        #[source]
        source: SynthError,
    },

    /// A free parameter reached a framework that only accepts point values.
    #[error("{framework}: parameter '{name}' is unbound")]
    UnboundParameter {
        /// Target framework.
        framework: FrameworkId,
        /// Name of the parameter with no binding.
        name: String,
    },

    /// The native input is structurally invalid.
    #[error("{framework}: malformed circuit: {reason}")]
    Malformed {
        /// Framework being decoded.
        framework: FrameworkId,
        /// What is wrong with the input.
        reason: String,
    },

    /// The decoded operations violate an IR invariant.
    #[error("{framework}: {source}")]
    Ir {
        /// Framework being converted.
        framework: FrameworkId,
        /// The violated invariant.
        #[source]
        source: IrError,
    },
}

impl ConvertError {
    /// Shorthand for [`ConvertError::Malformed`].
    pub fn malformed(framework: FrameworkId, reason: impl Into<String>) -> Self {
        ConvertError::Malformed {
            framework,
            reason: reason.into(),
        }
    }

    /// Attach `framework` to an IR error; unbound parameters keep their
    /// own variant.
    pub fn ir(framework: FrameworkId, source: IrError) -> Self {
        match source {
            IrError::UnboundParameter(name) => ConvertError::UnboundParameter { framework, name },
            source => ConvertError::Ir { framework, source },
        }
    }

    /// Framework the error was raised for.
    pub fn framework(&self) -> FrameworkId {
        match self {
            ConvertError::UnsupportedGate { framework, .. }
            | ConvertError::Conversion { framework, .. }
            | ConvertError::UnboundParameter { framework, .. }
            | ConvertError::Malformed { framework, .. }
            | ConvertError::Ir { framework, .. } => *framework,
        }
    }
}

/// Result type for adapter operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Attach a framework to IR errors raised during conversion.
pub trait IrResultExt<T> {
    /// Map an [`IrError`] into [`ConvertError::Ir`] for `framework`.
    fn for_framework(self, framework: FrameworkId) -> ConvertResult<T>;
}

impl<T> IrResultExt<T> for Result<T, IrError> {
    fn for_framework(self, framework: FrameworkId) -> ConvertResult<T> {
        self.map_err(|source| ConvertError::ir(framework, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_display_names_gate_and_arity() {
        let err = ConvertError::Conversion {
            framework: FrameworkId::IonQ,
            tag: GateTag::Unitary,
            arity: 3,
            source: SynthError::Decomposition {
                tag: GateTag::Unitary,
                arity: 3,
                reason: "no rule".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("ionq"));
        assert!(msg.contains("3-qubit"));
        assert!(msg.contains("unitary"));
    }

    #[test]
    fn test_unbound_ir_error_maps_to_unbound_parameter() {
        let res: Result<(), IrError> = Err(IrError::UnboundParameter("theta".into()));
        let err = res.for_framework(FrameworkId::OpenQasm2).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnboundParameter { ref name, .. } if name == "theta"
        ));
        assert_eq!(err.framework(), FrameworkId::OpenQasm2);
    }

    #[test]
    fn test_resource_limit_display() {
        let err = SynthError::ResourceLimit {
            qubits: 14,
            limit: 12,
        };
        assert_eq!(
            err.to_string(),
            "Circuit has 14 qubits; unitary comparison is limited to 12"
        );
    }
}
