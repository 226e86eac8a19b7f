//! Error types for the IR crate.

use crate::gate::GateTag;
use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur while building or transforming IR values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{tag}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// The offending gate.
        tag: GateTag,
        /// Arity fixed by the tag (or the matrix dimension).
        expected: u32,
        /// Number of qubits supplied.
        got: u32,
    },

    /// Gate constructed with the wrong number of parameters.
    #[error("Gate '{tag}' takes {expected} parameters, got {got}")]
    ParamCountMismatch {
        /// The offending gate.
        tag: GateTag,
        /// Parameter arity fixed by the tag.
        expected: usize,
        /// Number of parameters supplied.
        got: usize,
    },

    /// Qubit index outside the circuit's declared register.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit circuit{}", format_gate_context(.tag))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Declared qubit count of the circuit.
        num_qubits: u32,
        /// Gate that referenced the qubit, if known.
        tag: Option<GateTag>,
    },

    /// The same qubit appears twice in one instruction.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.tag))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate that referenced the qubit, if known.
        tag: Option<GateTag>,
    },

    /// A `Unitary` gate was given a matrix that is not a unitary of
    /// power-of-two dimension.
    #[error("Invalid unitary matrix: {0}")]
    InvalidMatrix(String),

    /// Parameter is unbound.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// A parameter expression has no finite value, e.g. it divides by zero.
    #[error("Parameter expression '{0}' does not evaluate to a finite number")]
    InvalidExpression(String),

    /// Parameter reference does not belong to this circuit's registry.
    #[error("Parameter #{id} ('{name}') is not registered in this circuit")]
    UnknownParameter {
        /// The dangling reference id.
        id: u32,
        /// Its display name.
        name: String,
    },

    /// A textual parameter expression could not be parsed.
    #[error("Cannot parse parameter expression '{text}': {reason}")]
    ParameterSyntax {
        /// The rejected text.
        text: String,
        /// What went wrong.
        reason: String,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(tag: &Option<GateTag>) -> String {
    match tag {
        Some(tag) => format!(" (gate: {tag})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
