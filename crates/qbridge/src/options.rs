//! Per-call transpilation options.

use qbridge_ir::Bindings;
use qbridge_synth::{DEFAULT_MAX_QUBITS, MAX_DENSE_QUBITS};

use crate::config::Config;

/// Default near-equality tolerance.
pub const DEFAULT_ATOL: f64 = 1e-7;

/// Options for [`transpile`](crate::transpile) and
/// [`circuits_equivalent`](crate::circuits_equivalent).
#[derive(Debug, Clone, PartialEq)]
pub struct TranspileOptions {
    /// Relabel the decoded circuit onto dense qubit indices before encoding.
    pub ensure_contiguous: bool,
    /// Reverse the dense order; only meaningful with `ensure_contiguous`.
    pub reverse_qubits: bool,
    /// Values for free parameters, by name.
    pub bindings: Bindings,
    /// Tolerance wherever the engine tests near-equality.
    pub atol: f64,
    /// Widest circuit the equivalence oracle multiplies out.
    pub max_qubits: u32,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            ensure_contiguous: false,
            reverse_qubits: false,
            bindings: Bindings::new(),
            atol: DEFAULT_ATOL,
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }
}

impl TranspileOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress qubit indices, optionally in reverse order.
    pub fn contiguous(mut self, reverse: bool) -> Self {
        self.ensure_contiguous = true;
        self.reverse_qubits = reverse;
        self
    }

    /// Bind one parameter.
    pub fn bind(mut self, name: impl Into<String>, value: f64) -> Self {
        self.bindings.insert(name, value);
        self
    }

    /// Replace the binding table.
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Set the near-equality tolerance. A non-positive or non-finite
    /// value keeps the current one.
    pub fn with_atol(mut self, atol: f64) -> Self {
        if atol.is_finite() && atol > 0.0 {
            self.atol = atol;
        }
        self
    }

    /// Set the oracle's qubit ceiling, clamped to `1..=MAX_DENSE_QUBITS`.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits.clamp(1, MAX_DENSE_QUBITS);
        self
    }
}

impl From<&Config> for TranspileOptions {
    fn from(config: &Config) -> Self {
        Self {
            ensure_contiguous: config.transpile.ensure_contiguous,
            reverse_qubits: config.transpile.reverse_qubits,
            bindings: Bindings::new(),
            atol: config.transpile.atol,
            max_qubits: config.oracle.max_qubits,
        }
    }
}
