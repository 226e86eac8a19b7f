//! The contract every framework adapter implements.

use qbridge_ir::{Bindings, Circuit, DispatchTable, FrameworkId};

use crate::error::ConvertResult;
use crate::lower::{lower, lower_with_tolerance};

/// Converts between one framework's native circuit model and the IR.
///
/// `decode` followed by `encode` (and the reverse) preserves the circuit's
/// unitary up to global phase for every gate in the adapter's table.
pub trait FrameworkAdapter {
    /// The framework's native circuit representation.
    type Native;

    /// The framework this adapter speaks.
    fn framework(&self) -> FrameworkId;

    /// The adapter's gate table.
    fn dispatch_table(&self) -> &'static DispatchTable;

    /// Convert a native circuit into the IR.
    fn decode(&self, native: &Self::Native) -> ConvertResult<Circuit>;

    /// Serialize a circuit that already uses only gates from the table.
    fn emit(&self, lowered: &Circuit) -> ConvertResult<Self::Native>;

    /// Convert an IR circuit, decomposing whatever the table lacks.
    fn encode(&self, circuit: &Circuit, bindings: &Bindings) -> ConvertResult<Self::Native> {
        self.emit(&self.lower(circuit, bindings)?)
    }

    /// [`encode`](Self::encode) with an explicit phase-detection tolerance.
    fn encode_with_tolerance(
        &self,
        circuit: &Circuit,
        bindings: &Bindings,
        atol: f64,
    ) -> ConvertResult<Self::Native> {
        self.emit(&lower_with_tolerance(
            circuit,
            self.dispatch_table(),
            bindings,
            atol,
        )?)
    }

    /// Lower `circuit` onto this adapter's table without serializing it.
    fn lower(&self, circuit: &Circuit, bindings: &Bindings) -> ConvertResult<Circuit> {
        lower(circuit, self.dispatch_table(), bindings)
    }
}
