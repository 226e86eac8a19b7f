//! The framework registry: one adapter and one dispatch table per
//! [`FrameworkId`], resolved by `match` so adding a framework is a compile
//! error until every entry point handles it.

use qbridge_adapter_braket::{BRAKET_TABLE, BraketAdapter};
use qbridge_adapter_cirq::{CIRQ_TABLE, CirqAdapter};
use qbridge_adapter_ionq::{IONQ_TABLE, IonQAdapter};
use qbridge_adapter_qiskit::{QISKIT_TABLE, QiskitAdapter};
use qbridge_ir::{Bindings, Circuit, DispatchTable, FrameworkId};
use qbridge_qasm::{QASM2_TABLE, QASM3_TABLE, QasmAdapter};
use qbridge_synth::FrameworkAdapter;
use tracing::instrument;

use crate::error::TranspileResult;
use crate::native::NativeCircuit;

/// The gate table of `framework`.
pub fn dispatch_table(framework: FrameworkId) -> &'static DispatchTable {
    match framework {
        FrameworkId::Qiskit => &QISKIT_TABLE,
        FrameworkId::Cirq => &CIRQ_TABLE,
        FrameworkId::Braket => &BRAKET_TABLE,
        FrameworkId::IonQ => &IONQ_TABLE,
        FrameworkId::OpenQasm2 => &QASM2_TABLE,
        FrameworkId::OpenQasm3 => &QASM3_TABLE,
    }
}

/// Decode a native circuit with its framework's adapter.
#[instrument(skip_all, fields(framework = %native.framework()))]
pub fn decode(native: &NativeCircuit) -> TranspileResult<Circuit> {
    let circuit = match native {
        NativeCircuit::Qiskit(c) => QiskitAdapter.decode(c)?,
        NativeCircuit::Cirq(c) => CirqAdapter.decode(c)?,
        NativeCircuit::Braket(c) => BraketAdapter.decode(c)?,
        NativeCircuit::IonQ(c) => IonQAdapter.decode(c)?,
        NativeCircuit::OpenQasm2(text) => QasmAdapter::v2().decode(text)?,
        NativeCircuit::OpenQasm3(text) => QasmAdapter::v3().decode(text)?,
    };
    Ok(circuit)
}

/// Lower `circuit` onto `target`'s table and encode the result.
///
/// `atol` is the tolerance single-qubit synthesis uses to recognize phase
/// gates.
#[instrument(skip_all, fields(%target, ops = circuit.len()))]
pub fn encode(
    circuit: &Circuit,
    target: FrameworkId,
    bindings: &Bindings,
    atol: f64,
) -> TranspileResult<NativeCircuit> {
    let native: NativeCircuit = match target {
        FrameworkId::Qiskit => QiskitAdapter
            .encode_with_tolerance(circuit, bindings, atol)?
            .into(),
        FrameworkId::Cirq => CirqAdapter
            .encode_with_tolerance(circuit, bindings, atol)?
            .into(),
        FrameworkId::Braket => BraketAdapter
            .encode_with_tolerance(circuit, bindings, atol)?
            .into(),
        FrameworkId::IonQ => IonQAdapter
            .encode_with_tolerance(circuit, bindings, atol)?
            .into(),
        FrameworkId::OpenQasm2 => NativeCircuit::OpenQasm2(
            QasmAdapter::v2().encode_with_tolerance(circuit, bindings, atol)?,
        ),
        FrameworkId::OpenQasm3 => NativeCircuit::OpenQasm3(
            QasmAdapter::v3().encode_with_tolerance(circuit, bindings, atol)?,
        ),
    };
    Ok(native)
}
