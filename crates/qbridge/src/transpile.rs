//! The transpile and equivalence entry points.

use qbridge_ir::{Circuit, FrameworkId, QubitId, canonical};
use qbridge_synth::EquivalenceOracle;
use tracing::{debug, info, instrument};

use crate::error::{TranspileError, TranspileResult};
use crate::native::NativeCircuit;
use crate::options::TranspileOptions;
use crate::registry;

/// Convert `source` into `target`'s native representation.
///
/// The circuit is decoded, compressed onto dense indices when
/// `options.ensure_contiguous` is set, lowered onto the target's gate table
/// (decomposing whatever it lacks) and encoded.
#[instrument(skip_all, fields(source = %source.framework(), %target))]
pub fn transpile(
    source: &NativeCircuit,
    target: FrameworkId,
    options: &TranspileOptions,
) -> TranspileResult<NativeCircuit> {
    let circuit = registry::decode(source)?;
    let circuit = canonicalize(circuit, source.framework(), options)?;
    let native = registry::encode(&circuit, target, &options.bindings, options.atol)?;
    info!(
        qubits = circuit.num_qubits(),
        ops = circuit.len(),
        "transpiled circuit"
    );
    Ok(native)
}

/// Detect the framework of `text`, transpile it, and render the result.
pub fn transpile_text(
    text: &str,
    target: FrameworkId,
    options: &TranspileOptions,
) -> TranspileResult<String> {
    let source = NativeCircuit::detect(text)?;
    transpile(&source, target, options)?.to_text()
}

/// Whether `a` and `b` implement the same unitary up to global phase, with
/// default options and `atol` if given.
pub fn circuits_equivalent(
    a: &NativeCircuit,
    b: &NativeCircuit,
    atol: Option<f64>,
) -> TranspileResult<bool> {
    let mut options = TranspileOptions::default();
    if let Some(atol) = atol {
        options.atol = atol;
    }
    circuits_equivalent_with(a, b, &options)
}

/// [`circuits_equivalent`] with full options.
///
/// Both circuits are decoded, bound with `options.bindings`, and compressed
/// in forward order when `options.ensure_contiguous` is set. Qubit indices
/// are absolute in every framework, so a circuit declaring fewer qubits is
/// widened with idle qubits to the other's width before comparison.
///
/// With `options.reverse_qubits` also set, `b` may be the output of
/// [`transpile`] on `a`, whose qubit order is mirrored. The circuits then
/// count as equivalent when either `a` or its mirror image matches `b`.
#[instrument(skip_all, fields(a = %a.framework(), b = %b.framework()))]
pub fn circuits_equivalent_with(
    a: &NativeCircuit,
    b: &NativeCircuit,
    options: &TranspileOptions,
) -> TranspileResult<bool> {
    let ca = prepare(a, options)?;
    let cb = prepare(b, options)?;
    let oracle = EquivalenceOracle::new(options.max_qubits, options.atol);

    let mut same = compare(&oracle, &ca, a.framework(), &cb, b.framework())?;
    if !same && options.ensure_contiguous && options.reverse_qubits {
        let mirrored = mirror(&ca).map_err(|e| ir_failure(a.framework(), e))?;
        same = compare(&oracle, &mirrored, a.framework(), &cb, b.framework())?;
    }
    debug!(same, "equivalence checked");
    Ok(same)
}

fn compare(
    oracle: &EquivalenceOracle,
    a: &Circuit,
    fa: FrameworkId,
    b: &Circuit,
    fb: FrameworkId,
) -> TranspileResult<bool> {
    let width = a.num_qubits().max(b.num_qubits());
    let a = widen(a, width).map_err(|e| ir_failure(fa, e))?;
    let b = widen(b, width).map_err(|e| ir_failure(fb, e))?;
    oracle
        .equivalent(&a, &b)
        .map_err(|e| TranspileError::from_synth(fa, e))
}

fn prepare(native: &NativeCircuit, options: &TranspileOptions) -> TranspileResult<Circuit> {
    let framework = native.framework();
    let circuit = registry::decode(native)?;
    let circuit = circuit
        .bind(&options.bindings)
        .map_err(|e| ir_failure(framework, e))?;
    if !options.ensure_contiguous {
        return Ok(circuit);
    }
    canonical::compress(&circuit, false).map_err(|e| ir_failure(framework, e))
}

fn canonicalize(
    circuit: Circuit,
    framework: FrameworkId,
    options: &TranspileOptions,
) -> TranspileResult<Circuit> {
    if !options.ensure_contiguous {
        return Ok(circuit);
    }
    canonical::compress(&circuit, options.reverse_qubits).map_err(|e| ir_failure(framework, e))
}

fn widen(circuit: &Circuit, width: u32) -> qbridge_ir::IrResult<Circuit> {
    if circuit.num_qubits() == width {
        return Ok(circuit.clone());
    }
    circuit.with_shape(width, circuit.instructions().to_vec())
}

/// Send qubit `q` to `n - 1 - q` across the circuit's declared width.
fn mirror(circuit: &Circuit) -> qbridge_ir::IrResult<Circuit> {
    let top = circuit.num_qubits().saturating_sub(1);
    let instructions = circuit
        .instructions()
        .iter()
        .map(|inst| inst.remap(|q| QubitId(top - q.0)))
        .collect::<qbridge_ir::IrResult<Vec<_>>>()?;
    circuit.with_shape(circuit.num_qubits(), instructions)
}

fn ir_failure(framework: FrameworkId, err: qbridge_ir::IrError) -> TranspileError {
    TranspileError::from(qbridge_synth::ConvertError::ir(framework, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL_QASM2: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0], q[1];\n";

    #[test]
    fn test_transpile_text_to_qasm3() {
        let out = transpile_text(BELL_QASM2, FrameworkId::OpenQasm3, &TranspileOptions::default())
            .unwrap();
        assert!(out.starts_with("OPENQASM 3.0;"));
        assert!(out.contains("cx q[0], q[1];"));
    }

    #[test]
    fn test_equivalent_widens_narrower_circuit() {
        let a = NativeCircuit::detect(BELL_QASM2).unwrap();
        let b = NativeCircuit::detect(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[3];\nh q[0];\ncx q[0], q[1];\n",
        )
        .unwrap();
        assert!(circuits_equivalent(&a, &b, None).unwrap());
    }

    #[test]
    fn test_different_circuits_are_not_equivalent() {
        let a = NativeCircuit::detect(BELL_QASM2).unwrap();
        let b = NativeCircuit::detect(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[1];\ncx q[1], q[0];\n",
        )
        .unwrap();
        assert!(!circuits_equivalent(&a, &b, None).unwrap());
        assert!(!circuits_equivalent(&b, &a, None).unwrap());
    }

    #[test]
    fn test_mirror_reverses_qubit_order() {
        let mut b = Circuit::builder(3, 0);
        b.h(QubitId(0)).unwrap();
        b.cx(QubitId(0), QubitId(1)).unwrap();
        let circuit = b.build();

        let mirrored = mirror(&circuit).unwrap();
        assert_eq!(mirrored.num_qubits(), 3);
        let operands: Vec<Vec<QubitId>> = mirrored
            .instructions()
            .iter()
            .map(|inst| inst.qubits().to_vec())
            .collect();
        assert_eq!(operands, vec![vec![QubitId(2)], vec![QubitId(2), QubitId(1)]]);
        assert_eq!(mirror(&mirrored).unwrap().instructions(), circuit.instructions());
    }
}
