//! Qubit-index canonicalization: dense compression and identity padding.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::circuit::{Circuit, DenseLayout};
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateTag};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Whether the referenced qubits form the dense range `0..num_qubits`.
pub fn is_contiguous(circuit: &Circuit) -> bool {
    let referenced = circuit.referenced_qubits();
    referenced.len() == circuit.num_qubits() as usize
}

/// Relabel referenced qubits onto `0..n`, dropping untouched indices.
///
/// With `reverse = false` the `k`-th smallest referenced index becomes `k`.
/// With `reverse = true`, compressed qubit `k` is the `(n-1-k)`-th smallest
/// referenced index. Instruction order is unchanged. Compressing a circuit
/// that was already compressed with the same `reverse` flag returns it as is.
pub fn compress(circuit: &Circuit, reverse: bool) -> IrResult<Circuit> {
    if circuit.layout() == Some(DenseLayout { reversed: reverse }) {
        return Ok(circuit.clone());
    }
    let referenced: Vec<QubitId> = circuit.referenced_qubits().into_iter().collect();
    let n = referenced.len() as u32;
    let map: FxHashMap<QubitId, QubitId> = referenced
        .iter()
        .enumerate()
        .map(|(k, &q)| {
            let k = k as u32;
            let target = if reverse { n - 1 - k } else { k };
            (q, QubitId(target))
        })
        .collect();
    debug!(
        from = circuit.num_qubits(),
        to = n,
        reverse,
        "compressing qubit indices"
    );

    let instructions = circuit
        .instructions()
        .iter()
        .map(|inst| inst.remap(|q| map.get(&q).copied().unwrap_or(q)))
        .collect::<IrResult<Vec<_>>>()?;
    Ok(circuit
        .with_shape(n, instructions)?
        .with_layout(Some(DenseLayout { reversed: reverse })))
}

/// Append one `pad_gate` instruction on every qubit in `0..num_qubits`
/// that no instruction touches.
///
/// `pad_gate` must be a parameterless single-qubit tag; the default choice
/// is [`GateTag::I`], see [`expand_identity`].
pub fn expand(circuit: &Circuit, pad_gate: GateTag) -> IrResult<Circuit> {
    let gate = Gate::fixed(pad_gate)?;
    if gate.num_qubits() != 1 || !pad_gate.is_unitary() {
        return Err(IrError::QubitCountMismatch {
            tag: pad_gate,
            expected: 1,
            got: gate.num_qubits(),
        });
    }
    let referenced = circuit.referenced_qubits();
    let mut instructions = circuit.instructions().to_vec();
    let mut padded = 0usize;
    for q in (0..circuit.num_qubits()).map(QubitId) {
        if !referenced.contains(&q) {
            instructions.push(Instruction::new(gate.clone(), [q])?);
            padded += 1;
        }
    }
    if padded > 0 {
        debug!(padded, pad = %pad_gate, "padding untouched qubits");
    }
    circuit.with_instructions(instructions)
}

/// [`expand`] with the identity as pad gate.
pub fn expand_identity(circuit: &Circuit) -> IrResult<Circuit> {
    expand(circuit, GateTag::I)
}
