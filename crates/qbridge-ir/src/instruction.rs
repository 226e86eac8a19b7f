//! Instructions: a gate applied to an ordered list of qubits.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateTag};
use crate::parameter::Param;
use crate::qubit::{ClbitId, QubitId};

/// A gate together with its operands.
///
/// The qubit list has exactly `gate.num_qubits()` distinct entries; controls
/// come first for controlled tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    gate: Gate,
    qubits: Vec<QubitId>,
    clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create an instruction, checking arity and qubit uniqueness.
    pub fn new(gate: Gate, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        check_operands(&gate, &qubits)?;
        Ok(Self {
            gate,
            qubits,
            clbits: Vec::new(),
        })
    }

    /// Shorthand for `Instruction::new(Gate::new(tag, params)?, qubits)`.
    pub fn apply(
        tag: GateTag,
        params: Vec<Param>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<Self> {
        Self::new(Gate::new(tag, params)?, qubits)
    }

    /// Create a measurement of `qubit` into `clbit`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> IrResult<Self> {
        Ok(Self {
            gate: Gate::fixed(GateTag::Measure)?,
            qubits: vec![qubit],
            clbits: vec![clbit],
        })
    }

    /// The gate.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Tag of the gate.
    pub fn tag(&self) -> GateTag {
        self.gate.tag()
    }

    /// Qubit operands.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Classical operands (measurement targets).
    pub fn clbits(&self) -> &[ClbitId] {
        &self.clbits
    }

    /// Whether this is a measurement.
    pub fn is_measure(&self) -> bool {
        self.gate.tag() == GateTag::Measure
    }

    /// Same gate on remapped qubits.
    pub fn remap(&self, map: impl Fn(QubitId) -> QubitId) -> IrResult<Self> {
        let qubits: Vec<QubitId> = self.qubits.iter().map(|&q| map(q)).collect();
        check_operands(&self.gate, &qubits)?;
        Ok(Self {
            gate: self.gate.clone(),
            qubits,
            clbits: self.clbits.clone(),
        })
    }

    /// Same operands with a replacement gate of the same arity.
    pub fn with_gate(&self, gate: Gate) -> IrResult<Self> {
        check_operands(&gate, &self.qubits)?;
        Ok(Self {
            gate,
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
        })
    }
}

fn check_operands(gate: &Gate, qubits: &[QubitId]) -> IrResult<()> {
    let expected = gate.num_qubits();
    if qubits.len() != expected as usize {
        return Err(IrError::QubitCountMismatch {
            tag: gate.tag(),
            expected,
            got: qubits.len() as u32,
        });
    }
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(IrError::DuplicateQubit {
                qubit: *q,
                tag: Some(gate.tag()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_checked() {
        let err = Instruction::apply(GateTag::CX, vec![], [QubitId(0)]).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch {
                tag: GateTag::CX,
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let err = Instruction::apply(GateTag::CZ, vec![], [QubitId(1), QubitId(1)]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { qubit: QubitId(1), .. }));
    }

    #[test]
    fn test_remap() {
        let inst = Instruction::apply(GateTag::CX, vec![], [QubitId(2), QubitId(4)]).unwrap();
        let moved = inst.remap(|q| QubitId(q.0 / 2)).unwrap();
        assert_eq!(moved.qubits(), &[QubitId(1), QubitId(2)]);
        assert_eq!(moved.tag(), GateTag::CX);

        assert!(inst.remap(|_| QubitId(0)).is_err());
    }

    #[test]
    fn test_measure() {
        let m = Instruction::measure(QubitId(0), ClbitId(3)).unwrap();
        assert!(m.is_measure());
        assert_eq!(m.clbits(), &[ClbitId(3)]);
    }
}
