//! Replacement sequences produced by decomposition.

use qbridge_ir::{Gate, GateTag, Instruction, IrError, IrResult, Param, QubitId};

/// One gate of a replacement sequence.
///
/// `operands` are positions into the replaced instruction's qubit list, so
/// a sequence can be cached once and placed on any qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitute {
    /// The replacement gate.
    pub gate: Gate,
    /// Operand positions relative to the replaced instruction.
    pub operands: Vec<usize>,
}

impl Substitute {
    /// A tagged gate on the given operand positions.
    pub fn new(tag: GateTag, params: Vec<Param>, operands: &[usize]) -> IrResult<Self> {
        Ok(Self {
            gate: Gate::new(tag, params)?,
            operands: operands.to_vec(),
        })
    }

    /// A parameterless gate.
    pub fn fixed(tag: GateTag, operands: &[usize]) -> IrResult<Self> {
        Self::new(tag, Vec::new(), operands)
    }

    /// A one-parameter gate with a numeric angle.
    pub fn rotation(tag: GateTag, angle: f64, operand: usize) -> IrResult<Self> {
        Self::new(tag, vec![Param::Const(angle)], &[operand])
    }
}

/// Place a replacement sequence on concrete qubits.
pub fn place(sequence: &[Substitute], qubits: &[QubitId]) -> IrResult<Vec<Instruction>> {
    sequence
        .iter()
        .map(|sub| {
            let targets = sub
                .operands
                .iter()
                .map(|&pos| {
                    qubits.get(pos).copied().ok_or(IrError::QubitCountMismatch {
                        tag: sub.gate.tag(),
                        expected: u32::try_from(pos + 1).unwrap_or(u32::MAX),
                        got: u32::try_from(qubits.len()).unwrap_or(u32::MAX),
                    })
                })
                .collect::<IrResult<Vec<_>>>()?;
            Instruction::new(sub.gate.clone(), targets)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_maps_positions() {
        let seq = vec![
            Substitute::fixed(GateTag::H, &[1]).unwrap(),
            Substitute::fixed(GateTag::CX, &[1, 0]).unwrap(),
        ];
        let placed = place(&seq, &[QubitId(4), QubitId(7)]).unwrap();
        assert_eq!(placed[0].qubits(), &[QubitId(7)]);
        assert_eq!(placed[1].qubits(), &[QubitId(7), QubitId(4)]);
    }
}
