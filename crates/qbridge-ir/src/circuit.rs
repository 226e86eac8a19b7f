//! Immutable circuits and the builder decoders use to produce them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateTag};
use crate::instruction::Instruction;
use crate::parameter::{Bindings, Param, ParamRef, ParameterRegistry};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit in the framework-neutral IR.
///
/// `num_qubits` is fixed when the circuit is built and every referenced
/// qubit is below it. A `Circuit` has no mutating API: transforms such as
/// canonicalization and decomposition return new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
    params: ParameterRegistry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<DenseLayout>,
}

/// Marker recording that a circuit's qubits were compressed to `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseLayout {
    /// Whether the compressed order is the reverse of the original order.
    pub reversed: bool,
}

impl Circuit {
    /// Start building a circuit over `num_qubits` qubits and `num_clbits`
    /// classical bits.
    pub fn builder(num_qubits: u32, num_clbits: u32) -> CircuitBuilder {
        CircuitBuilder {
            circuit: Circuit {
                num_qubits,
                num_clbits,
                instructions: Vec::new(),
                params: ParameterRegistry::new(),
                layout: None,
            },
        }
    }

    /// Declared number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Declared number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The circuit's parameter registry.
    pub fn params(&self) -> &ParameterRegistry {
        &self.params
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Sorted set of qubits touched by at least one instruction.
    pub fn referenced_qubits(&self) -> BTreeSet<QubitId> {
        self.instructions
            .iter()
            .flat_map(|inst| inst.qubits().iter().copied())
            .collect()
    }

    /// Whether any gate still references a free parameter.
    pub fn is_parameterized(&self) -> bool {
        self.instructions
            .iter()
            .any(|inst| inst.gate().is_parameterized())
    }

    /// Free parameters still referenced by a gate, in first-use order.
    pub fn free_parameters(&self) -> Vec<ParamRef> {
        let mut out: Vec<ParamRef> = Vec::new();
        for inst in &self.instructions {
            for r in inst.gate().params().iter().flat_map(Param::refs) {
                if !out.contains(&r) {
                    out.push(r);
                }
            }
        }
        out
    }

    /// Number of instructions per tag.
    pub fn gate_counts(&self) -> FxHashMap<GateTag, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.tag()).or_insert(0) += 1;
        }
        counts
    }

    /// Circuit depth: length of the longest chain of instructions sharing
    /// a qubit.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let next = inst
                .qubits()
                .iter()
                .map(|q| layer.get(q.index()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0)
                + 1;
            for q in inst.qubits() {
                if let Some(slot) = layer.get_mut(q.index()) {
                    *slot = next;
                }
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// A new circuit with the same registers and parameters but a different
    /// instruction list.
    pub fn with_instructions(&self, instructions: Vec<Instruction>) -> IrResult<Circuit> {
        self.with_shape(self.num_qubits, instructions)
    }

    /// A new circuit with a different qubit count and instruction list,
    /// keeping classical bits and parameters.
    pub fn with_shape(&self, num_qubits: u32, instructions: Vec<Instruction>) -> IrResult<Circuit> {
        for inst in &instructions {
            check_range(num_qubits, inst)?;
        }
        Ok(Circuit {
            num_qubits,
            num_clbits: self.num_clbits,
            instructions,
            params: self.params.clone(),
            layout: self.layout,
        })
    }

    /// Dense layout this circuit was compressed into, if any.
    pub fn layout(&self) -> Option<DenseLayout> {
        self.layout
    }

    pub(crate) fn with_layout(mut self, layout: Option<DenseLayout>) -> Circuit {
        self.layout = layout;
        self
    }

    /// Substitute bound parameters in every gate.
    ///
    /// Parameters that are bound disappear from the gates; the registry keeps
    /// its declaration list so ids stay stable.
    pub fn bind(&self, bindings: &Bindings) -> IrResult<Circuit> {
        let instructions = self
            .instructions
            .iter()
            .map(|inst| inst.with_gate(inst.gate().substitute(bindings)?))
            .collect::<IrResult<Vec<_>>>()?;
        self.with_instructions(instructions)
    }
}

fn check_range(num_qubits: u32, inst: &Instruction) -> IrResult<()> {
    for &q in inst.qubits() {
        if q.0 >= num_qubits {
            return Err(IrError::QubitOutOfRange {
                qubit: q,
                num_qubits,
                tag: Some(inst.tag()),
            });
        }
    }
    Ok(())
}

/// Mutable staging area for a [`Circuit`].
///
/// Only decoders and transforms build circuits; once [`build`](Self::build)
/// returns, the circuit is frozen.
#[derive(Debug)]
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Register (or look up) a free parameter and return it as an expression.
    pub fn param(&mut self, name: impl Into<String>) -> Param {
        Param::Ref(self.circuit.params.register(name))
    }

    /// Mutable access to the registry, for decoders that parse expressions.
    pub fn registry_mut(&mut self) -> &mut ParameterRegistry {
        &mut self.circuit.params
    }

    /// Declared qubit count.
    pub fn num_qubits(&self) -> u32 {
        self.circuit.num_qubits
    }

    /// Append an instruction.
    pub fn push(&mut self, inst: Instruction) -> IrResult<&mut Self> {
        check_range(self.circuit.num_qubits, &inst)?;
        if let Some(&c) = inst.clbits().iter().find(|c| c.0 >= self.circuit.num_clbits) {
            self.circuit.num_clbits = c.0 + 1;
        }
        self.circuit.instructions.push(inst);
        Ok(self)
    }

    /// Append `gate` on `qubits`.
    pub fn gate(
        &mut self,
        gate: Gate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::new(gate, qubits)?)
    }

    /// Append a tagged gate with parameters on `qubits`.
    pub fn apply(
        &mut self,
        tag: GateTag,
        params: Vec<Param>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::apply(tag, params, qubits)?)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::H, vec![], [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::X, vec![], [qubit])
    }

    /// Apply RX rotation.
    pub fn rx(&mut self, theta: impl Into<Param>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::RX, vec![theta.into()], [qubit])
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: impl Into<Param>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::RY, vec![theta.into()], [qubit])
    }

    /// Apply RZ rotation.
    pub fn rz(&mut self, theta: impl Into<Param>, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::RZ, vec![theta.into()], [qubit])
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::CX, vec![], [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::CZ, vec![], [control, target])
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(GateTag::CCX, vec![], [c1, c2, target])
    }

    /// Measure `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit)?)
    }

    /// Freeze the circuit.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_circuit() {
        let mut b = Circuit::builder(2, 2);
        b.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        b.measure(QubitId(0), ClbitId(0)).unwrap();
        let c = b.build();

        assert_eq!(c.num_qubits(), 2);
        assert_eq!(c.len(), 3);
        assert_eq!(c.depth(), 3);
        assert_eq!(c.gate_counts()[&GateTag::CX], 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut b = Circuit::builder(2, 0);
        let err = b.cx(QubitId(0), QubitId(2)).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitOutOfRange {
                qubit: QubitId(2),
                num_qubits: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_referenced_qubits_sorted() {
        let mut b = Circuit::builder(5, 0);
        b.h(QubitId(4)).unwrap().cx(QubitId(2), QubitId(0)).unwrap();
        let refs: Vec<u32> = b.build().referenced_qubits().iter().map(|q| q.0).collect();
        assert_eq!(refs, vec![0, 2, 4]);
    }

    #[test]
    fn test_bind_keeps_registry() {
        let mut b = Circuit::builder(1, 0);
        let theta = b.param("theta");
        b.rx(theta, QubitId(0)).unwrap();
        let c = b.build();
        assert!(c.is_parameterized());
        assert_eq!(c.free_parameters()[0].name, "theta");

        let bound = c.bind(&Bindings::new().with("theta", 0.3)).unwrap();
        assert!(!bound.is_parameterized());
        assert!(bound.free_parameters().is_empty());
        assert_eq!(bound.params().len(), 1);
        assert_eq!(bound.instructions()[0].gate().params(), &[Param::Const(0.3)]);
    }

    #[test]
    fn test_measure_grows_clbits() {
        let mut b = Circuit::builder(1, 0);
        b.measure(QubitId(0), ClbitId(2)).unwrap();
        assert_eq!(b.build().num_clbits(), 3);
    }
}
