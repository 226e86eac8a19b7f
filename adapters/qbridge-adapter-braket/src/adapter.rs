//! Braket <-> IR conversion.

use qbridge_ir::matrix::{from_pairs, to_pairs};
use qbridge_ir::{
    Circuit, CircuitBuilder, DispatchTable, FrameworkId, Gate, GateTag, Instruction,
    Param, QubitId, parse_param,
};
use qbridge_synth::{ConvertError, ConvertResult, FrameworkAdapter, IrResultExt};
use std::sync::LazyLock;
use tracing::instrument;

use crate::program::{BraketAngle, BraketInstruction, BraketProgram, JAQCD_SCHEMA};

const FRAMEWORK: FrameworkId = FrameworkId::Braket;

/// JAQCD gate types. Braket measures every qubit at the end of a task, so
/// there is no measurement instruction.
pub static BRAKET_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new(
        FRAMEWORK,
        &[
            (GateTag::H, "h"),
            (GateTag::X, "x"),
            (GateTag::Y, "y"),
            (GateTag::Z, "z"),
            (GateTag::S, "s"),
            (GateTag::Sdg, "si"),
            (GateTag::T, "t"),
            (GateTag::Tdg, "ti"),
            (GateTag::I, "i"),
            (GateTag::SX, "v"),
            (GateTag::SXdg, "vi"),
            (GateTag::Phase, "phaseshift"),
            (GateTag::RX, "rx"),
            (GateTag::RY, "ry"),
            (GateTag::RZ, "rz"),
            (GateTag::CX, "cnot"),
            (GateTag::CY, "cy"),
            (GateTag::CZ, "cz"),
            (GateTag::Swap, "swap"),
            (GateTag::ISwap, "iswap"),
            (GateTag::CPhase, "cphaseshift"),
            (GateTag::RXX, "xx"),
            (GateTag::RYY, "yy"),
            (GateTag::RZZ, "zz"),
            (GateTag::CCX, "ccnot"),
            (GateTag::CSwap, "cswap"),
            (GateTag::Unitary, "unitary"),
        ],
    )
    .with_free_parameters(true)
    .with_implicit_measurement(true)
});

/// Adapter for Braket JAQCD programs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraketAdapter;

impl BraketAdapter {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FrameworkAdapter for BraketAdapter {
    type Native = BraketProgram;

    fn framework(&self) -> FrameworkId {
        FRAMEWORK
    }

    fn dispatch_table(&self) -> &'static DispatchTable {
        &BRAKET_TABLE
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = native.instructions.len()))]
    fn decode(&self, native: &BraketProgram) -> ConvertResult<Circuit> {
        if native.header.name != JAQCD_SCHEMA {
            return Err(ConvertError::malformed(
                FRAMEWORK,
                format!("unsupported program schema '{}'", native.header.name),
            ));
        }
        let mut builder = Circuit::builder(native.num_qubits()?, 0);
        for inst in &native.instructions {
            decode_instruction(&mut builder, inst)?;
        }
        Ok(builder.build())
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = lowered.len()))]
    fn emit(&self, lowered: &Circuit) -> ConvertResult<BraketProgram> {
        let instructions = lowered
            .instructions()
            .iter()
            .map(encode_instruction)
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(BraketProgram::new(instructions))
    }
}

fn decode_instruction(builder: &mut CircuitBuilder, inst: &BraketInstruction) -> ConvertResult<()> {
    let qubits = inst.qubits().into_iter().map(QubitId);
    let gate = match BRAKET_TABLE.tag(&inst.kind) {
        Some(GateTag::Unitary) => {
            let rows = inst
                .matrix
                .as_deref()
                .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "unitary without a matrix"))?;
            let matrix = from_pairs(rows)
                .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "matrix is not square"))?;
            Gate::unitary(matrix).for_framework(FRAMEWORK)?
        }
        Some(tag) => {
            let params = match &inst.angle {
                Some(BraketAngle::Value(v)) => vec![Param::Const(*v)],
                Some(BraketAngle::FreeParameter(text)) => {
                    vec![parse_param(text, builder.registry_mut()).for_framework(FRAMEWORK)?]
                }
                None => Vec::new(),
            };
            Gate::new(tag, params).for_framework(FRAMEWORK)?
        }
        None => {
            return Err(ConvertError::UnsupportedGate {
                framework: FRAMEWORK,
                native: inst.kind.clone(),
            });
        }
    };
    builder.gate(gate, qubits).for_framework(FRAMEWORK)?;
    Ok(())
}

fn encode_instruction(inst: &Instruction) -> ConvertResult<BraketInstruction> {
    let gate = inst.gate();
    let kind = BRAKET_TABLE
        .native(gate.tag())
        .ok_or_else(|| ConvertError::UnsupportedGate {
            framework: FRAMEWORK,
            native: gate.tag().name().to_string(),
        })?;

    let operands: Vec<u32> = inst.qubits().iter().map(|q| q.0).collect();
    let (controls, targets) = operands.split_at(gate.num_controls() as usize);
    let (control, controls) = match controls {
        [] => (None, None),
        [c] => (Some(*c), None),
        many => (None, Some(many.to_vec())),
    };
    let (target, targets) = match targets {
        [t] => (Some(*t), None),
        many => (None, Some(many.to_vec())),
    };

    let angle = gate.params().first().map(|p| match p.as_f64() {
        Some(v) => BraketAngle::Value(v),
        None => BraketAngle::FreeParameter(p.to_string()),
    });
    let matrix = match gate.tag() {
        GateTag::Unitary => gate.matrix().map(to_pairs),
        _ => None,
    };

    Ok(BraketInstruction {
        kind: kind.to_string(),
        control,
        controls,
        target,
        targets,
        angle,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::{Bindings, ClbitId};
    use qbridge_synth::EquivalenceOracle;

    #[test]
    fn test_table_bijective_and_covers_core() {
        assert!(BRAKET_TABLE.is_bijective());
        assert!(BRAKET_TABLE.missing_common_core().is_empty());
        assert!(BRAKET_TABLE.measures_implicitly());
        assert!(!BRAKET_TABLE.supports(GateTag::Measure));
    }

    #[test]
    fn test_operand_layout() {
        let mut b = Circuit::builder(3, 0);
        b.cx(QubitId(2), QubitId(0)).unwrap();
        b.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        b.apply(GateTag::CSwap, vec![], [QubitId(1), QubitId(0), QubitId(2)])
            .unwrap();
        b.apply(GateTag::RZZ, vec![Param::Const(0.4)], [QubitId(0), QubitId(1)])
            .unwrap();
        let program = BraketAdapter.encode(&b.build(), &Bindings::new()).unwrap();

        let cnot = &program.instructions[0];
        assert_eq!((cnot.control, cnot.target), (Some(2), Some(0)));
        let ccnot = &program.instructions[1];
        assert_eq!(ccnot.controls, Some(vec![0, 1]));
        assert_eq!(ccnot.target, Some(2));
        let cswap = &program.instructions[2];
        assert_eq!(cswap.control, Some(1));
        assert_eq!(cswap.targets, Some(vec![0, 2]));
        let zz = &program.instructions[3];
        assert_eq!(zz.kind, "zz");
        assert_eq!(zz.targets, Some(vec![0, 1]));
        assert_eq!(zz.angle, Some(BraketAngle::Value(0.4)));
    }

    #[test]
    fn test_measurements_elided() {
        let mut b = Circuit::builder(2, 2);
        b.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        b.measure(QubitId(0), ClbitId(0)).unwrap();
        b.measure(QubitId(1), ClbitId(1)).unwrap();
        let circuit = b.build();

        let program = BraketAdapter.encode(&circuit, &Bindings::new()).unwrap();
        assert_eq!(program.instructions.len(), 2);
        let decoded = BraketAdapter.decode(&program).unwrap();
        assert!(EquivalenceOracle::default().equivalent(&circuit, &decoded).unwrap());
    }

    #[test]
    fn test_free_parameter_round_trip() {
        let program = BraketProgram::new(vec![BraketInstruction {
            kind: "rx".into(),
            target: Some(0),
            angle: Some(BraketAngle::FreeParameter("alpha / 2".into())),
            ..BraketInstruction::default()
        }]);
        let circuit = BraketAdapter.decode(&program).unwrap();
        assert_eq!(circuit.params().get(0).unwrap().name, "alpha");

        let symbolic = BraketAdapter.encode(&circuit, &Bindings::new()).unwrap();
        assert!(matches!(
            symbolic.instructions[0].angle,
            Some(BraketAngle::FreeParameter(_))
        ));
        let bound = BraketAdapter
            .encode(&circuit, &Bindings::new().with("alpha", 1.0))
            .unwrap();
        assert_eq!(bound.instructions[0].angle, Some(BraketAngle::Value(0.5)));
    }

    #[test]
    fn test_unsupported_type() {
        let program = BraketProgram::new(vec![BraketInstruction {
            kind: "pswap".into(),
            targets: Some(vec![0, 1]),
            angle: Some(BraketAngle::Value(0.1)),
            ..BraketInstruction::default()
        }]);
        assert!(matches!(
            BraketAdapter.decode(&program).unwrap_err(),
            ConvertError::UnsupportedGate { ref native, .. } if native == "pswap"
        ));
    }

    #[test]
    fn test_wrong_schema_rejected() {
        let mut program = BraketProgram::new(Vec::new());
        program.header.name = "braket.ir.openqasm.program".into();
        assert!(matches!(
            BraketAdapter.decode(&program).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }

    #[test]
    fn test_largest_qubit_index_is_malformed() {
        let program = BraketProgram::new(vec![BraketInstruction {
            kind: "x".into(),
            target: Some(u32::MAX),
            ..BraketInstruction::default()
        }]);
        assert!(matches!(
            BraketAdapter.decode(&program).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }
}
