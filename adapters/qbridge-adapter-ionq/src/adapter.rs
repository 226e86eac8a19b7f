//! IonQ <-> IR conversion.

use qbridge_ir::{
    Circuit, CircuitBuilder, DispatchTable, FrameworkId, GateTag, Instruction, IrError, Param,
    QubitId,
};
use qbridge_synth::{ConvertError, ConvertResult, FrameworkAdapter, IrResultExt};
use std::sync::LazyLock;
use tracing::instrument;

use crate::circuit::{IONQ_FORMAT, IonQCircuit, IonQGate, QIS_GATESET};

const FRAMEWORK: FrameworkId = FrameworkId::IonQ;

/// The `qis` gate set with at most one control. Controlled entries are
/// written as their base gate plus a `control` field; `cnot` keeps its own
/// name. Angles must be bound before encoding.
pub static IONQ_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
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
            (GateTag::RX, "rx"),
            (GateTag::RY, "ry"),
            (GateTag::RZ, "rz"),
            (GateTag::CX, "cnot"),
            (GateTag::CY, "cy"),
            (GateTag::CZ, "cz"),
            (GateTag::CRX, "crx"),
            (GateTag::CRY, "cry"),
            (GateTag::CRZ, "crz"),
            (GateTag::Swap, "swap"),
            (GateTag::RXX, "xx"),
            (GateTag::RYY, "yy"),
            (GateTag::RZZ, "zz"),
        ],
    )
    .with_implicit_measurement(true)
});

/// Adapter for IonQ's circuit JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct IonQAdapter;

impl IonQAdapter {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FrameworkAdapter for IonQAdapter {
    type Native = IonQCircuit;

    fn framework(&self) -> FrameworkId {
        FRAMEWORK
    }

    fn dispatch_table(&self) -> &'static DispatchTable {
        &IONQ_TABLE
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = native.circuit.len()))]
    fn decode(&self, native: &IonQCircuit) -> ConvertResult<Circuit> {
        if native.format != IONQ_FORMAT {
            return Err(ConvertError::malformed(
                FRAMEWORK,
                format!("unsupported format '{}'", native.format),
            ));
        }
        if native.gateset != QIS_GATESET {
            return Err(ConvertError::malformed(
                FRAMEWORK,
                format!("unsupported gateset '{}'", native.gateset),
            ));
        }
        let mut builder = Circuit::builder(native.qubits, 0);
        for gate in &native.circuit {
            decode_gate(&mut builder, gate)?;
        }
        Ok(builder.build())
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = lowered.len()))]
    fn emit(&self, lowered: &Circuit) -> ConvertResult<IonQCircuit> {
        let gates = lowered
            .instructions()
            .iter()
            .map(encode_instruction)
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(IonQCircuit::new(lowered.num_qubits(), gates))
    }
}

fn decode_gate(builder: &mut CircuitBuilder, gate: &IonQGate) -> ConvertResult<()> {
    let controls = gate.control_qubits();
    let base = match gate.gate.as_str() {
        "not" | "cnot" => "x",
        other => other,
    };
    let tag = match (controls.len(), base) {
        (0, _) if gate.gate == "cnot" => {
            return Err(ConvertError::malformed(FRAMEWORK, "cnot without a control"));
        }
        (0, name) => IONQ_TABLE.tag(name),
        (1, "x") => Some(GateTag::CX),
        (1, name) => IONQ_TABLE.tag(&format!("c{name}")),
        (2, "x") => Some(GateTag::CCX),
        (n, _) => {
            return Err(ConvertError::UnsupportedGate {
                framework: FRAMEWORK,
                native: format!("{} with {n} controls", gate.gate),
            });
        }
    };
    let tag = tag.ok_or_else(|| ConvertError::UnsupportedGate {
        framework: FRAMEWORK,
        native: gate.gate.clone(),
    })?;

    let params = if tag.num_params() == 1 {
        let rotation = gate.rotation.ok_or_else(|| {
            ConvertError::malformed(FRAMEWORK, format!("'{}' without a rotation", gate.gate))
        })?;
        vec![Param::Const(rotation)]
    } else {
        Vec::new()
    };
    builder
        .apply(tag, params, gate.qubits().into_iter().map(QubitId))
        .for_framework(FRAMEWORK)?;
    Ok(())
}

fn encode_instruction(inst: &Instruction) -> ConvertResult<IonQGate> {
    let gate = inst.gate();
    let native = IONQ_TABLE
        .native(gate.tag())
        .ok_or_else(|| ConvertError::UnsupportedGate {
            framework: FRAMEWORK,
            native: gate.tag().name().to_string(),
        })?;

    let operands: Vec<u32> = inst.qubits().iter().map(|q| q.0).collect();
    let controlled = gate.num_controls() == 1;
    let name = match native.strip_prefix('c') {
        Some(base) if controlled && native != "cnot" => base,
        _ => native,
    };
    let (control, target_ops) = match operands.split_first() {
        Some((c, rest)) if controlled => (Some(*c), rest),
        _ => (None, operands.as_slice()),
    };
    let (target, targets) = match target_ops {
        [t] => (Some(*t), None),
        many => (None, Some(many.to_vec())),
    };

    let rotation = gate
        .params()
        .first()
        .map(|p| p.as_f64().ok_or_else(|| unbound(p)))
        .transpose()?;

    Ok(IonQGate {
        gate: name.to_string(),
        control,
        controls: None,
        target,
        targets,
        rotation,
    })
}

/// A parameter with no point value: unbound, or constant but not finite.
fn unbound(param: &Param) -> ConvertError {
    match param.refs().into_iter().next() {
        Some(r) => ConvertError::UnboundParameter {
            framework: FRAMEWORK,
            name: r.name,
        },
        None => ConvertError::ir(FRAMEWORK, IrError::InvalidExpression(param.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::{Bindings, ClbitId};
    use qbridge_synth::EquivalenceOracle;

    fn gate(name: &str) -> IonQGate {
        IonQGate {
            gate: name.into(),
            ..IonQGate::default()
        }
    }

    #[test]
    fn test_table_bijective_and_covers_core() {
        assert!(IONQ_TABLE.is_bijective());
        assert!(IONQ_TABLE.missing_common_core().is_empty());
        assert!(!IONQ_TABLE.supports_free_parameters());
        assert!(!IONQ_TABLE.supports(GateTag::CCX));
        assert!(!IONQ_TABLE.supports(GateTag::CSwap));
    }

    #[test]
    fn test_toffoli_lowers_to_fifteen_gates() {
        let mut b = Circuit::builder(3, 0);
        b.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let circuit = b.build();

        let native = IonQAdapter.encode(&circuit, &Bindings::new()).unwrap();
        assert_eq!(native.circuit.len(), 15);
        assert_eq!(native.circuit.iter().filter(|g| g.gate == "cnot").count(), 6);

        let decoded = IonQAdapter.decode(&native).unwrap();
        assert!(EquivalenceOracle::default().equivalent(&circuit, &decoded).unwrap());
    }

    #[test]
    fn test_controlled_gates_use_control_field() {
        let mut b = Circuit::builder(2, 1);
        b.cz(QubitId(1), QubitId(0)).unwrap();
        b.apply(GateTag::CRZ, vec![Param::Const(0.5)], [QubitId(0), QubitId(1)])
            .unwrap();
        b.measure(QubitId(0), ClbitId(0)).unwrap();
        let native = IonQAdapter.encode(&b.build(), &Bindings::new()).unwrap();

        assert_eq!(native.circuit.len(), 2);
        assert_eq!(native.circuit[0].gate, "z");
        assert_eq!(native.circuit[0].control, Some(1));
        assert_eq!(native.circuit[0].target, Some(0));
        assert_eq!(native.circuit[1].gate, "rz");
        assert_eq!(native.circuit[1].rotation, Some(0.5));

        let decoded = IonQAdapter.decode(&native).unwrap();
        assert_eq!(decoded.instructions()[0].tag(), GateTag::CZ);
        assert_eq!(decoded.instructions()[1].tag(), GateTag::CRZ);
    }

    #[test]
    fn test_multi_controlled_x_decodes_to_toffoli() {
        let native = IonQCircuit::new(
            3,
            vec![IonQGate {
                controls: Some(vec![0, 1]),
                target: Some(2),
                ..gate("x")
            }],
        );
        let decoded = IonQAdapter.decode(&native).unwrap();
        assert_eq!(decoded.instructions()[0].tag(), GateTag::CCX);

        let native = IonQCircuit::new(
            3,
            vec![IonQGate {
                controls: Some(vec![0, 1]),
                target: Some(2),
                ..gate("z")
            }],
        );
        assert!(matches!(
            IonQAdapter.decode(&native).unwrap_err(),
            ConvertError::UnsupportedGate { .. }
        ));
    }

    #[test]
    fn test_free_parameter_needs_binding() {
        let mut b = Circuit::builder(1, 0);
        let theta = b.param("theta");
        b.ry(theta, QubitId(0)).unwrap();
        let circuit = b.build();

        let err = IonQAdapter.encode(&circuit, &Bindings::new()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnboundParameter { framework: FrameworkId::IonQ, ref name } if name == "theta"
        ));
        let native = IonQAdapter
            .encode(&circuit, &Bindings::new().with("theta", 0.1))
            .unwrap();
        assert_eq!(native.circuit[0].rotation, Some(0.1));
    }

    #[test]
    fn test_rejects_other_gatesets() {
        let mut native = IonQCircuit::new(1, vec![gate("gpi")]);
        native.gateset = "native".into();
        assert!(matches!(
            IonQAdapter.decode(&native).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }

    #[test]
    fn test_out_of_range_target() {
        let native = IonQCircuit::new(
            1,
            vec![IonQGate {
                target: Some(3),
                ..gate("h")
            }],
        );
        assert!(matches!(
            IonQAdapter.decode(&native).unwrap_err(),
            ConvertError::Ir { .. }
        ));
    }
}
