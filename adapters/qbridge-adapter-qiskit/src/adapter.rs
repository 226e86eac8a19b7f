//! Qiskit <-> IR conversion.

use qbridge_ir::matrix::{from_pairs, reverse_qubit_order, to_pairs};
use qbridge_ir::{
    Circuit, CircuitBuilder, ClbitId, DispatchTable, FrameworkId, Gate, GateMatrix,
    GateTag, Instruction, Param, QubitId, parse_param,
};
use qbridge_synth::{ConvertError, ConvertResult, FrameworkAdapter, IrResultExt};
use std::sync::LazyLock;
use tracing::{debug, instrument};

use crate::model::{QiskitCircuit, QiskitInstruction, QiskitParam};

const FRAMEWORK: FrameworkId = FrameworkId::Qiskit;

/// Qiskit's standard gate library. Every tag is native.
pub static QISKIT_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new(
        FRAMEWORK,
        &[
            (GateTag::H, "h"),
            (GateTag::X, "x"),
            (GateTag::Y, "y"),
            (GateTag::Z, "z"),
            (GateTag::S, "s"),
            (GateTag::Sdg, "sdg"),
            (GateTag::T, "t"),
            (GateTag::Tdg, "tdg"),
            (GateTag::I, "id"),
            (GateTag::SX, "sx"),
            (GateTag::SXdg, "sxdg"),
            (GateTag::Phase, "p"),
            (GateTag::RX, "rx"),
            (GateTag::RY, "ry"),
            (GateTag::RZ, "rz"),
            (GateTag::U, "u"),
            (GateTag::CX, "cx"),
            (GateTag::CY, "cy"),
            (GateTag::CZ, "cz"),
            (GateTag::CH, "ch"),
            (GateTag::Swap, "swap"),
            (GateTag::ISwap, "iswap"),
            (GateTag::CPhase, "cp"),
            (GateTag::CRX, "crx"),
            (GateTag::CRY, "cry"),
            (GateTag::CRZ, "crz"),
            (GateTag::RXX, "rxx"),
            (GateTag::RYY, "ryy"),
            (GateTag::RZZ, "rzz"),
            (GateTag::CCX, "ccx"),
            (GateTag::CSwap, "cswap"),
            (GateTag::Unitary, "unitary"),
            (GateTag::Measure, "measure"),
        ],
    )
    .with_free_parameters(true)
});

/// Operations that carry no unitary action and are dropped on decode.
const DIRECTIVES: [&str; 2] = ["barrier", "delay"];

/// Adapter for Qiskit's serialized circuit model.
#[derive(Debug, Clone, Copy, Default)]
pub struct QiskitAdapter;

impl QiskitAdapter {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FrameworkAdapter for QiskitAdapter {
    type Native = QiskitCircuit;

    fn framework(&self) -> FrameworkId {
        FRAMEWORK
    }

    fn dispatch_table(&self) -> &'static DispatchTable {
        &QISKIT_TABLE
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = native.data.len()))]
    fn decode(&self, native: &QiskitCircuit) -> ConvertResult<Circuit> {
        let mut builder = Circuit::builder(native.num_qubits, native.num_clbits);
        for name in &native.parameters {
            builder.param(name.as_str());
        }
        for inst in &native.data {
            if DIRECTIVES.contains(&inst.name.as_str()) {
                debug!(name = %inst.name, "dropping directive");
                continue;
            }
            decode_instruction(&mut builder, inst)?;
        }
        Ok(builder.build())
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = lowered.len()))]
    fn emit(&self, lowered: &Circuit) -> ConvertResult<QiskitCircuit> {
        let data = lowered
            .instructions()
            .iter()
            .map(encode_instruction)
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(QiskitCircuit {
            name: None,
            num_qubits: lowered.num_qubits(),
            num_clbits: lowered.num_clbits(),
            global_phase: None,
            parameters: lowered
                .free_parameters()
                .into_iter()
                .map(|r| r.name)
                .collect(),
            data,
        })
    }
}

fn decode_instruction(builder: &mut CircuitBuilder, inst: &QiskitInstruction) -> ConvertResult<()> {
    let qubits = inst.qubits.iter().map(|&q| QubitId(q));
    let tag = QISKIT_TABLE.tag(&inst.name);

    if tag == Some(GateTag::Measure) {
        if inst.qubits.len() != inst.clbits.len() {
            return Err(ConvertError::malformed(
                FRAMEWORK,
                format!(
                    "measure on {} qubits into {} clbits",
                    inst.qubits.len(),
                    inst.clbits.len()
                ),
            ));
        }
        for (&q, &c) in inst.qubits.iter().zip(&inst.clbits) {
            builder.measure(QubitId(q), ClbitId(c)).for_framework(FRAMEWORK)?;
        }
        return Ok(());
    }

    let matrix = inst.matrix.as_deref().map(decode_matrix).transpose()?;
    let gate = match (tag, matrix) {
        (Some(GateTag::Unitary) | None, Some(m)) => Gate::unitary(m).for_framework(FRAMEWORK)?,
        (Some(GateTag::Unitary), None) => {
            return Err(ConvertError::malformed(FRAMEWORK, "unitary without a matrix"));
        }
        (Some(tag), matrix) => {
            let params = inst
                .params
                .iter()
                .map(|p| decode_param(builder, p))
                .collect::<ConvertResult<Vec<_>>>()?;
            let gate = Gate::new(tag, params).for_framework(FRAMEWORK)?;
            match matrix {
                Some(m) => gate.with_matrix(m).for_framework(FRAMEWORK)?,
                None => gate,
            }
        }
        (None, None) => {
            return Err(ConvertError::UnsupportedGate {
                framework: FRAMEWORK,
                native: inst.name.clone(),
            });
        }
    };
    builder.gate(gate, qubits).for_framework(FRAMEWORK)?;
    Ok(())
}

fn decode_param(builder: &mut CircuitBuilder, param: &QiskitParam) -> ConvertResult<Param> {
    match param {
        QiskitParam::Value(v) => Ok(Param::Const(*v)),
        QiskitParam::Expression(text) => {
            parse_param(text, builder.registry_mut()).for_framework(FRAMEWORK)
        }
    }
}

/// Qiskit matrices are little-endian; the IR is big-endian.
fn decode_matrix(rows: &[Vec<[f64; 2]>]) -> ConvertResult<GateMatrix> {
    from_pairs(rows)
        .map(|m| reverse_qubit_order(&m))
        .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "matrix is not square"))
}

fn encode_instruction(inst: &Instruction) -> ConvertResult<QiskitInstruction> {
    let gate = inst.gate();
    let name = QISKIT_TABLE
        .native(gate.tag())
        .ok_or_else(|| ConvertError::UnsupportedGate {
            framework: FRAMEWORK,
            native: gate.tag().name().to_string(),
        })?;
    let matrix = match gate.tag() {
        GateTag::Unitary => gate.matrix().map(|m| to_pairs(&reverse_qubit_order(m))),
        _ => None,
    };
    Ok(QiskitInstruction {
        name: name.to_string(),
        qubits: inst.qubits().iter().map(|q| q.0).collect(),
        clbits: inst.clbits().iter().map(|c| c.0).collect(),
        params: gate.params().iter().map(encode_param).collect(),
        matrix,
    })
}

fn encode_param(param: &Param) -> QiskitParam {
    match param.as_f64() {
        Some(v) => QiskitParam::Value(v),
        None => QiskitParam::Expression(param.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::Bindings;
    use qbridge_ir::matrix::controlled;
    use qbridge_synth::EquivalenceOracle;

    fn inst(name: &str, qubits: &[u32], params: Vec<QiskitParam>) -> QiskitInstruction {
        QiskitInstruction {
            name: name.into(),
            qubits: qubits.to_vec(),
            clbits: Vec::new(),
            params,
            matrix: None,
        }
    }

    fn circuit(num_qubits: u32, data: Vec<QiskitInstruction>) -> QiskitCircuit {
        QiskitCircuit {
            name: None,
            num_qubits,
            num_clbits: 0,
            global_phase: None,
            parameters: Vec::new(),
            data,
        }
    }

    #[test]
    fn test_table_bijective_and_complete() {
        assert!(QISKIT_TABLE.is_bijective());
        assert!(QISKIT_TABLE.missing_common_core().is_empty());
        for tag in GateTag::ALL {
            assert!(QISKIT_TABLE.supports(tag), "{tag} missing");
        }
    }

    #[test]
    fn test_decode_bell_with_measure() {
        let mut native = circuit(
            2,
            vec![
                inst("h", &[0], vec![]),
                inst("barrier", &[0, 1], vec![]),
                inst("cx", &[0, 1], vec![]),
            ],
        );
        native.num_clbits = 2;
        native.data.push(QiskitInstruction {
            clbits: vec![0, 1],
            ..inst("measure", &[0, 1], vec![])
        });

        let decoded = QiskitAdapter.decode(&native).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded.instructions()[1].tag(), GateTag::CX);
        assert!(decoded.instructions()[3].is_measure());
        assert_eq!(decoded.instructions()[3].clbits(), &[ClbitId(1)]);
    }

    #[test]
    fn test_expression_params_register_symbols() {
        let mut native = circuit(
            1,
            vec![
                inst("rz", &[0], vec![QiskitParam::Expression("2*theta".into())]),
                inst("rx", &[0], vec![QiskitParam::Expression("phi + pi/4".into())]),
            ],
        );
        native.parameters = vec!["phi".into(), "theta".into()];

        let decoded = QiskitAdapter.decode(&native).unwrap();
        assert!(decoded.is_parameterized());
        assert_eq!(decoded.params().get(0).unwrap().name, "phi");
        assert_eq!(decoded.params().len(), 2);

        let encoded = QiskitAdapter.encode(&decoded, &Bindings::new()).unwrap();
        assert_eq!(encoded.parameters, vec!["theta".to_string(), "phi".to_string()]);
        let again = QiskitAdapter.decode(&encoded).unwrap();
        let bindings = Bindings::new().with("theta", 0.3).with("phi", -1.1);
        let oracle = EquivalenceOracle::default();
        assert!(
            oracle
                .equivalent(&decoded.bind(&bindings).unwrap(), &again.bind(&bindings).unwrap())
                .unwrap()
        );
    }

    #[test]
    fn test_partial_binding_keeps_rest_symbolic() {
        let native = circuit(
            1,
            vec![inst("rz", &[0], vec![QiskitParam::Expression("a + b".into())])],
        );
        let decoded = QiskitAdapter.decode(&native).unwrap();
        let encoded = QiskitAdapter
            .encode(&decoded, &Bindings::new().with("a", 1.0))
            .unwrap();
        assert_eq!(encoded.parameters, vec!["b".to_string()]);
        assert!(matches!(encoded.data[0].params[0], QiskitParam::Expression(_)));
    }

    #[test]
    fn test_unitary_is_little_endian() {
        let x = from_pairs(&[vec![[0.0, 0.0], [1.0, 0.0]], vec![[1.0, 0.0], [0.0, 0.0]]]).unwrap();
        // Control on qubits[0], which Qiskit places on the least significant bit.
        let little_endian_cx = reverse_qubit_order(&controlled(&x, 1));
        let native = circuit(
            2,
            vec![QiskitInstruction {
                matrix: Some(to_pairs(&little_endian_cx)),
                ..inst("unitary", &[0, 1], vec![])
            }],
        );
        let decoded = QiskitAdapter.decode(&native).unwrap();

        let mut b = Circuit::builder(2, 0);
        b.cx(QubitId(0), QubitId(1)).unwrap();
        assert!(EquivalenceOracle::default().equivalent(&decoded, &b.build()).unwrap());

        let encoded = QiskitAdapter.encode(&decoded, &Bindings::new()).unwrap();
        assert_eq!(encoded.data[0].matrix.as_ref(), Some(&to_pairs(&little_endian_cx)));
    }

    #[test]
    fn test_unknown_operation_with_matrix_becomes_unitary() {
        let native = circuit(
            1,
            vec![QiskitInstruction {
                matrix: Some(vec![vec![[0.0, 0.0], [1.0, 0.0]], vec![[1.0, 0.0], [0.0, 0.0]]]),
                ..inst("my_not", &[0], vec![])
            }],
        );
        let decoded = QiskitAdapter.decode(&native).unwrap();
        assert_eq!(decoded.instructions()[0].tag(), GateTag::Unitary);
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let native = circuit(1, vec![inst("reset", &[0], vec![])]);
        let err = QiskitAdapter.decode(&native).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedGate { framework: FrameworkId::Qiskit, ref native } if native == "reset"
        ));
    }

    #[test]
    fn test_qubit_out_of_range_is_ir_error() {
        let native = circuit(1, vec![inst("cx", &[0, 1], vec![])]);
        assert!(matches!(
            QiskitAdapter.decode(&native).unwrap_err(),
            ConvertError::Ir { .. }
        ));
    }
}
