//! Cirq <-> IR conversion.
//!
//! Cirq spells most gates as an `EigenGate` class plus an exponent, so the
//! table's native identifiers are the gate reprs Cirq prints (`cirq.S`,
//! `cirq.X**0.5`, `cirq.ZPowGate`). Decoding classifies each gate object into
//! one of those identifiers first, then looks the tag up in the table.

use qbridge_ir::matrix::{from_pairs, qubits_of, to_pairs};
use qbridge_ir::{
    Circuit, CircuitBuilder, ClbitId, DispatchTable, FrameworkId, Gate, GateTag,
    Instruction, Param, ParameterRegistry, QubitId,
};
use qbridge_synth::{ConvertError, ConvertResult, FrameworkAdapter, IrResultExt};
use rustc_hash::FxHashMap;
use std::sync::LazyLock;
use tracing::instrument;

use crate::model::{CirqCircuit, CirqGate, CirqValue, Operation};
use crate::symbolic::{from_param, to_param};

const FRAMEWORK: FrameworkId = FrameworkId::Cirq;

/// Tolerance when matching a numeric exponent to a named power.
const EXPONENT_ATOL: f64 = 1e-12;

/// Gates Cirq provides, keyed by their repr.
pub static CIRQ_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new(
        FRAMEWORK,
        &[
            (GateTag::H, "cirq.H"),
            (GateTag::X, "cirq.X"),
            (GateTag::Y, "cirq.Y"),
            (GateTag::Z, "cirq.Z"),
            (GateTag::S, "cirq.S"),
            (GateTag::Sdg, "cirq.S**-1"),
            (GateTag::T, "cirq.T"),
            (GateTag::Tdg, "cirq.T**-1"),
            (GateTag::I, "cirq.I"),
            (GateTag::SX, "cirq.X**0.5"),
            (GateTag::SXdg, "cirq.X**-0.5"),
            (GateTag::Phase, "cirq.ZPowGate"),
            (GateTag::RX, "cirq.Rx"),
            (GateTag::RY, "cirq.Ry"),
            (GateTag::RZ, "cirq.Rz"),
            (GateTag::CX, "cirq.CNOT"),
            (GateTag::CZ, "cirq.CZ"),
            (GateTag::CPhase, "cirq.CZPowGate"),
            (GateTag::Swap, "cirq.SWAP"),
            (GateTag::ISwap, "cirq.ISWAP"),
            (GateTag::RXX, "cirq.XXPowGate"),
            (GateTag::RYY, "cirq.YYPowGate"),
            (GateTag::RZZ, "cirq.ZZPowGate"),
            (GateTag::CCX, "cirq.TOFFOLI"),
            (GateTag::CSwap, "cirq.FREDKIN"),
            (GateTag::Unitary, "cirq.MatrixGate"),
            (GateTag::Measure, "cirq.MeasurementGate"),
        ],
    )
    .with_free_parameters(true)
});

/// Adapter for `cirq.to_json` circuits over `LineQubit`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CirqAdapter;

impl CirqAdapter {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FrameworkAdapter for CirqAdapter {
    type Native = CirqCircuit;

    fn framework(&self) -> FrameworkId {
        FRAMEWORK
    }

    fn dispatch_table(&self) -> &'static DispatchTable {
        &CIRQ_TABLE
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, moments = native.moments.len()))]
    fn decode(&self, native: &CirqCircuit) -> ConvertResult<Circuit> {
        let mut num_qubits = 0;
        for op in native.operations() {
            for q in &op.qubits {
                if q.cirq_type != "LineQubit" {
                    return Err(ConvertError::malformed(
                        FRAMEWORK,
                        format!("unsupported qubit type '{}'", q.cirq_type),
                    ));
                }
                let width = q.x.checked_add(1).ok_or_else(|| {
                    ConvertError::malformed(
                        FRAMEWORK,
                        format!("qubit index {} is out of range", q.x),
                    )
                })?;
                num_qubits = num_qubits.max(width);
            }
        }

        let mut keys = MeasurementKeys::new(native)?;
        let mut builder = Circuit::builder(num_qubits, 0);
        for op in native.operations() {
            decode_operation(&mut builder, &mut keys, op)?;
        }
        Ok(builder.build())
    }

    #[instrument(skip_all, fields(framework = %FRAMEWORK, ops = lowered.len()))]
    fn emit(&self, lowered: &Circuit) -> ConvertResult<CirqCircuit> {
        let ops = lowered
            .instructions()
            .iter()
            .map(encode_instruction)
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(CirqCircuit::from_operations(ops))
    }
}

/// Assigns classical bits to measurement keys.
///
/// Keys of the form `c<k>` on a single qubit (what the encoder writes) map to
/// bit `k`. Any other key gets a block of fresh bits, allocated in order of
/// first appearance after the highest explicit index.
struct MeasurementKeys {
    assigned: FxHashMap<String, u32>,
    next: u32,
}

impl MeasurementKeys {
    fn new(native: &CirqCircuit) -> ConvertResult<Self> {
        let highest = native
            .operations()
            .filter(|op| op.gate.cirq_type == "MeasurementGate" && op.qubits.len() == 1)
            .filter_map(|op| op.gate.key.as_deref().and_then(explicit_index))
            .max();
        let next = match highest {
            Some(k) => k.checked_add(1).ok_or_else(|| out_of_range_key(k))?,
            None => 0,
        };
        Ok(Self {
            assigned: FxHashMap::default(),
            next,
        })
    }

    fn clbits(&mut self, key: &str, width: u32) -> ConvertResult<Vec<ClbitId>> {
        if width == 1 {
            if let Some(k) = explicit_index(key) {
                return Ok(vec![ClbitId(k)]);
            }
        }
        let base = match self.assigned.get(key) {
            Some(&base) => base,
            None => {
                let base = self.next;
                self.next = base
                    .checked_add(width)
                    .ok_or_else(|| out_of_range_key(base))?;
                self.assigned.insert(key.to_string(), base);
                base
            }
        };
        Ok((base..base + width).map(ClbitId).collect())
    }
}

fn out_of_range_key(index: u32) -> ConvertError {
    ConvertError::malformed(
        FRAMEWORK,
        format!("measurement bit {index} is out of range"),
    )
}

fn explicit_index(key: &str) -> Option<u32> {
    key.strip_prefix('c')?.parse().ok()
}

fn decode_operation(
    builder: &mut CircuitBuilder,
    keys: &mut MeasurementKeys,
    op: &Operation,
) -> ConvertResult<()> {
    let qubits: Vec<QubitId> = op.qubits.iter().map(|q| QubitId(q.x)).collect();
    let gate = &op.gate;
    match gate.cirq_type.as_str() {
        "MeasurementGate" => {
            let key = gate.key.as_deref().unwrap_or("m");
            let clbits = keys.clbits(key, qubits.len() as u32)?;
            for (q, c) in qubits.into_iter().zip(clbits) {
                builder.measure(q, c).for_framework(FRAMEWORK)?;
            }
        }
        "IdentityGate" => {
            for q in qubits {
                builder
                    .apply(GateTag::I, Vec::new(), [q])
                    .for_framework(FRAMEWORK)?;
            }
        }
        "MatrixGate" => {
            let rows = gate
                .matrix
                .as_deref()
                .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "MatrixGate without a matrix"))?;
            let matrix = from_pairs(rows)
                .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "matrix is not square"))?;
            let unitary = Gate::unitary(matrix).for_framework(FRAMEWORK)?;
            builder.gate(unitary, qubits).for_framework(FRAMEWORK)?;
        }
        _ => {
            let (native, params) = classify(gate, builder.registry_mut())?;
            let tag = CIRQ_TABLE.tag(native).ok_or_else(|| unsupported(gate))?;
            builder.apply(tag, params, qubits).for_framework(FRAMEWORK)?;
        }
    }
    Ok(())
}

/// Native identifier and IR parameters of a unitary gate object.
fn classify(
    gate: &CirqGate,
    registry: &mut ParameterRegistry,
) -> ConvertResult<(&'static str, Vec<Param>)> {
    let kind = gate.cirq_type.as_str();
    if let Some(native) = match kind {
        "Rx" => Some("cirq.Rx"),
        "Ry" => Some("cirq.Ry"),
        "Rz" => Some("cirq.Rz"),
        _ => None,
    } {
        let rads = gate
            .rads
            .as_ref()
            .ok_or_else(|| ConvertError::malformed(FRAMEWORK, format!("{kind} without rads")))?;
        return Ok((native, vec![to_param(rads, registry)?]));
    }
    if kind == "CSwapGate" {
        return Ok(("cirq.FREDKIN", Vec::new()));
    }

    let exponent = match &gate.exponent {
        Some(value) => to_param(value, registry)?,
        None => Param::Const(1.0),
    };
    let fixed = exponent.as_f64();
    let is = |target: f64| fixed.is_some_and(|e| (e - target).abs() < EXPONENT_ATOL);
    // Self-inverse gates are unchanged by exponent -1.
    let involution = is(1.0) || is(-1.0);
    let angle = || vec![Param::Pi * exponent.clone()];

    let decoded = match kind {
        "HPowGate" if involution => ("cirq.H", Vec::new()),
        "XPowGate" if involution => ("cirq.X", Vec::new()),
        "XPowGate" if is(0.5) => ("cirq.X**0.5", Vec::new()),
        "XPowGate" if is(-0.5) => ("cirq.X**-0.5", Vec::new()),
        // X**t equals Rx(pi * t) up to global phase; likewise for Y.
        "XPowGate" => ("cirq.Rx", angle()),
        "YPowGate" if involution => ("cirq.Y", Vec::new()),
        "YPowGate" => ("cirq.Ry", angle()),
        "ZPowGate" if involution => ("cirq.Z", Vec::new()),
        "ZPowGate" if is(0.5) => ("cirq.S", Vec::new()),
        "ZPowGate" if is(-0.5) => ("cirq.S**-1", Vec::new()),
        "ZPowGate" if is(0.25) => ("cirq.T", Vec::new()),
        "ZPowGate" if is(-0.25) => ("cirq.T**-1", Vec::new()),
        "ZPowGate" => ("cirq.ZPowGate", angle()),
        "CZPowGate" if involution => ("cirq.CZ", Vec::new()),
        "CZPowGate" => ("cirq.CZPowGate", angle()),
        "CXPowGate" | "CNotPowGate" if involution => ("cirq.CNOT", Vec::new()),
        "SwapPowGate" if involution => ("cirq.SWAP", Vec::new()),
        "ISwapPowGate" if is(1.0) => ("cirq.ISWAP", Vec::new()),
        "CCXPowGate" | "CCNotPowGate" if involution => ("cirq.TOFFOLI", Vec::new()),
        "XXPowGate" => ("cirq.XXPowGate", angle()),
        "YYPowGate" => ("cirq.YYPowGate", angle()),
        "ZZPowGate" => ("cirq.ZZPowGate", angle()),
        _ => return Err(unsupported(gate)),
    };
    Ok(decoded)
}

fn unsupported(gate: &CirqGate) -> ConvertError {
    let native = match &gate.exponent {
        Some(CirqValue::Number(e)) if *e != 1.0 => format!("{}**{e}", gate.cirq_type),
        _ => gate.cirq_type.clone(),
    };
    ConvertError::UnsupportedGate {
        framework: FRAMEWORK,
        native,
    }
}

fn encode_instruction(inst: &Instruction) -> ConvertResult<Operation> {
    let gate = inst.gate();
    let xs = inst.qubits().iter().map(|q| q.0);
    let native = CIRQ_TABLE
        .native(gate.tag())
        .ok_or_else(|| ConvertError::UnsupportedGate {
            framework: FRAMEWORK,
            native: gate.tag().name().to_string(),
        })?;
    let power = |cirq_type: &str, exponent: f64| {
        CirqGate::eigen(cirq_type, CirqValue::Number(exponent), 0.0)
    };
    // Angle over pi, the exponent Cirq's EigenGates take.
    let half_turns = || -> ConvertResult<CirqValue> {
        let angle = gate
            .params()
            .first()
            .ok_or_else(|| ConvertError::malformed(FRAMEWORK, format!("{gate} has no angle")))?;
        Ok(from_param(&(angle.clone() / Param::Pi)))
    };
    let rotation = |cirq_type: &str| -> ConvertResult<CirqGate> {
        let angle = gate
            .params()
            .first()
            .ok_or_else(|| ConvertError::malformed(FRAMEWORK, format!("{gate} has no angle")))?;
        Ok(CirqGate {
            rads: Some(from_param(angle)),
            ..CirqGate::named(cirq_type)
        })
    };

    let cirq_gate = match native {
        "cirq.H" => power("HPowGate", 1.0),
        "cirq.X" => power("XPowGate", 1.0),
        "cirq.Y" => power("YPowGate", 1.0),
        "cirq.Z" => power("ZPowGate", 1.0),
        "cirq.S" => power("ZPowGate", 0.5),
        "cirq.S**-1" => power("ZPowGate", -0.5),
        "cirq.T" => power("ZPowGate", 0.25),
        "cirq.T**-1" => power("ZPowGate", -0.25),
        "cirq.X**0.5" => power("XPowGate", 0.5),
        "cirq.X**-0.5" => power("XPowGate", -0.5),
        "cirq.ZPowGate" => CirqGate::eigen("ZPowGate", half_turns()?, 0.0),
        "cirq.Rx" => rotation("Rx")?,
        "cirq.Ry" => rotation("Ry")?,
        "cirq.Rz" => rotation("Rz")?,
        "cirq.I" => CirqGate {
            qid_shape: Some(vec![2]),
            ..CirqGate::named("IdentityGate")
        },
        "cirq.CNOT" => power("CXPowGate", 1.0),
        "cirq.CZ" => power("CZPowGate", 1.0),
        "cirq.CZPowGate" => CirqGate::eigen("CZPowGate", half_turns()?, 0.0),
        "cirq.SWAP" => power("SwapPowGate", 1.0),
        "cirq.ISWAP" => power("ISwapPowGate", 1.0),
        "cirq.XXPowGate" => CirqGate::eigen("XXPowGate", half_turns()?, -0.5),
        "cirq.YYPowGate" => CirqGate::eigen("YYPowGate", half_turns()?, -0.5),
        "cirq.ZZPowGate" => CirqGate::eigen("ZZPowGate", half_turns()?, -0.5),
        "cirq.TOFFOLI" => power("CCXPowGate", 1.0),
        "cirq.FREDKIN" => CirqGate::named("CSwapGate"),
        "cirq.MatrixGate" => {
            let matrix = gate
                .matrix()
                .ok_or_else(|| ConvertError::malformed(FRAMEWORK, "unitary without a matrix"))?;
            let width = qubits_of(matrix).unwrap_or(0);
            CirqGate {
                matrix: Some(to_pairs(matrix)),
                qid_shape: Some(vec![2; width as usize]),
                ..CirqGate::named("MatrixGate")
            }
        }
        "cirq.MeasurementGate" => {
            let clbit = inst.clbits().first().map_or(0, |c| c.0);
            CirqGate {
                num_qubits: Some(1),
                key: Some(format!("c{clbit}")),
                ..CirqGate::named("MeasurementGate")
            }
        }
        other => {
            return Err(ConvertError::UnsupportedGate {
                framework: FRAMEWORK,
                native: other.to_string(),
            });
        }
    };
    Ok(Operation::new(cirq_gate, xs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::Bindings;
    use qbridge_synth::EquivalenceOracle;
    use std::f64::consts::PI;

    fn op(gate: CirqGate, xs: &[u32]) -> Operation {
        Operation::new(gate, xs.iter().copied())
    }

    fn power(kind: &str, exponent: f64) -> CirqGate {
        CirqGate::eigen(kind, CirqValue::Number(exponent), 0.0)
    }

    #[test]
    fn test_table_bijective_and_covers_core() {
        assert!(CIRQ_TABLE.is_bijective());
        assert!(CIRQ_TABLE.missing_common_core().is_empty());
        assert!(CIRQ_TABLE.supports_free_parameters());
    }

    #[test]
    fn test_named_powers() {
        let native = CirqCircuit::from_operations([
            op(power("ZPowGate", 0.5), &[0]),
            op(power("ZPowGate", -0.25), &[0]),
            op(power("XPowGate", 0.5), &[0]),
            op(power("ZPowGate", 0.3), &[0]),
            op(power("CXPowGate", 1.0), &[0, 1]),
        ]);
        let circuit = CirqAdapter.decode(&native).unwrap();
        let tags: Vec<GateTag> = circuit.instructions().iter().map(|i| i.tag()).collect();
        assert_eq!(
            tags,
            vec![GateTag::S, GateTag::Tdg, GateTag::SX, GateTag::Phase, GateTag::CX]
        );
        let phase = circuit.instructions()[3].gate().params()[0].as_f64().unwrap();
        assert!((phase - 0.3 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_num_qubits_from_highest_line_qubit() {
        let native = CirqCircuit::from_operations([op(power("HPowGate", 1.0), &[4])]);
        let circuit = CirqAdapter.decode(&native).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.referenced_qubits().len(), 1);
    }

    #[test]
    fn test_fractional_hadamard_unsupported() {
        let native = CirqCircuit::from_operations([op(power("HPowGate", 0.5), &[0])]);
        let err = CirqAdapter.decode(&native).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedGate { ref native, .. } if native == "HPowGate**0.5"
        ));
    }

    #[test]
    fn test_measurement_keys() {
        let measure = |key: &str, width: u32| CirqGate {
            num_qubits: Some(width),
            key: Some(key.into()),
            ..CirqGate::named("MeasurementGate")
        };
        let native = CirqCircuit::from_operations([
            op(measure("c2", 1), &[0]),
            op(measure("result", 2), &[1, 2]),
        ]);
        let circuit = CirqAdapter.decode(&native).unwrap();
        let clbits: Vec<u32> = circuit
            .instructions()
            .iter()
            .flat_map(|i| i.clbits().iter().map(|c| c.0))
            .collect();
        assert_eq!(clbits, vec![2, 3, 4]);
        assert_eq!(circuit.num_clbits(), 5);
    }

    #[test]
    fn test_measurement_key_past_bit_range_is_malformed() {
        let measure = |key: &str, width: u32| CirqGate {
            num_qubits: Some(width),
            key: Some(key.into()),
            ..CirqGate::named("MeasurementGate")
        };
        let explicit = CirqCircuit::from_operations([op(measure("c4294967295", 1), &[0])]);
        assert!(matches!(
            CirqAdapter.decode(&explicit).unwrap_err(),
            ConvertError::Malformed { .. }
        ));

        let block = CirqCircuit::from_operations([
            op(measure("c4294967294", 1), &[0]),
            op(measure("result", 2), &[1, 2]),
        ]);
        assert!(matches!(
            CirqAdapter.decode(&block).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }

    #[test]
    fn test_rxx_and_phase_round_trip() {
        let mut b = Circuit::builder(2, 1);
        b.apply(GateTag::RXX, vec![Param::Const(0.7)], [QubitId(0), QubitId(1)])
            .unwrap();
        b.apply(GateTag::CPhase, vec![Param::Const(-1.2)], [QubitId(1), QubitId(0)])
            .unwrap();
        b.apply(GateTag::U, vec![0.1.into(), 0.2.into(), 0.3.into()], [QubitId(1)])
            .unwrap();
        b.measure(QubitId(1), ClbitId(0)).unwrap();
        let circuit = b.build();

        let native = CirqAdapter.encode(&circuit, &Bindings::new()).unwrap();
        let decoded = CirqAdapter.decode(&native).unwrap();
        assert!(EquivalenceOracle::default().equivalent(&circuit, &decoded).unwrap());
        assert!(decoded.instructions().last().unwrap().is_measure());
    }

    #[test]
    fn test_symbolic_exponent_kept() {
        let mut b = Circuit::builder(1, 0);
        let theta = b.param("theta");
        b.apply(GateTag::Phase, vec![theta], [QubitId(0)]).unwrap();
        let circuit = b.build();

        let native = CirqAdapter.encode(&circuit, &Bindings::new()).unwrap();
        let exponent = native.moments[0].operations[0].gate.exponent.clone();
        assert!(matches!(exponent, Some(CirqValue::Symbolic(_))));

        let decoded = CirqAdapter.decode(&native).unwrap();
        assert!(decoded.is_parameterized());
        let bindings = Bindings::new().with("theta", 0.9);
        assert!(
            EquivalenceOracle::default()
                .equivalent(
                    &circuit.bind(&bindings).unwrap(),
                    &decoded.bind(&bindings).unwrap()
                )
                .unwrap()
        );
    }

    #[test]
    fn test_grid_qubits_rejected() {
        let mut native = CirqCircuit::from_operations([op(power("XPowGate", 1.0), &[0])]);
        native.moments[0].operations[0].qubits[0].cirq_type = "GridQubit".into();
        assert!(matches!(
            CirqAdapter.decode(&native).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }

    #[test]
    fn test_largest_line_qubit_is_malformed() {
        let native = CirqCircuit::from_operations([op(power("XPowGate", 1.0), &[u32::MAX])]);
        assert!(matches!(
            CirqAdapter.decode(&native).unwrap_err(),
            ConvertError::Malformed { .. }
        ));
    }
}
