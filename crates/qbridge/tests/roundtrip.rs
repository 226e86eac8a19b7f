//! Cross-framework round trips over the common gate core.
//!
//! For every framework pair (X, Y) a circuit is encoded to X, decoded,
//! pushed through Y twice, and compared with the original by the unitary
//! oracle.

use proptest::prelude::*;
use qbridge::registry;
use qbridge::{
    Bindings, Circuit, FrameworkId, GateTag, NativeCircuit, TranspileOptions,
    circuits_equivalent_with, transpile,
};
use qbridge_ir::{Gate, Param, QubitId};
use qbridge_synth::EquivalenceOracle;

const ATOL: f64 = 1e-7;

fn oracle() -> EquivalenceOracle {
    EquivalenceOracle::new(12, ATOL)
}

/// Frameworks that infer their width from the highest touched qubit can
/// report fewer qubits than declared; pad back to the original width.
fn widen(circuit: Circuit, width: u32) -> Circuit {
    if circuit.num_qubits() == width {
        return circuit;
    }
    circuit
        .with_shape(width, circuit.instructions().to_vec())
        .unwrap()
}

fn through(circuit: &Circuit, framework: FrameworkId) -> Circuit {
    let native = registry::encode(circuit, framework, &Bindings::new(), ATOL)
        .unwrap_or_else(|e| panic!("encode to {framework} failed: {e}"));
    let decoded = registry::decode(&native)
        .unwrap_or_else(|e| panic!("decode from {framework} failed: {e}"));
    widen(decoded, circuit.num_qubits())
}

fn round_trip(c: &Circuit, x: FrameworkId, y: FrameworkId) -> Circuit {
    let from_x = through(c, x);
    let once = through(&from_x, y);
    through(&once, y)
}

fn gate_for(tag: GateTag, angle: f64) -> Gate {
    let params = vec![Param::Const(angle); tag.num_params()];
    Gate::new(tag, params).unwrap()
}

/// One core gate on the last `arity` qubits (reversed, so controls are not
/// always qubit 0), preceded by an H layer that touches every qubit.
fn single_gate_circuit(tag: GateTag, num_qubits: u32) -> Option<Circuit> {
    let gate = gate_for(tag, 0.7);
    let arity = gate.num_qubits();
    if arity > num_qubits {
        return None;
    }
    let mut b = Circuit::builder(num_qubits, 0);
    for q in 0..num_qubits {
        b.h(QubitId(q)).unwrap();
    }
    let operands: Vec<QubitId> = (num_qubits - arity..num_qubits).rev().map(QubitId).collect();
    b.gate(gate, operands).unwrap();
    Some(b.build())
}

#[test]
fn test_common_core_round_trips_between_every_pair() {
    let oracle = oracle();
    for x in FrameworkId::ALL {
        for y in FrameworkId::ALL {
            for tag in GateTag::COMMON_CORE {
                for n in 1..=4 {
                    let Some(c) = single_gate_circuit(tag, n) else {
                        continue;
                    };
                    let result = round_trip(&c, x, y);
                    assert!(
                        oracle.equivalent(&c, &result).unwrap(),
                        "{tag} on {n} qubits failed {x} -> {y}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_round_trip_is_stable_after_first_pass() {
    let c = single_gate_circuit(GateTag::Swap, 3).unwrap();
    for framework in FrameworkId::ALL {
        let once = through(&c, framework);
        let twice = through(&once, framework);
        assert_eq!(once, twice, "{framework} is not a fixed point");
    }
}

#[test]
fn test_symbolic_parameters_survive_symbolic_frameworks() {
    let mut b = Circuit::builder(2, 0);
    let theta = b.param("theta");
    b.rx(theta.clone(), QubitId(0)).unwrap();
    b.rz(theta * Param::Const(2.0), QubitId(1)).unwrap();
    b.cx(QubitId(0), QubitId(1)).unwrap();
    let c = b.build();
    let bound = c.bind(&Bindings::new().with("theta", 0.3)).unwrap();

    let symbolic = [
        FrameworkId::Qiskit,
        FrameworkId::Cirq,
        FrameworkId::Braket,
        FrameworkId::OpenQasm3,
    ];
    for framework in symbolic {
        let back = through(&c, framework);
        assert!(back.is_parameterized(), "{framework} lost the parameter");
        assert_eq!(back.free_parameters()[0].name, "theta");
        let back_bound = back.bind(&Bindings::new().with("theta", 0.3)).unwrap();
        assert!(
            oracle().equivalent(&bound, &back_bound).unwrap(),
            "{framework} changed the expression"
        );
    }
}

#[test]
fn test_reversed_dense_output_matches_its_source() {
    let source = NativeCircuit::detect(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[5];\nh q[0];\ncx q[0], q[2];\nry(0.3) q[4];\ncx q[4], q[2];\n",
    )
    .unwrap();
    let reversed = TranspileOptions::new().contiguous(true);
    let forward = TranspileOptions::new().contiguous(false);

    for framework in FrameworkId::ALL {
        let out = transpile(&source, framework, &reversed).unwrap();
        assert!(
            circuits_equivalent_with(&source, &out, &reversed).unwrap(),
            "{framework} output does not match its source"
        );
        assert!(
            !circuits_equivalent_with(&source, &out, &forward).unwrap(),
            "{framework} output was not mirrored"
        );
    }
}

fn core_instruction(num_qubits: u32) -> impl Strategy<Value = (GateTag, Vec<u32>, f64)> {
    let tags: Vec<GateTag> = GateTag::COMMON_CORE
        .iter()
        .copied()
        .filter(|t| t.num_qubits().is_some_and(|a| a <= num_qubits))
        .collect();
    (
        proptest::sample::select(tags),
        Just((0..num_qubits).collect::<Vec<u32>>()).prop_shuffle(),
        -3.0f64..3.0,
    )
}

fn core_circuit() -> impl Strategy<Value = Circuit> {
    (1u32..=4).prop_flat_map(|n| {
        proptest::collection::vec(core_instruction(n), 1..12).prop_map(move |ops| {
            let mut b = Circuit::builder(n, 0);
            for (tag, qubits, angle) in ops {
                let gate = gate_for(tag, angle);
                let arity = gate.num_qubits() as usize;
                b.gate(gate, qubits[..arity].iter().copied().map(QubitId))
                    .unwrap();
            }
            b.build()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_random_core_circuits_round_trip(
        c in core_circuit(),
        x in proptest::sample::select(FrameworkId::ALL.to_vec()),
        y in proptest::sample::select(FrameworkId::ALL.to_vec()),
    ) {
        let result = round_trip(&c, x, y);
        prop_assert!(oracle().equivalent(&c, &result).unwrap());
    }

    #[test]
    fn prop_oracle_is_reflexive_and_symmetric(a in core_circuit(), b in core_circuit()) {
        let oracle = oracle();
        prop_assert!(oracle.equivalent(&a, &a).unwrap());
        if a.num_qubits() == b.num_qubits() {
            prop_assert_eq!(
                oracle.equivalent(&a, &b).unwrap(),
                oracle.equivalent(&b, &a).unwrap()
            );
        }
    }
}
