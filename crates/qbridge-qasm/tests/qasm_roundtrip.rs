//! Property tests: random common-core circuits survive emit -> parse.

use proptest::prelude::*;
use qbridge_ir::{Bindings, Circuit, GateTag, QubitId};
use qbridge_qasm::{QasmAdapter, parse};
use qbridge_synth::{EquivalenceOracle, FrameworkAdapter};

const ATOL: f64 = 1e-7;

#[derive(Debug, Clone)]
struct Op {
    tag: GateTag,
    angle: f64,
    a: u32,
    b: u32,
}

fn op_strategy(num_qubits: u32) -> impl Strategy<Value = Op> {
    (
        prop::sample::select(GateTag::COMMON_CORE.to_vec()),
        -4.0f64..4.0,
        0..num_qubits,
        0..num_qubits,
    )
        .prop_map(|(tag, angle, a, b)| Op { tag, angle, a, b })
}

fn circuit_strategy() -> impl Strategy<Value = Circuit> {
    (1u32..=4).prop_flat_map(|n| {
        prop::collection::vec(op_strategy(n), 0..12).prop_map(move |ops| {
            let mut b = Circuit::builder(n, 0);
            for op in ops {
                let params = vec![op.angle.into(); op.tag.num_params()];
                let qubits = match op.tag.num_qubits() {
                    Some(2) if n == 1 || op.a == op.b => continue,
                    Some(2) => vec![QubitId(op.a), QubitId(op.b)],
                    _ => vec![QubitId(op.a)],
                };
                b.apply(op.tag, params, qubits).unwrap();
            }
            b.build()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn common_core_roundtrips_through_both_versions(circuit in circuit_strategy()) {
        let oracle = EquivalenceOracle::new(12, ATOL);
        for adapter in [QasmAdapter::v2(), QasmAdapter::v3()] {
            let text = adapter.encode(&circuit, &Bindings::new()).unwrap();
            let decoded = adapter.decode(&text).unwrap();
            prop_assert_eq!(decoded.len(), circuit.len());
            prop_assert!(oracle.equivalent(&circuit, &decoded).unwrap());
        }
    }
}

#[test]
fn qelib_style_program_decodes() {
    let source = r#"
        // GHZ with a custom gate
        OPENQASM 2.0;
        include "qelib1.inc";
        gate entangle a, b { cx a, b; }
        qreg q[3];
        creg c[3];
        h q[0];
        entangle q[0], q[1];
        entangle q[1], q[2];
        barrier q;
        measure q -> c;
    "#;
    let circuit = parse(source).unwrap();
    assert_eq!(circuit.gate_counts()[&GateTag::CX], 2);
    assert_eq!(circuit.gate_counts()[&GateTag::Measure], 3);
}
