//! Randomized checks that numeric synthesis reproduces its input.
//!
//! Every synthesized sequence must consist of common-core gates and match
//! the original unitary up to global phase.

use proptest::prelude::*;
use qbridge_ir::{Circuit, Gate, GateTag, QubitId};
use qbridge_synth::random::haar_unitary;
use qbridge_synth::substitute::place;
use qbridge_synth::{Decomposer, EquivalenceOracle, equal_up_to_phase};
use rand::SeedableRng;
use rand::rngs::StdRng;

const CASES: usize = 1000;
const ATOL: f64 = 1e-8;

fn synthesize(gate: &Gate) -> Circuit {
    let n = gate.num_qubits();
    let qubits: Vec<QubitId> = (0..n).map(QubitId).collect();
    let sequence = Decomposer::new().decompose(gate).expect("decomposition failed");
    let mut b = Circuit::builder(n, 0);
    for inst in place(&sequence, &qubits).expect("placement failed") {
        assert!(inst.tag().is_common_core(), "non-core gate {}", inst.tag());
        b.push(inst).expect("out of range");
    }
    b.build()
}

fn check_random(dim: usize, seed: u64) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);
    let oracle = EquivalenceOracle::default();
    let mut max_cx = 0;
    for case in 0..CASES {
        let u = haar_unitary(dim, &mut rng);
        let gate = Gate::unitary(u.clone()).expect("haar sample is unitary");
        let circuit = synthesize(&gate);
        let got = oracle.unitary_of(&circuit).expect("simulation failed");
        assert!(
            equal_up_to_phase(&got, &u, ATOL),
            "case {case}: synthesized circuit differs from its input"
        );
        max_cx = max_cx.max(circuit.gate_counts().get(&GateTag::CX).copied().unwrap_or(0));
    }
    max_cx
}

#[test]
fn test_random_single_qubit_unitaries() {
    assert_eq!(check_random(2, 0x5eed_0001), 0);
}

#[test]
fn test_random_two_qubit_unitaries() {
    assert!(check_random(4, 0x5eed_0002) <= 3);
}

proptest! {
    /// U(θ, φ, λ) survives the closed-form rule and Euler resynthesis alike.
    #[test]
    fn test_u_gate_synthesis(
        theta in -6.3_f64..6.3,
        phi in -6.3_f64..6.3,
        lambda in -6.3_f64..6.3,
    ) {
        let gate = Gate::new(GateTag::U, vec![theta.into(), phi.into(), lambda.into()]).unwrap();
        let expected = gate.matrix().unwrap().clone();

        let by_rule = EquivalenceOracle::default().unitary_of(&synthesize(&gate)).unwrap();
        prop_assert!(equal_up_to_phase(&by_rule, &expected, ATOL));

        let as_matrix = Gate::unitary(expected.clone()).unwrap();
        let by_euler = EquivalenceOracle::default().unitary_of(&synthesize(&as_matrix)).unwrap();
        prop_assert!(equal_up_to_phase(&by_euler, &expected, ATOL));
    }

    /// Controlled rotations keep their angle through KAK synthesis.
    #[test]
    fn test_controlled_rotation_kak(angle in -6.3_f64..6.3, which in 0usize..4) {
        let tag = [GateTag::CRX, GateTag::CRY, GateTag::CRZ, GateTag::CPhase][which];
        let gate = Gate::new(tag, vec![angle.into()]).unwrap();
        let expected = gate.matrix().unwrap().clone();
        let circuit = synthesize(&Gate::unitary(expected.clone()).unwrap());
        let got = EquivalenceOracle::default().unitary_of(&circuit).unwrap();
        prop_assert!(equal_up_to_phase(&got, &expected, ATOL));
    }
}
