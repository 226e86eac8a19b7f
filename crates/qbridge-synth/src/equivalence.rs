//! Unitary equivalence of circuits, up to global phase.
//!
//! The oracle multiplies out the full `2^n × 2^n` matrix, so it refuses
//! circuits wider than its qubit ceiling.

use num_complex::Complex64;
use qbridge_ir::{Circuit, GateMatrix, IrError, matrix};
use tracing::{debug, instrument};

use crate::error::{SynthError, SynthResult};

/// Default qubit ceiling for dense unitary comparison.
pub const DEFAULT_MAX_QUBITS: u32 = 12;

/// Hard qubit ceiling. A 14-qubit unitary already takes 4 GiB.
pub const MAX_DENSE_QUBITS: u32 = 14;

/// Default elementwise tolerance.
pub const DEFAULT_ATOL: f64 = 1e-8;

/// Dense unitary simulator and comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceOracle {
    /// Widest circuit the oracle will multiply out, never above
    /// [`MAX_DENSE_QUBITS`].
    pub max_qubits: u32,
    /// Elementwise tolerance after phase alignment.
    pub atol: f64,
}

impl Default for EquivalenceOracle {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            atol: DEFAULT_ATOL,
        }
    }
}

impl EquivalenceOracle {
    /// An oracle with the given ceiling and tolerance. The ceiling is
    /// clamped to [`MAX_DENSE_QUBITS`].
    pub fn new(max_qubits: u32, atol: f64) -> Self {
        Self {
            max_qubits: max_qubits.min(MAX_DENSE_QUBITS),
            atol,
        }
    }

    /// The unitary implemented by `circuit`, with qubit 0 as the most
    /// significant bit.
    ///
    /// Measurements contribute the identity. Free parameters are an error.
    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits(), ops = circuit.len()))]
    pub fn unitary_of(&self, circuit: &Circuit) -> SynthResult<GateMatrix> {
        let n = circuit.num_qubits();
        let limit = self.max_qubits.min(MAX_DENSE_QUBITS);
        if n > limit {
            return Err(SynthError::ResourceLimit { qubits: n, limit });
        }
        let mut u = matrix::identity(1 << n);
        for inst in circuit.instructions() {
            if inst.is_measure() {
                continue;
            }
            let gate = inst.gate();
            let Some(g) = gate.matrix() else {
                if let Some(r) = gate.params().iter().flat_map(|p| p.refs()).next() {
                    return Err(IrError::UnboundParameter(r.name).into());
                }
                return Err(IrError::InvalidMatrix(format!("gate '{}' has no matrix", gate.tag())).into());
            };
            let positions: Vec<usize> = inst.qubits().iter().map(|q| q.index()).collect();
            apply_gate(&mut u, g, &positions, n as usize);
        }
        Ok(u)
    }

    /// Whether `a` and `b` implement the same unitary up to global phase.
    pub fn equivalent(&self, a: &Circuit, b: &Circuit) -> SynthResult<bool> {
        if a.num_qubits() != b.num_qubits() {
            return Err(SynthError::QubitCountMismatch {
                left: a.num_qubits(),
                right: b.num_qubits(),
            });
        }
        let ua = self.unitary_of(a)?;
        let ub = self.unitary_of(b)?;
        let same = equal_up_to_phase(&ua, &ub, self.atol);
        debug!(same, qubits = a.num_qubits(), "compared circuit unitaries");
        Ok(same)
    }
}

/// Left-multiply `u` by `g` acting on `qubits` of an `n`-qubit register.
fn apply_gate(u: &mut GateMatrix, g: &GateMatrix, qubits: &[usize], n: usize) {
    let k = qubits.len();
    let masks: Vec<usize> = qubits.iter().map(|&q| 1 << (n - 1 - q)).collect();
    let all: usize = masks.iter().fold(0, |acc, m| acc | m);
    let offsets: Vec<usize> = (0..1usize << k)
        .map(|local| {
            masks
                .iter()
                .enumerate()
                .filter(|(j, _)| (local >> (k - 1 - j)) & 1 == 1)
                .fold(0, |acc, (_, m)| acc | m)
        })
        .collect();

    let dim = 1usize << n;
    let zero = Complex64::new(0.0, 0.0);
    let mut column = vec![zero; offsets.len()];
    for base in (0..dim).filter(|i| i & all == 0) {
        for col in 0..dim {
            for (slot, &off) in column.iter_mut().zip(&offsets) {
                *slot = u[[base | off, col]];
            }
            for (r, &off) in offsets.iter().enumerate() {
                u[[base | off, col]] = column
                    .iter()
                    .enumerate()
                    .map(|(s, &v)| g[[r, s]] * v)
                    .sum();
            }
        }
    }
}

/// Whether `a ≈ e^{iφ}·b` for some global phase `φ`.
///
/// The phase is read off the largest entry of `b`, then every entry is
/// compared within `atol`.
pub fn equal_up_to_phase(a: &GateMatrix, b: &GateMatrix, atol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    let Some(((i, j), pivot)) = b
        .indexed_iter()
        .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
    else {
        return true;
    };
    if pivot.norm() < atol {
        return a.iter().all(|x| x.norm() <= atol);
    }
    let ratio = a[[i, j]] / pivot;
    if (ratio.norm() - 1.0).abs() > atol {
        return false;
    }
    let phase = ratio / ratio.norm();
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - phase * y).norm() <= atol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::{Bindings, ClbitId, GateTag, QubitId, standard_matrix};
    use std::f64::consts::FRAC_1_SQRT_2;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_ceiling_is_clamped() {
        assert_eq!(EquivalenceOracle::new(64, 1e-8).max_qubits, MAX_DENSE_QUBITS);
        assert_eq!(EquivalenceOracle::new(5, 1e-8).max_qubits, 5);

        let oversized = EquivalenceOracle {
            max_qubits: 40,
            atol: 1e-8,
        };
        let wide = Circuit::builder(MAX_DENSE_QUBITS + 1, 0).build();
        assert!(matches!(
            oversized.unitary_of(&wide),
            Err(SynthError::ResourceLimit { qubits: 15, limit: MAX_DENSE_QUBITS })
        ));
    }

    #[test]
    fn test_bell_unitary() {
        let mut b = Circuit::builder(2, 2);
        b.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        b.measure(QubitId(0), ClbitId(0)).unwrap();
        let u = EquivalenceOracle::default().unitary_of(&b.build()).unwrap();

        let s = FRAC_1_SQRT_2;
        let expected = matrix::from_rows(&[
            vec![c(s, 0.0), c(0.0, 0.0), c(s, 0.0), c(0.0, 0.0)],
            vec![c(0.0, 0.0), c(s, 0.0), c(0.0, 0.0), c(s, 0.0)],
            vec![c(0.0, 0.0), c(s, 0.0), c(0.0, 0.0), c(-s, 0.0)],
            vec![c(s, 0.0), c(0.0, 0.0), c(-s, 0.0), c(0.0, 0.0)],
        ])
        .unwrap();
        assert!(matrix::approx_eq(&u, &expected, 1e-12));
    }

    #[test]
    fn test_reversed_cx_matches_reversed_matrix() {
        let mut b = Circuit::builder(2, 0);
        b.cx(QubitId(1), QubitId(0)).unwrap();
        let u = EquivalenceOracle::default().unitary_of(&b.build()).unwrap();
        let cx = standard_matrix(GateTag::CX, &[]).unwrap();
        assert!(matrix::approx_eq(&u, &matrix::reverse_qubit_order(&cx), 1e-12));
    }

    #[test]
    fn test_global_phase_ignored() {
        let mut a = Circuit::builder(1, 0);
        a.rz(0.7, QubitId(0)).unwrap();
        let mut b = Circuit::builder(1, 0);
        b.apply(GateTag::Phase, vec![0.7.into()], [QubitId(0)]).unwrap();
        assert!(EquivalenceOracle::default().equivalent(&a.build(), &b.build()).unwrap());
    }

    #[test]
    fn test_different_gates_not_equivalent() {
        let mut a = Circuit::builder(1, 0);
        a.x(QubitId(0)).unwrap();
        let mut b = Circuit::builder(1, 0);
        b.h(QubitId(0)).unwrap();
        assert!(!EquivalenceOracle::default().equivalent(&a.build(), &b.build()).unwrap());
    }

    #[test]
    fn test_resource_limit() {
        let mut b = Circuit::builder(13, 0);
        b.h(QubitId(12)).unwrap();
        let err = EquivalenceOracle::default().unitary_of(&b.build()).unwrap_err();
        assert!(matches!(
            err,
            SynthError::ResourceLimit {
                qubits: 13,
                limit: 12
            }
        ));
    }

    #[test]
    fn test_qubit_count_mismatch() {
        let a = Circuit::builder(1, 0).build();
        let b = Circuit::builder(2, 0).build();
        assert!(matches!(
            EquivalenceOracle::default().equivalent(&a, &b),
            Err(SynthError::QubitCountMismatch { left: 1, right: 2 })
        ));
    }

    #[test]
    fn test_unbound_parameter_rejected() {
        let mut b = Circuit::builder(1, 0);
        let theta = b.param("theta");
        b.rx(theta, QubitId(0)).unwrap();
        let circuit = b.build();
        let err = EquivalenceOracle::default().unitary_of(&circuit).unwrap_err();
        assert!(matches!(err, SynthError::Ir(IrError::UnboundParameter(ref n)) if n == "theta"));

        let bound = circuit.bind(&Bindings::new().with("theta", 0.2)).unwrap();
        assert!(EquivalenceOracle::default().unitary_of(&bound).is_ok());
    }
}
