//! Single-qubit synthesis into `RZ · RY · RZ`.

use qbridge_ir::{GateTag, IrResult};

use crate::substitute::Substitute;
use crate::unitary::{ANGLE_EPSILON, Unitary2x2, normalize_angle};

/// Rotations reproducing `u` on `operand`, in time order, up to global phase.
///
/// A diagonal `u` yields a single `RZ`; anything else yields
/// `RZ(λ)`, `RY(θ)`, `RZ(φ)`.
pub fn euler_substitutes(u: &Unitary2x2, operand: usize) -> IrResult<Vec<Substitute>> {
    let angles = u.zyz();
    if angles.theta.abs() < ANGLE_EPSILON {
        let total = normalize_angle(angles.phi + angles.lambda);
        return Ok(vec![Substitute::rotation(GateTag::RZ, total, operand)?]);
    }
    Ok(vec![
        Substitute::rotation(GateTag::RZ, normalize_angle(angles.lambda), operand)?,
        Substitute::rotation(GateTag::RY, angles.theta, operand)?,
        Substitute::rotation(GateTag::RZ, normalize_angle(angles.phi), operand)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::standard_matrix;

    /// Multiply out a single-qubit sequence, in time order.
    fn product(sequence: &[Substitute]) -> Option<Unitary2x2> {
        sequence.iter().try_fold(Unitary2x2::identity(), |acc, sub| {
            let m = Unitary2x2::from_matrix(sub.gate.matrix()?)?;
            Some(m * acc)
        })
    }

    fn check(tag: GateTag, params: &[f64]) -> usize {
        let u = Unitary2x2::from_matrix(&standard_matrix(tag, params).unwrap()).unwrap();
        let seq = euler_substitutes(&u, 0).unwrap();
        assert!(seq.iter().all(|s| s.gate.tag().is_common_core()));
        assert!(
            product(&seq).unwrap().equiv_up_to_phase(&u, 1e-9),
            "euler failed for {tag}{params:?}"
        );
        seq.len()
    }

    #[test]
    fn test_diagonal_gates_give_single_rz() {
        assert_eq!(check(GateTag::T, &[]), 1);
        assert_eq!(check(GateTag::Phase, &[0.8]), 1);
        assert_eq!(check(GateTag::I, &[]), 1);
    }

    #[test]
    fn test_general_gates_give_three_rotations() {
        assert_eq!(check(GateTag::H, &[]), 3);
        assert_eq!(check(GateTag::SX, &[]), 3);
        assert_eq!(check(GateTag::U, &[1.2, -0.4, 2.9]), 3);
        assert_eq!(check(GateTag::Y, &[]), 3);
    }
}
