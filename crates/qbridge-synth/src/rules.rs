//! Closed-form rewrites of gates outside the common core.
//!
//! Every rule works on symbolic parameters as well as numeric ones and
//! emits only common-core gates, so a rewritten gate never needs a second
//! rewrite. Sequences are in time order and agree with the original gate up
//! to global phase.

use qbridge_ir::{Gate, GateTag, IrResult, Param};
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use crate::substitute::Substitute;

fn half(p: &Param) -> Param {
    p.clone() / Param::Const(2.0)
}

fn rot(tag: GateTag, angle: Param, operand: usize) -> IrResult<Substitute> {
    Substitute::new(tag, vec![angle], &[operand])
}

fn fixed(tag: GateTag, operands: &[usize]) -> IrResult<Substitute> {
    Substitute::fixed(tag, operands)
}

/// The 15-gate Toffoli network (six CX) on controls `a`, `b` and target `t`.
fn toffoli(a: usize, b: usize, t: usize) -> IrResult<Vec<Substitute>> {
    use GateTag::{CX, H, T, Tdg};
    Ok(vec![
        fixed(H, &[t])?,
        fixed(CX, &[b, t])?,
        fixed(Tdg, &[t])?,
        fixed(CX, &[a, t])?,
        fixed(T, &[t])?,
        fixed(CX, &[b, t])?,
        fixed(Tdg, &[t])?,
        fixed(CX, &[a, t])?,
        fixed(T, &[b])?,
        fixed(T, &[t])?,
        fixed(H, &[t])?,
        fixed(CX, &[a, b])?,
        fixed(T, &[a])?,
        fixed(Tdg, &[b])?,
        fixed(CX, &[a, b])?,
    ])
}

/// `exp(-iθ/2 Z⊗Z)` conjugated by `basis` on both qubits.
fn two_axis(theta: &Param, basis: &[Substitute; 2], unbasis: &[Substitute; 2]) -> IrResult<Vec<Substitute>> {
    let mut out = basis.to_vec();
    out.push(fixed(GateTag::CX, &[0, 1])?);
    out.push(rot(GateTag::RZ, theta.clone(), 1)?);
    out.push(fixed(GateTag::CX, &[0, 1])?);
    out.extend_from_slice(unbasis);
    Ok(out)
}

/// Closed-form replacement for `gate`, or `None` when no rule exists.
pub fn closed_form(gate: &Gate) -> IrResult<Option<Vec<Substitute>>> {
    use GateTag::*;
    let p = gate.params();
    let seq = match gate.tag() {
        SX => vec![rot(RX, Param::Const(FRAC_PI_2), 0)?],
        SXdg => vec![rot(RX, Param::Const(-FRAC_PI_2), 0)?],
        Phase => vec![rot(RZ, p[0].clone(), 0)?],
        U => vec![
            rot(RZ, p[2].clone(), 0)?,
            rot(RY, p[0].clone(), 0)?,
            rot(RZ, p[1].clone(), 0)?,
        ],
        CY => vec![fixed(Sdg, &[1])?, fixed(CX, &[0, 1])?, fixed(S, &[1])?],
        CH => vec![
            rot(RY, Param::Const(FRAC_PI_4), 1)?,
            fixed(CX, &[0, 1])?,
            rot(RY, Param::Const(-FRAC_PI_4), 1)?,
        ],
        CPhase => vec![
            rot(RZ, half(&p[0]), 0)?,
            fixed(CX, &[0, 1])?,
            rot(RZ, -half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
            rot(RZ, half(&p[0]), 1)?,
        ],
        CRZ => vec![
            rot(RZ, half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
            rot(RZ, -half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
        ],
        CRY => vec![
            rot(RY, half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
            rot(RY, -half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
        ],
        CRX => vec![
            fixed(H, &[1])?,
            rot(RZ, half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
            rot(RZ, -half(&p[0]), 1)?,
            fixed(CX, &[0, 1])?,
            fixed(H, &[1])?,
        ],
        Swap => vec![
            fixed(CX, &[0, 1])?,
            fixed(CX, &[1, 0])?,
            fixed(CX, &[0, 1])?,
        ],
        ISwap => vec![
            fixed(S, &[0])?,
            fixed(S, &[1])?,
            fixed(H, &[0])?,
            fixed(CX, &[0, 1])?,
            fixed(CX, &[1, 0])?,
            fixed(H, &[1])?,
        ],
        RZZ => vec![
            fixed(CX, &[0, 1])?,
            rot(RZ, p[0].clone(), 1)?,
            fixed(CX, &[0, 1])?,
        ],
        RXX => {
            let h = [fixed(H, &[0])?, fixed(H, &[1])?];
            two_axis(&p[0], &h, &h)?
        }
        RYY => {
            let to_z = [
                rot(RX, Param::Const(FRAC_PI_2), 0)?,
                rot(RX, Param::Const(FRAC_PI_2), 1)?,
            ];
            let back = [
                rot(RX, Param::Const(-FRAC_PI_2), 0)?,
                rot(RX, Param::Const(-FRAC_PI_2), 1)?,
            ];
            two_axis(&p[0], &to_z, &back)?
        }
        CCX => toffoli(0, 1, 2)?,
        CSwap => {
            let mut out = vec![fixed(CX, &[2, 1])?];
            out.extend(toffoli(0, 1, 2)?);
            out.push(fixed(CX, &[2, 1])?);
            out
        }
        _ => return Ok(None),
    };
    Ok(Some(seq))
}
