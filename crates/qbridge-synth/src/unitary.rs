//! 2x2 unitary arithmetic and the ZYZ Euler angles used by single-qubit
//! synthesis.

use num_complex::Complex64;
use qbridge_ir::GateMatrix;
use std::f64::consts::PI;

/// Tolerance below which a rotation angle is treated as zero.
pub(crate) const ANGLE_EPSILON: f64 = 1e-12;

/// A 2x2 complex matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

/// Angles of `U = e^{iα} · Rz(φ) · Ry(θ) · Rz(λ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZyzAngles {
    /// Outer Z rotation, applied last.
    pub phi: f64,
    /// Y rotation, in `[0, π]`.
    pub theta: f64,
    /// Inner Z rotation, applied first.
    pub lambda: f64,
    /// Global phase `α`.
    pub global_phase: f64,
}

impl Unitary2x2 {
    /// Create a matrix from its four entries.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity.
    pub fn identity() -> Self {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        Self::new(one, zero, zero, one)
    }

    /// Copy a 2x2 [`GateMatrix`]; `None` for other shapes.
    pub fn from_matrix(m: &GateMatrix) -> Option<Self> {
        if m.dim() != (2, 2) {
            return None;
        }
        Some(Self::new(m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]))
    }

    /// Convert back to a dense matrix.
    pub fn to_matrix(&self) -> GateMatrix {
        GateMatrix::from_shape_fn((2, 2), |(i, j)| self.data[i * 2 + j])
    }

    /// RY rotation.
    pub fn ry(theta: f64) -> Self {
        let (s, c) = (theta / 2.0).sin_cos();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        )
    }

    /// RZ rotation.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Matrix product `self * other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Determinant.
    pub fn det(&self) -> Complex64 {
        self.data[0] * self.data[3] - self.data[1] * self.data[2]
    }

    /// Multiply every entry by `k`.
    pub fn scale(&self, k: Complex64) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a * k, b * k, c * k, d * k)
    }

    /// Rescale to determinant one.
    pub fn to_special(&self) -> Self {
        self.scale(self.det().sqrt().inv())
    }

    /// Whether `self` and `other` agree up to a global phase.
    pub fn equiv_up_to_phase(&self, other: &Self, atol: f64) -> bool {
        let overlap: Complex64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| x.conj() * y)
            .sum();
        if overlap.norm() < ANGLE_EPSILON {
            return false;
        }
        let phase = overlap / overlap.norm();
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(x, y)| (x * phase - y).norm() <= atol)
    }

    /// ZYZ Euler decomposition.
    ///
    /// The angles satisfy `U = e^{iα} Rz(φ) Ry(θ) Rz(λ)` exactly; `φ` and
    /// `λ` are not wrapped, since wrapping flips the sign of `Rz`. Extracting `θ`
    /// with `atan2` of the column magnitudes keeps it accurate near `0` and
    /// `π`, where `acos` loses precision.
    pub fn zyz(&self) -> ZyzAngles {
        let det = self.det();
        let global_phase = det.arg() / 2.0;
        let [a, _, c, d] = self.to_special().data;

        let theta = 2.0 * c.norm().atan2(a.norm());
        let phi_plus_lambda = 2.0 * d.arg();
        let phi_minus_lambda = 2.0 * c.arg();
        ZyzAngles {
            phi: f64::midpoint(phi_plus_lambda, phi_minus_lambda),
            theta,
            lambda: (phi_plus_lambda - phi_minus_lambda) / 2.0,
            global_phase,
        }
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qbridge_ir::{GateTag, standard_matrix};

    fn gate(tag: GateTag, params: &[f64]) -> Unitary2x2 {
        Unitary2x2::from_matrix(&standard_matrix(tag, params).unwrap()).unwrap()
    }

    fn reconstruct(angles: ZyzAngles) -> Unitary2x2 {
        Unitary2x2::rz(angles.phi) * Unitary2x2::ry(angles.theta) * Unitary2x2::rz(angles.lambda)
    }

    #[test]
    fn test_zyz_reconstructs_fixed_gates() {
        for tag in [
            GateTag::H,
            GateTag::X,
            GateTag::Y,
            GateTag::Z,
            GateTag::S,
            GateTag::Tdg,
            GateTag::SX,
            GateTag::I,
        ] {
            let u = gate(tag, &[]);
            let angles = u.zyz();
            assert!(
                reconstruct(angles).equiv_up_to_phase(&u, 1e-10),
                "ZYZ failed for {tag}: {angles:?}"
            );
        }
    }

    #[test]
    fn test_zyz_global_phase_is_exact() {
        let u = gate(GateTag::U, &[0.3, 1.1, -2.4]);
        let angles = u.zyz();
        let phased = reconstruct(angles).scale(Complex64::from_polar(1.0, angles.global_phase));
        for (x, y) in phased.data.iter().zip(u.data.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-10);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_zyz_theta_near_pi() {
        let u = gate(GateTag::RY, &[PI - 1e-9]) * gate(GateTag::RZ, &[0.4]);
        let angles = u.zyz();
        assert_abs_diff_eq!(angles.theta, PI - 1e-9, epsilon = 1e-8);
        assert!(reconstruct(angles).equiv_up_to_phase(&u, 1e-10));
    }

    #[test]
    fn test_dagger_is_inverse() {
        let u = gate(GateTag::U, &[0.9, 0.2, 0.5]);
        assert!((u * u.dagger()).equiv_up_to_phase(&Unitary2x2::identity(), 1e-12));
    }

    #[test]
    fn test_normalize_angle() {
        assert_abs_diff_eq!(normalize_angle(2.5 * PI), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }
}
