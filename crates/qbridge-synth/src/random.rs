//! Haar-random unitaries for property tests and benchmarks.

use num_complex::Complex64;
use qbridge_ir::GateMatrix;
use rand::Rng;
use rand_distr::StandardNormal;

/// Draw a Haar-random `dim × dim` unitary.
///
/// Orthonormalizes the columns of a complex Gaussian matrix; Gram-Schmidt
/// keeps the implicit `R` factor's diagonal positive, which makes the
/// result Haar-distributed.
pub fn haar_unitary<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> GateMatrix {
    let mut m = GateMatrix::from_shape_fn((dim, dim), |_| {
        Complex64::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
    });
    for j in 0..dim {
        for k in 0..j {
            let overlap: Complex64 = (0..dim).map(|i| m[[i, k]].conj() * m[[i, j]]).sum();
            for i in 0..dim {
                let v = m[[i, k]];
                m[[i, j]] -= overlap * v;
            }
        }
        let norm = (0..dim).map(|i| m[[i, j]].norm_sqr()).sum::<f64>().sqrt();
        for i in 0..dim {
            m[[i, j]] /= norm;
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::matrix;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_haar_unitary_is_unitary() {
        let mut rng = StdRng::seed_from_u64(3);
        for dim in [2, 4, 8] {
            assert!(matrix::is_unitary(&haar_unitary(dim, &mut rng), 1e-10));
        }
    }
}
