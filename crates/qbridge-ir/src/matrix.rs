//! Dense complex matrices for gate payloads.
//!
//! All matrices use the big-endian convention: for an instruction on qubits
//! `[q0, q1, ...]`, `q0` is the most significant bit of the row/column index.

use ndarray::Array2;
use num_complex::Complex64;

/// Dense gate matrix, row-major.
pub type GateMatrix = Array2<Complex64>;

/// Shorthand for a complex number.
pub(crate) fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Build a square matrix from rows.
///
/// Returns `None` when the rows do not form a square.
pub fn from_rows(rows: &[Vec<Complex64>]) -> Option<GateMatrix> {
    let dim = rows.len();
    if rows.iter().any(|r| r.len() != dim) {
        return None;
    }
    let flat: Vec<Complex64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((dim, dim), flat).ok()
}

/// Build a square matrix from rows of `[re, im]` pairs, the layout JSON
/// circuit formats use.
pub fn from_pairs(rows: &[Vec<[f64; 2]>]) -> Option<GateMatrix> {
    let rows: Vec<Vec<Complex64>> = rows
        .iter()
        .map(|row| row.iter().map(|&[re, im]| c(re, im)).collect())
        .collect();
    from_rows(&rows)
}

/// Rows of `[re, im]` pairs.
pub fn to_pairs(m: &GateMatrix) -> Vec<Vec<[f64; 2]>> {
    m.rows()
        .into_iter()
        .map(|row| row.iter().map(|x| [x.re, x.im]).collect())
        .collect()
}

/// The `dim × dim` identity.
pub fn identity(dim: usize) -> GateMatrix {
    Array2::eye(dim)
}

/// Number of qubits a square matrix acts on, if its dimension is `2^n`, `n >= 1`.
pub fn qubits_of(m: &GateMatrix) -> Option<u32> {
    let (rows, cols) = m.dim();
    if rows != cols || rows < 2 || !rows.is_power_of_two() {
        return None;
    }
    Some(rows.trailing_zeros())
}

/// Kronecker product `a ⊗ b` (`a` on the more significant qubits).
pub fn kron(a: &GateMatrix, b: &GateMatrix) -> GateMatrix {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for ((i, j), &x) in a.indexed_iter() {
        if x == Complex64::new(0.0, 0.0) {
            continue;
        }
        for ((k, l), &y) in b.indexed_iter() {
            out[[i * br + k, j * bc + l]] = x * y;
        }
    }
    out
}

/// Conjugate transpose.
pub fn dagger(m: &GateMatrix) -> GateMatrix {
    m.t().mapv(|x| x.conj())
}

/// Block-diagonal `diag(I, ..., I, base)` with `num_controls` control qubits
/// placed before the base gate's qubits.
pub fn controlled(base: &GateMatrix, num_controls: u32) -> GateMatrix {
    let base_dim = base.nrows();
    let dim = base_dim << num_controls;
    let offset = dim - base_dim;
    let mut out = identity(dim);
    for ((i, j), &x) in base.indexed_iter() {
        out[[offset + i, offset + j]] = x;
    }
    out
}

/// Whether `m · m† ≈ I` elementwise within `atol`.
pub fn is_unitary(m: &GateMatrix, atol: f64) -> bool {
    if qubits_of(m).is_none() {
        return false;
    }
    let product = m.dot(&dagger(m));
    product.indexed_iter().all(|((i, j), &x)| {
        let expected = if i == j { 1.0 } else { 0.0 };
        (x - Complex64::new(expected, 0.0)).norm() <= atol
    })
}

/// Reverse the qubit order of a matrix (big-endian <-> little-endian).
pub fn reverse_qubit_order(m: &GateMatrix) -> GateMatrix {
    let Some(n) = qubits_of(m) else {
        return m.clone();
    };
    let rev = |x: usize| -> usize {
        (0..n).fold(0, |acc, bit| acc | (((x >> bit) & 1) << (n - 1 - bit)))
    };
    let dim = m.nrows();
    Array2::from_shape_fn((dim, dim), |(i, j)| m[[rev(i), rev(j)]])
}

/// Whether two matrices agree elementwise within `atol`.
pub fn approx_eq(a: &GateMatrix, b: &GateMatrix, atol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= atol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> GateMatrix {
        from_rows(&[vec![c(0.0, 0.0), c(1.0, 0.0)], vec![c(1.0, 0.0), c(0.0, 0.0)]]).unwrap()
    }

    #[test]
    fn test_qubits_of() {
        assert_eq!(qubits_of(&identity(2)), Some(1));
        assert_eq!(qubits_of(&identity(8)), Some(3));
        assert_eq!(qubits_of(&identity(1)), None);
        assert_eq!(qubits_of(&Array2::zeros((3, 3))), None);
    }

    #[test]
    fn test_controlled_x_is_cnot() {
        let cx = controlled(&x(), 1);
        assert_eq!(cx[[0, 0]], c(1.0, 0.0));
        assert_eq!(cx[[1, 1]], c(1.0, 0.0));
        assert_eq!(cx[[2, 3]], c(1.0, 0.0));
        assert_eq!(cx[[3, 2]], c(1.0, 0.0));
        assert!(is_unitary(&cx, 1e-12));
    }

    #[test]
    fn test_kron_places_first_factor_high() {
        let xi = kron(&x(), &identity(2));
        // X on the most significant qubit maps |00> to |10>.
        assert_eq!(xi[[2, 0]], c(1.0, 0.0));
        assert_eq!(xi[[1, 0]], c(0.0, 0.0));
    }

    #[test]
    fn test_reverse_qubit_order_turns_cnot_around() {
        let cx = controlled(&x(), 1);
        let reversed = reverse_qubit_order(&cx);
        // Control on the least significant qubit now: |01> <-> |11>.
        assert_eq!(reversed[[3, 1]], c(1.0, 0.0));
        assert_eq!(reversed[[1, 3]], c(1.0, 0.0));
        assert!(approx_eq(&reverse_qubit_order(&reversed), &cx, 0.0));
    }

    #[test]
    fn test_pairs_layout() {
        let pairs = vec![vec![[0.0, 0.0], [0.0, -1.0]], vec![[0.0, 1.0], [0.0, 0.0]]];
        let y = from_pairs(&pairs).unwrap();
        assert_eq!(y[[0, 1]], c(0.0, -1.0));
        assert_eq!(to_pairs(&y), pairs);
        assert!(from_pairs(&[vec![[1.0, 0.0]], vec![]]).is_none());
    }

    #[test]
    fn test_non_unitary_rejected() {
        let m = from_rows(&[vec![c(1.0, 0.0), c(1.0, 0.0)], vec![c(0.0, 0.0), c(1.0, 0.0)]])
            .unwrap();
        assert!(!is_unitary(&m, 1e-9));
    }
}
