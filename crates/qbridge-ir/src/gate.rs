//! The closed gate model shared by every framework adapter.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::matrix::{self, GateMatrix, c};
use crate::parameter::{Bindings, Param};

/// Tolerance used when validating user-supplied unitary payloads.
///
/// Native matrices arrive through JSON with limited precision, so this is
/// looser than the transpile tolerance.
pub const UNITARY_CHECK_ATOL: f64 = 1e-6;

/// Canonical identifier of a gate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GateTag {
    // Single-qubit Clifford+T
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Identity gate.
    I,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit parameterized
    /// Phase gate `diag(1, e^{iλ})`.
    Phase,
    /// Rotation around X.
    RX,
    /// Rotation around Y.
    RY,
    /// Rotation around Z.
    RZ,
    /// Universal single-qubit gate U(θ, φ, λ).
    U,

    // Two-qubit
    /// Controlled-X (CNOT).
    CX,
    /// Controlled-Y.
    CY,
    /// Controlled-Z.
    CZ,
    /// Controlled-Hadamard.
    CH,
    /// SWAP.
    Swap,
    /// iSWAP.
    ISwap,
    /// Controlled phase.
    CPhase,
    /// Controlled RX.
    CRX,
    /// Controlled RY.
    CRY,
    /// Controlled RZ.
    CRZ,
    /// XX interaction `exp(-iθ/2 X⊗X)`.
    RXX,
    /// YY interaction `exp(-iθ/2 Y⊗Y)`.
    RYY,
    /// ZZ interaction `exp(-iθ/2 Z⊗Z)`.
    RZZ,

    // Three-qubit
    /// Toffoli (doubly-controlled X).
    CCX,
    /// Fredkin (controlled SWAP).
    CSwap,

    // Payload-defined and non-unitary
    /// Arbitrary unitary carried as a dense matrix.
    Unitary,
    /// Computational-basis measurement.
    Measure,
}

impl GateTag {
    /// Every tag, in declaration order.
    pub const ALL: [GateTag; 33] = [
        GateTag::H,
        GateTag::X,
        GateTag::Y,
        GateTag::Z,
        GateTag::S,
        GateTag::Sdg,
        GateTag::T,
        GateTag::Tdg,
        GateTag::I,
        GateTag::SX,
        GateTag::SXdg,
        GateTag::Phase,
        GateTag::RX,
        GateTag::RY,
        GateTag::RZ,
        GateTag::U,
        GateTag::CX,
        GateTag::CY,
        GateTag::CZ,
        GateTag::CH,
        GateTag::Swap,
        GateTag::ISwap,
        GateTag::CPhase,
        GateTag::CRX,
        GateTag::CRY,
        GateTag::CRZ,
        GateTag::RXX,
        GateTag::RYY,
        GateTag::RZZ,
        GateTag::CCX,
        GateTag::CSwap,
        GateTag::Unitary,
        GateTag::Measure,
    ];

    /// The portability baseline every framework encodes and decodes natively.
    pub const COMMON_CORE: [GateTag; 15] = [
        GateTag::H,
        GateTag::X,
        GateTag::Y,
        GateTag::Z,
        GateTag::S,
        GateTag::Sdg,
        GateTag::T,
        GateTag::Tdg,
        GateTag::I,
        GateTag::RX,
        GateTag::RY,
        GateTag::RZ,
        GateTag::CX,
        GateTag::CZ,
        GateTag::Swap,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            GateTag::H => "h",
            GateTag::X => "x",
            GateTag::Y => "y",
            GateTag::Z => "z",
            GateTag::S => "s",
            GateTag::Sdg => "sdg",
            GateTag::T => "t",
            GateTag::Tdg => "tdg",
            GateTag::I => "id",
            GateTag::SX => "sx",
            GateTag::SXdg => "sxdg",
            GateTag::Phase => "p",
            GateTag::RX => "rx",
            GateTag::RY => "ry",
            GateTag::RZ => "rz",
            GateTag::U => "u",
            GateTag::CX => "cx",
            GateTag::CY => "cy",
            GateTag::CZ => "cz",
            GateTag::CH => "ch",
            GateTag::Swap => "swap",
            GateTag::ISwap => "iswap",
            GateTag::CPhase => "cp",
            GateTag::CRX => "crx",
            GateTag::CRY => "cry",
            GateTag::CRZ => "crz",
            GateTag::RXX => "rxx",
            GateTag::RYY => "ryy",
            GateTag::RZZ => "rzz",
            GateTag::CCX => "ccx",
            GateTag::CSwap => "cswap",
            GateTag::Unitary => "unitary",
            GateTag::Measure => "measure",
        }
    }

    /// Fixed qubit arity, `None` for [`GateTag::Unitary`] whose arity comes
    /// from its matrix.
    pub fn num_qubits(self) -> Option<u32> {
        match self {
            GateTag::H
            | GateTag::X
            | GateTag::Y
            | GateTag::Z
            | GateTag::S
            | GateTag::Sdg
            | GateTag::T
            | GateTag::Tdg
            | GateTag::I
            | GateTag::SX
            | GateTag::SXdg
            | GateTag::Phase
            | GateTag::RX
            | GateTag::RY
            | GateTag::RZ
            | GateTag::U
            | GateTag::Measure => Some(1),
            GateTag::CX
            | GateTag::CY
            | GateTag::CZ
            | GateTag::CH
            | GateTag::Swap
            | GateTag::ISwap
            | GateTag::CPhase
            | GateTag::CRX
            | GateTag::CRY
            | GateTag::CRZ
            | GateTag::RXX
            | GateTag::RYY
            | GateTag::RZZ => Some(2),
            GateTag::CCX | GateTag::CSwap => Some(3),
            GateTag::Unitary => None,
        }
    }

    /// Fixed parameter arity.
    pub fn num_params(self) -> usize {
        match self {
            GateTag::Phase
            | GateTag::RX
            | GateTag::RY
            | GateTag::RZ
            | GateTag::CPhase
            | GateTag::CRX
            | GateTag::CRY
            | GateTag::CRZ
            | GateTag::RXX
            | GateTag::RYY
            | GateTag::RZZ => 1,
            GateTag::U => 3,
            _ => 0,
        }
    }

    /// Number of control qubits, listed first in the instruction.
    pub fn num_controls(self) -> u32 {
        match self {
            GateTag::CX
            | GateTag::CY
            | GateTag::CZ
            | GateTag::CH
            | GateTag::CPhase
            | GateTag::CRX
            | GateTag::CRY
            | GateTag::CRZ
            | GateTag::CSwap => 1,
            GateTag::CCX => 2,
            _ => 0,
        }
    }

    /// Tag of the gate being controlled, for controlled tags.
    pub fn base_tag(self) -> Option<GateTag> {
        match self {
            GateTag::CX | GateTag::CCX => Some(GateTag::X),
            GateTag::CY => Some(GateTag::Y),
            GateTag::CZ => Some(GateTag::Z),
            GateTag::CH => Some(GateTag::H),
            GateTag::CPhase => Some(GateTag::Phase),
            GateTag::CRX => Some(GateTag::RX),
            GateTag::CRY => Some(GateTag::RY),
            GateTag::CRZ => Some(GateTag::RZ),
            GateTag::CSwap => Some(GateTag::Swap),
            _ => None,
        }
    }

    /// Whether the tag belongs to [`GateTag::COMMON_CORE`].
    pub fn is_common_core(self) -> bool {
        GateTag::COMMON_CORE.contains(&self)
    }

    /// Whether the gate acts unitarily (everything except measurement).
    pub fn is_unitary(self) -> bool {
        !matches!(self, GateTag::Measure)
    }
}

impl fmt::Display for GateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gate instance: tag, parameters and (when known) its dense matrix.
///
/// A `Unitary` gate always carries `matrix`. Other gates carry it whenever
/// every parameter is numeric, or when the source framework reported it.
/// Controlled tags own their `base_gate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    tag: GateTag,
    params: Vec<Param>,
    matrix: Option<GateMatrix>,
    num_controls: u32,
    base_gate: Option<Box<Gate>>,
}

impl Gate {
    /// Create a gate from a tag and its parameters.
    pub fn new(tag: GateTag, params: Vec<Param>) -> IrResult<Self> {
        if tag == GateTag::Unitary {
            return Err(IrError::InvalidMatrix(
                "unitary gates must be built from a matrix".into(),
            ));
        }
        if params.len() != tag.num_params() {
            return Err(IrError::ParamCountMismatch {
                tag,
                expected: tag.num_params(),
                got: params.len(),
            });
        }
        let params: Vec<Param> = params.iter().map(Param::simplify).collect();
        if let Some(bad) = params
            .iter()
            .find(|p| !p.is_symbolic() && !p.as_f64().is_some_and(f64::is_finite))
        {
            return Err(IrError::InvalidExpression(bad.to_string()));
        }
        let base_gate = match tag.base_tag() {
            Some(base) => {
                let base_params = if base.num_params() == params.len() {
                    params.clone()
                } else {
                    Vec::new()
                };
                Some(Box::new(Gate::new(base, base_params)?))
            }
            None => None,
        };
        let matrix = numeric(&params).and_then(|values| standard_matrix(tag, &values));
        Ok(Self {
            tag,
            params,
            matrix,
            num_controls: tag.num_controls(),
            base_gate,
        })
    }

    /// Create a parameterless gate.
    pub fn fixed(tag: GateTag) -> IrResult<Self> {
        Self::new(tag, Vec::new())
    }

    /// Create an arbitrary-unitary gate from its matrix.
    pub fn unitary(matrix: GateMatrix) -> IrResult<Self> {
        if matrix::qubits_of(&matrix).is_none() {
            let (r, c) = matrix.dim();
            return Err(IrError::InvalidMatrix(format!(
                "expected a 2^n x 2^n matrix, got {r}x{c}"
            )));
        }
        if !matrix::is_unitary(&matrix, UNITARY_CHECK_ATOL) {
            return Err(IrError::InvalidMatrix("matrix is not unitary".into()));
        }
        Ok(Self {
            tag: GateTag::Unitary,
            params: Vec::new(),
            matrix: Some(matrix),
            num_controls: 0,
            base_gate: None,
        })
    }

    /// Attach the matrix a native gate reported for itself.
    pub fn with_matrix(mut self, matrix: GateMatrix) -> IrResult<Self> {
        if matrix::qubits_of(&matrix) != Some(self.num_qubits()) {
            return Err(IrError::QubitCountMismatch {
                tag: self.tag,
                expected: self.num_qubits(),
                got: matrix::qubits_of(&matrix).unwrap_or(0),
            });
        }
        self.matrix = Some(matrix);
        Ok(self)
    }

    /// The gate's tag.
    pub fn tag(&self) -> GateTag {
        self.tag
    }

    /// Parameters, in the tag's order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Dense matrix, if known.
    pub fn matrix(&self) -> Option<&GateMatrix> {
        self.matrix.as_ref()
    }

    /// Number of leading control qubits.
    pub fn num_controls(&self) -> u32 {
        self.num_controls
    }

    /// The controlled gate, for controlled tags.
    pub fn base_gate(&self) -> Option<&Gate> {
        self.base_gate.as_deref()
    }

    /// Number of qubits this gate acts on.
    pub fn num_qubits(&self) -> u32 {
        match self.tag.num_qubits() {
            Some(n) => n,
            None => self
                .matrix
                .as_ref()
                .and_then(matrix::qubits_of)
                .unwrap_or(0),
        }
    }

    /// Whether any parameter references a free parameter.
    pub fn is_parameterized(&self) -> bool {
        self.params.iter().any(Param::is_symbolic)
    }

    /// Parameter values, if every parameter is numeric.
    pub fn numeric_params(&self) -> Option<Vec<f64>> {
        numeric(&self.params)
    }

    /// Replace bound free parameters by their values.
    pub fn substitute(&self, bindings: &Bindings) -> IrResult<Gate> {
        if !self.is_parameterized() {
            return Ok(self.clone());
        }
        let params = self.params.iter().map(|p| p.substitute(bindings)).collect();
        Gate::new(self.tag, params)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if !self.params.is_empty() {
            let rendered: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, "({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

fn numeric(params: &[Param]) -> Option<Vec<f64>> {
    params.iter().map(Param::as_f64).collect()
}

fn m2(a: Complex64, b: Complex64, cc: Complex64, d: Complex64) -> GateMatrix {
    GateMatrix::from_shape_vec((2, 2), vec![a, b, cc, d]).unwrap_or_else(|_| matrix::identity(2))
}

fn diag(entries: &[Complex64]) -> GateMatrix {
    let mut m = GateMatrix::zeros((entries.len(), entries.len()));
    for (i, &e) in entries.iter().enumerate() {
        m[[i, i]] = e;
    }
    m
}

/// Dense matrix of a fixed-tag gate with numeric parameters.
///
/// Returns `None` for `Unitary` and `Measure`, and when `params` does not
/// match the tag's arity.
pub fn standard_matrix(tag: GateTag, params: &[f64]) -> Option<GateMatrix> {
    if params.len() != tag.num_params() {
        return None;
    }
    let zero = c(0.0, 0.0);
    let one = c(1.0, 0.0);
    let i = c(0.0, 1.0);
    let h = FRAC_1_SQRT_2;
    let m = match tag {
        GateTag::H => m2(c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)),
        GateTag::X => m2(zero, one, one, zero),
        GateTag::Y => m2(zero, -i, i, zero),
        GateTag::Z => diag(&[one, -one]),
        GateTag::S => diag(&[one, i]),
        GateTag::Sdg => diag(&[one, -i]),
        GateTag::T => diag(&[one, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]),
        GateTag::Tdg => diag(&[one, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]),
        GateTag::I => matrix::identity(2),
        GateTag::SX => m2(c(0.5, 0.5), c(0.5, -0.5), c(0.5, -0.5), c(0.5, 0.5)),
        GateTag::SXdg => m2(c(0.5, -0.5), c(0.5, 0.5), c(0.5, 0.5), c(0.5, -0.5)),
        GateTag::Phase => diag(&[one, Complex64::from_polar(1.0, params[0])]),
        GateTag::RX => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            m2(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
        }
        GateTag::RY => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            m2(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
        }
        GateTag::RZ => diag(&[
            Complex64::from_polar(1.0, -params[0] / 2.0),
            Complex64::from_polar(1.0, params[0] / 2.0),
        ]),
        GateTag::U => {
            let (theta, phi, lambda) = (params[0], params[1], params[2]);
            let (s, co) = (theta / 2.0).sin_cos();
            m2(
                c(co, 0.0),
                -Complex64::from_polar(s, lambda),
                Complex64::from_polar(s, phi),
                Complex64::from_polar(co, phi + lambda),
            )
        }
        GateTag::CX
        | GateTag::CY
        | GateTag::CZ
        | GateTag::CH
        | GateTag::CPhase
        | GateTag::CRX
        | GateTag::CRY
        | GateTag::CRZ
        | GateTag::CCX
        | GateTag::CSwap => {
            let base = tag.base_tag()?;
            let base_params: &[f64] = if base.num_params() == params.len() {
                params
            } else {
                &[]
            };
            matrix::controlled(&standard_matrix(base, base_params)?, tag.num_controls())
        }
        GateTag::Swap => {
            let mut m = GateMatrix::zeros((4, 4));
            m[[0, 0]] = one;
            m[[1, 2]] = one;
            m[[2, 1]] = one;
            m[[3, 3]] = one;
            m
        }
        GateTag::ISwap => {
            let mut m = GateMatrix::zeros((4, 4));
            m[[0, 0]] = one;
            m[[1, 2]] = i;
            m[[2, 1]] = i;
            m[[3, 3]] = one;
            m
        }
        GateTag::RXX => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            let mut m = matrix::identity(4).mapv(|x| x * co);
            for k in 0..4 {
                m[[k, 3 - k]] = c(0.0, -s);
            }
            m
        }
        GateTag::RYY => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            let mut m = matrix::identity(4).mapv(|x| x * co);
            m[[0, 3]] = c(0.0, s);
            m[[1, 2]] = c(0.0, -s);
            m[[2, 1]] = c(0.0, -s);
            m[[3, 0]] = c(0.0, s);
            m
        }
        GateTag::RZZ => {
            let minus = Complex64::from_polar(1.0, -params[0] / 2.0);
            let plus = Complex64::from_polar(1.0, params[0] / 2.0);
            diag(&[minus, plus, plus, minus])
        }
        GateTag::Unitary | GateTag::Measure => return None,
    };
    Some(m)
}
