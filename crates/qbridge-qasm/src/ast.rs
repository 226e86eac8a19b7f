//! Abstract syntax tree for the supported OpenQASM 2/3 subset.

use serde::{Deserialize, Serialize};

/// A complete program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Version from the header (e.g. "2.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement.
    Include(String),

    /// Quantum register: `qreg q[n];`, `qubit[n] q;` or `qubit q;`
    QubitDecl { name: String, size: u32 },

    /// Classical register: `creg c[n];`, `bit[n] c;` or `bit c;`
    BitDecl { name: String, size: u32 },

    /// Free parameter: `input float[64] theta;` or `input angle theta;`
    InputDecl { name: String },

    /// Gate application.
    Gate(GateCall),

    /// Measurement: `measure q -> c;` or `c = measure q;`
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<QubitRef>,
    },

    /// Reset: `reset q;`
    Reset { qubits: Vec<QubitRef> },

    /// Barrier: `barrier q;`
    Barrier { qubits: Vec<QubitRef> },

    /// Gate definition, inlined at each call.
    GateDef(GateDef),

    /// Opaque gate declaration (no body).
    Opaque { name: String },
}

/// A gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

/// Body of a `gate` definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    /// Formal angle parameters.
    pub params: Vec<String>,
    /// Formal qubit arguments.
    pub qubits: Vec<String>,
    /// Gate calls over the formals; barriers are dropped at parse time.
    pub body: Vec<GateCall>,
}

/// Reference to a register (`q`) or one of its elements (`q[i]`).
///
/// Classical bit references share the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl QubitRef {
    /// Create a reference to a single element.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// An angle expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(u64),
    /// Float literal.
    Float(f64),
    /// Identifier.
    Identifier(String),
    /// Pi constant.
    Pi,
    /// Tau constant (2π).
    Tau,
    /// Euler's number.
    Euler,
    /// Negation.
    Neg(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Function call such as `sin(x)`.
    FnCall { name: String, args: Vec<Expression> },
    /// Parenthesized expression.
    Paren(Box<Expression>),
}

impl Expression {
    /// Try to evaluate as a constant f64.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expression::Int(v) => Some(*v as f64),
            Expression::Float(v) => Some(*v),
            Expression::Pi => Some(std::f64::consts::PI),
            Expression::Tau => Some(std::f64::consts::TAU),
            Expression::Euler => Some(std::f64::consts::E),
            Expression::Neg(e) => e.as_f64().map(|v| -v),
            Expression::BinOp { left, op, right } => {
                let l = left.as_f64()?;
                let r = right.as_f64()?;
                Some(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                })
            }
            Expression::FnCall { name, args } => match args.as_slice() {
                [arg] => apply_function(name, arg.as_f64()?),
                _ => None,
            },
            Expression::Paren(e) => e.as_f64(),
            Expression::Identifier(_) => None,
        }
    }
}

/// Evaluate one of the built-in unary functions.
pub(crate) fn apply_function(name: &str, x: f64) -> Option<f64> {
    Some(match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "arcsin" | "asin" => x.asin(),
        "arccos" | "acos" => x.acos(),
        "arctan" | "atan" => x.atan(),
        "exp" => x.exp(),
        "ln" | "log" => x.ln(),
        "sqrt" => x.sqrt(),
        _ => return None,
    })
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
