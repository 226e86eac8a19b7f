//! Serde model of `cirq.to_json` output.
//!
//! Only the subset needed for circuits over `LineQubit`s is modeled. Gate
//! objects keep their `cirq_type` as a string and carry every field any
//! supported gate uses, so unknown gates still deserialize and can be
//! reported by name.

use qbridge_ir::FrameworkId;
use qbridge_synth::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

/// `cirq.Circuit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirqCircuit {
    /// Always `"Circuit"`.
    pub cirq_type: String,
    /// Moments in time order.
    pub moments: Vec<Moment>,
}

/// `cirq.Moment`: operations on disjoint qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    #[serde(default = "Moment::type_name")]
    pub cirq_type: String,
    pub operations: Vec<Operation>,
}

/// `cirq.GateOperation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default = "Operation::type_name")]
    pub cirq_type: String,
    pub gate: CirqGate,
    pub qubits: Vec<LineQubit>,
}

/// `cirq.LineQubit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineQubit {
    #[serde(default = "LineQubit::type_name")]
    pub cirq_type: String,
    pub x: u32,
}

/// A gate object. Which optional fields are present depends on `cirq_type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CirqGate {
    /// Gate class, e.g. `"ZPowGate"` or `"MatrixGate"`.
    pub cirq_type: String,
    /// `EigenGate` exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<CirqValue>,
    /// `EigenGate` global shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_shift: Option<f64>,
    /// Rotation angle of `Rx` / `Ry` / `Rz`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rads: Option<CirqValue>,
    /// `MatrixGate` payload, rows of `[re, im]` pairs, big-endian.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<[f64; 2]>>>,
    /// Qudit dimensions of `IdentityGate` / `MatrixGate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qid_shape: Option<Vec<u32>>,
    /// Width of a `MeasurementGate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<u32>,
    /// Measurement key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A gate argument: a plain number or a sympy expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CirqValue {
    Number(f64),
    Symbolic(Box<SympyExpr>),
}

/// The sympy node types Cirq serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cirq_type")]
pub enum SympyExpr {
    #[serde(rename = "sympy.Symbol")]
    Symbol { name: String },
    #[serde(rename = "sympy.Add")]
    Add { args: Vec<CirqValue> },
    #[serde(rename = "sympy.Mul")]
    Mul { args: Vec<CirqValue> },
    #[serde(rename = "sympy.Pow")]
    Pow { args: Vec<CirqValue> },
    #[serde(rename = "sympy.Float")]
    Float { approx: f64 },
    #[serde(rename = "sympy.Integer")]
    Integer { i: i64 },
    #[serde(rename = "sympy.Rational")]
    Rational { p: i64, q: i64 },
    #[serde(rename = "sympy.pi")]
    Pi,
}

impl Moment {
    fn type_name() -> String {
        "Moment".into()
    }

    /// A moment holding `operations`.
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            cirq_type: Self::type_name(),
            operations,
        }
    }

    /// Whether `op` can join this moment without sharing a qubit.
    pub fn accepts(&self, op: &Operation) -> bool {
        self.operations
            .iter()
            .flat_map(|o| &o.qubits)
            .all(|q| !op.qubits.iter().any(|p| p.x == q.x))
    }
}

impl Operation {
    fn type_name() -> String {
        "GateOperation".into()
    }

    /// `gate` applied to line qubits `xs`.
    pub fn new(gate: CirqGate, xs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            cirq_type: Self::type_name(),
            gate,
            qubits: xs.into_iter().map(LineQubit::new).collect(),
        }
    }
}

impl LineQubit {
    fn type_name() -> String {
        "LineQubit".into()
    }

    /// `cirq.LineQubit(x)`.
    pub fn new(x: u32) -> Self {
        Self {
            cirq_type: Self::type_name(),
            x,
        }
    }
}

impl CirqGate {
    /// A gate with only its type set.
    pub fn named(cirq_type: &str) -> Self {
        Self {
            cirq_type: cirq_type.to_string(),
            ..Self::default()
        }
    }

    /// An `EigenGate` with the given exponent and shift.
    pub fn eigen(cirq_type: &str, exponent: CirqValue, global_shift: f64) -> Self {
        Self {
            exponent: Some(exponent),
            global_shift: Some(global_shift),
            ..Self::named(cirq_type)
        }
    }
}

impl CirqCircuit {
    /// Parse the JSON form.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        let circuit: CirqCircuit = serde_json::from_str(text)
            .map_err(|e| ConvertError::malformed(FrameworkId::Cirq, e.to_string()))?;
        if circuit.cirq_type != "Circuit" {
            return Err(ConvertError::malformed(
                FrameworkId::Cirq,
                format!("expected cirq_type 'Circuit', found '{}'", circuit.cirq_type),
            ));
        }
        Ok(circuit)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> ConvertResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::malformed(FrameworkId::Cirq, e.to_string()))
    }

    /// Pack `ops` into moments, opening a new moment whenever an operation
    /// shares a qubit with the current one. Program order is preserved.
    pub fn from_operations(ops: impl IntoIterator<Item = Operation>) -> Self {
        let mut moments: Vec<Moment> = Vec::new();
        for op in ops {
            match moments.last_mut() {
                Some(moment) if moment.accepts(&op) => moment.operations.push(op),
                _ => moments.push(Moment::new(vec![op])),
            }
        }
        Self {
            cirq_type: "Circuit".into(),
            moments,
        }
    }

    /// Operations in program order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.moments.iter().flat_map(|m| &m.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cirq_json() {
        let circuit = CirqCircuit::from_json(
            r#"{
              "cirq_type": "Circuit",
              "moments": [
                {"cirq_type": "Moment", "operations": [
                  {"cirq_type": "GateOperation",
                   "gate": {"cirq_type": "HPowGate", "exponent": 1.0, "global_shift": 0.0},
                   "qubits": [{"cirq_type": "LineQubit", "x": 0}]}
                ]},
                {"cirq_type": "Moment", "operations": [
                  {"cirq_type": "GateOperation",
                   "gate": {"cirq_type": "Rz",
                            "rads": {"cirq_type": "sympy.Mul", "args": [
                               {"cirq_type": "sympy.Integer", "i": 2},
                               {"cirq_type": "sympy.Symbol", "name": "theta"}]}},
                   "qubits": [{"cirq_type": "LineQubit", "x": 1}]}
                ]}
              ]
            }"#,
        )
        .unwrap();
        let ops: Vec<&Operation> = circuit.operations().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].gate.exponent, Some(CirqValue::Number(1.0)));
        let Some(CirqValue::Symbolic(expr)) = &ops[1].gate.rads else {
            panic!("expected a symbolic angle");
        };
        assert!(matches!(**expr, SympyExpr::Mul { ref args } if args.len() == 2));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = CirqCircuit::from_json(r#"{"cirq_type": "Moment", "moments": []}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Malformed { .. }));
    }

    #[test]
    fn test_pi_serializes_as_tag_only() {
        let json = serde_json::to_string(&CirqValue::Symbolic(Box::new(SympyExpr::Pi))).unwrap();
        assert_eq!(json, r#"{"cirq_type":"sympy.pi"}"#);
    }

    #[test]
    fn test_packing_opens_moment_on_conflict() {
        let h = || CirqGate::eigen("HPowGate", CirqValue::Number(1.0), 0.0);
        let cx = CirqGate::eigen("CXPowGate", CirqValue::Number(1.0), 0.0);
        let circuit = CirqCircuit::from_operations([
            Operation::new(h(), [0]),
            Operation::new(h(), [1]),
            Operation::new(cx, [0, 1]),
            Operation::new(h(), [2]),
        ]);
        assert_eq!(circuit.moments.len(), 2);
        assert_eq!(circuit.moments[0].operations.len(), 2);
        assert_eq!(circuit.moments[1].operations.len(), 2);
    }
}
