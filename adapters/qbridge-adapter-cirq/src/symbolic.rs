//! Sympy expression trees <-> [`Param`].

use qbridge_ir::{FrameworkId, Param, ParameterRegistry};
use qbridge_synth::{ConvertError, ConvertResult};

use crate::model::{CirqValue, SympyExpr};

/// Read a Cirq value, registering symbols in `registry`.
pub(crate) fn to_param(value: &CirqValue, registry: &mut ParameterRegistry) -> ConvertResult<Param> {
    let expr = match value {
        CirqValue::Number(v) => return Ok(Param::Const(*v)),
        CirqValue::Symbolic(expr) => expr.as_ref(),
    };
    let param = match expr {
        SympyExpr::Symbol { name } => Param::Ref(registry.register(name.as_str())),
        SympyExpr::Float { approx } => Param::Const(*approx),
        SympyExpr::Integer { i } => Param::Const(*i as f64),
        SympyExpr::Rational { p, q } => {
            if *q == 0 {
                return Err(malformed("rational with zero denominator"));
            }
            Param::Const(*p as f64 / *q as f64)
        }
        SympyExpr::Pi => Param::Pi,
        SympyExpr::Add { args } => fold(args, registry, Param::Const(0.0), |a, b| a + b)?,
        SympyExpr::Mul { args } => fold(args, registry, Param::Const(1.0), |a, b| a * b)?,
        SympyExpr::Pow { args } => {
            let [base, exponent] = args.as_slice() else {
                return Err(malformed("sympy.Pow takes two arguments"));
            };
            let base = to_param(base, registry)?;
            let exponent = to_param(exponent, registry)?;
            match (base.as_f64(), exponent.as_f64()) {
                (Some(b), Some(e)) => Param::Const(b.powf(e)),
                (_, Some(e)) if e == -1.0 => Param::Const(1.0) / base,
                (_, Some(e)) if e == 1.0 => base,
                _ => return Err(malformed("only reciprocal powers of symbols are supported")),
            }
        }
    };
    Ok(param.simplify())
}

fn fold(
    args: &[CirqValue],
    registry: &mut ParameterRegistry,
    empty: Param,
    op: impl Fn(Param, Param) -> Param,
) -> ConvertResult<Param> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Ok(empty);
    };
    let mut acc = to_param(first, registry)?;
    for arg in iter {
        acc = op(acc, to_param(arg, registry)?);
    }
    Ok(acc)
}

/// Write a parameter as a number when it has a value, a sympy tree otherwise.
pub(crate) fn from_param(param: &Param) -> CirqValue {
    if let Some(v) = param.as_f64() {
        return CirqValue::Number(v);
    }
    let expr = match param {
        Param::Const(v) => return CirqValue::Number(*v),
        Param::Pi => SympyExpr::Pi,
        Param::Ref(r) => SympyExpr::Symbol {
            name: r.name.clone(),
        },
        Param::Neg(a) => SympyExpr::Mul {
            args: vec![CirqValue::Number(-1.0), from_param(a)],
        },
        Param::Add(a, b) => SympyExpr::Add {
            args: vec![from_param(a), from_param(b)],
        },
        Param::Sub(a, b) => SympyExpr::Add {
            args: vec![
                from_param(a),
                symbolic(SympyExpr::Mul {
                    args: vec![CirqValue::Number(-1.0), from_param(b)],
                }),
            ],
        },
        Param::Mul(a, b) => SympyExpr::Mul {
            args: vec![from_param(a), from_param(b)],
        },
        Param::Div(a, b) => SympyExpr::Mul {
            args: vec![
                from_param(a),
                symbolic(SympyExpr::Pow {
                    args: vec![from_param(b), CirqValue::Number(-1.0)],
                }),
            ],
        },
    };
    symbolic(expr)
}

fn symbolic(expr: SympyExpr) -> CirqValue {
    CirqValue::Symbolic(Box::new(expr))
}

fn malformed(reason: &str) -> ConvertError {
    ConvertError::malformed(FrameworkId::Cirq, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_ir::{Bindings, parse_param};

    #[test]
    fn test_numbers_and_constants() {
        let mut reg = ParameterRegistry::new();
        let half = symbolic(SympyExpr::Rational { p: 1, q: 2 });
        assert_eq!(to_param(&half, &mut reg).unwrap().as_f64(), Some(0.5));
        let pi = symbolic(SympyExpr::Pi);
        assert_eq!(to_param(&pi, &mut reg).unwrap().as_f64(), Some(std::f64::consts::PI));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_expression_survives_both_directions() {
        let mut reg = ParameterRegistry::new();
        let original = parse_param("-(theta - phi) / (2 * pi) + 0.25", &mut reg).unwrap();
        let tree = from_param(&original);
        let mut reg2 = ParameterRegistry::new();
        let back = to_param(&tree, &mut reg2).unwrap();
        assert_eq!(reg2.len(), 2);

        let b = Bindings::new().with("theta", 1.3).with("phi", -0.4);
        let want = original.evaluate(&b).unwrap();
        let got = back.evaluate(&b).unwrap();
        assert!((want - got).abs() < 1e-12);
    }

    #[test]
    fn test_symbolic_power_rejected() {
        let mut reg = ParameterRegistry::new();
        let t = symbolic(SympyExpr::Symbol { name: "t".into() });
        let pow = symbolic(SympyExpr::Pow {
            args: vec![CirqValue::Number(2.0), t],
        });
        assert!(matches!(
            to_param(&pow, &mut reg),
            Err(ConvertError::Malformed { .. })
        ));
    }
}
