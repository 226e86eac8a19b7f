//! Symbolic parameters: registry handles, expressions and bindings.
//!
//! A free parameter is never stored by name inside a gate. Decoders register
//! the native parameter once in the circuit's [`ParameterRegistry`] and keep
//! the returned [`ParamRef`] handle; equality between parameters is equality
//! of their integer ids.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{IrError, IrResult};

/// Handle to a free parameter registered in a circuit.
///
/// The handle never carries a value. `name` is kept alongside the id so the
/// handle can be displayed and bound without a registry lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamRef {
    /// Dense, circuit-local id (declaration order).
    pub id: u32,
    /// Display name, as spelled by the source framework.
    pub name: String,
}

impl PartialEq for ParamRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ParamRef {}

impl Hash for ParamRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Bijective id <-> name table of the free parameters of one circuit.
///
/// Grows only through [`register`](Self::register), which appends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ParameterRegistry {
    names: Vec<String>,
    index: FxHashMap<String, u32>,
}

impl From<Vec<String>> for ParameterRegistry {
    fn from(names: Vec<String>) -> Self {
        let mut registry = Self::default();
        for name in names {
            registry.register(name);
        }
        registry
    }
}

impl From<ParameterRegistry> for Vec<String> {
    fn from(registry: ParameterRegistry) -> Self {
        registry.names
    }
}

impl ParameterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native parameter by name.
    ///
    /// Registering a name that was already seen returns the existing handle.
    pub fn register(&mut self, name: impl Into<String>) -> ParamRef {
        let name = name.into();
        if let Some(&id) = self.index.get(&name) {
            return ParamRef { id, name };
        }
        let id = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        self.names.push(name.clone());
        self.index.insert(name.clone(), id);
        ParamRef { id, name }
    }

    /// Look up a handle by id.
    pub fn get(&self, id: u32) -> Option<ParamRef> {
        self.names.get(id as usize).map(|name| ParamRef {
            id,
            name: name.clone(),
        })
    }

    /// Look up a handle by name.
    pub fn lookup(&self, name: &str) -> Option<ParamRef> {
        self.index.get(name).map(|&id| ParamRef {
            id,
            name: name.to_string(),
        })
    }

    /// Whether `param` was issued by this registry.
    pub fn contains(&self, param: &ParamRef) -> bool {
        self.names
            .get(param.id as usize)
            .is_some_and(|name| *name == param.name)
    }

    /// Resolve a handle to a number through a binding table.
    pub fn resolve(&self, param: &ParamRef, bindings: &Bindings) -> IrResult<f64> {
        if !self.contains(param) {
            return Err(IrError::UnknownParameter {
                id: param.id,
                name: param.name.clone(),
            });
        }
        bindings
            .get(&param.name)
            .ok_or_else(|| IrError::UnboundParameter(param.name.clone()))
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no parameter has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over handles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ParamRef> + '_ {
        self.names.iter().enumerate().map(|(id, name)| ParamRef {
            id: id as u32,
            name: name.clone(),
        })
    }
}

/// Name -> value table supplied by the caller at encode time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(FxHashMap<String, f64>);

impl Bindings {
    /// Create an empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Value bound to `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A gate parameter: a number, or an expression over free parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// A constant numeric value.
    Const(f64),
    /// The constant π.
    Pi,
    /// A free parameter.
    Ref(ParamRef),
    /// Negation.
    Neg(Box<Param>),
    /// Addition.
    Add(Box<Param>, Box<Param>),
    /// Subtraction.
    Sub(Box<Param>, Box<Param>),
    /// Multiplication.
    Mul(Box<Param>, Box<Param>),
    /// Division.
    Div(Box<Param>, Box<Param>),
}

impl Param {
    /// Check if this expression references any free parameter.
    pub fn is_symbolic(&self) -> bool {
        match self {
            Param::Ref(_) => true,
            Param::Const(_) | Param::Pi => false,
            Param::Neg(e) => e.is_symbolic(),
            Param::Add(a, b) | Param::Sub(a, b) | Param::Mul(a, b) | Param::Div(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Try to evaluate as a concrete value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Param::Const(v) => Some(*v),
            Param::Pi => Some(PI),
            Param::Ref(_) => None,
            Param::Neg(e) => e.as_f64().map(|v| -v),
            Param::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            Param::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            Param::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            Param::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Evaluate with every free parameter looked up in `bindings`.
    ///
    /// Division by zero is [`IrError::InvalidExpression`].
    pub fn evaluate(&self, bindings: &Bindings) -> IrResult<f64> {
        match self {
            Param::Ref(r) => bindings
                .get(&r.name)
                .ok_or_else(|| IrError::UnboundParameter(r.name.clone())),
            Param::Const(v) => Ok(*v),
            Param::Pi => Ok(PI),
            Param::Neg(e) => Ok(-e.evaluate(bindings)?),
            Param::Add(a, b) => Ok(a.evaluate(bindings)? + b.evaluate(bindings)?),
            Param::Sub(a, b) => Ok(a.evaluate(bindings)? - b.evaluate(bindings)?),
            Param::Mul(a, b) => Ok(a.evaluate(bindings)? * b.evaluate(bindings)?),
            Param::Div(a, b) => {
                let divisor = b.evaluate(bindings)?;
                if divisor == 0.0 {
                    return Err(IrError::InvalidExpression(self.to_string()));
                }
                Ok(a.evaluate(bindings)? / divisor)
            }
        }
    }

    /// Replace every bound free parameter by its value, keep the rest.
    pub fn substitute(&self, bindings: &Bindings) -> Param {
        let substituted = match self {
            Param::Ref(r) => match bindings.get(&r.name) {
                Some(v) => Param::Const(v),
                None => self.clone(),
            },
            Param::Const(_) | Param::Pi => self.clone(),
            Param::Neg(e) => Param::Neg(Box::new(e.substitute(bindings))),
            Param::Add(a, b) => Param::Add(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            Param::Sub(a, b) => Param::Sub(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            Param::Mul(a, b) => Param::Mul(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            Param::Div(a, b) => Param::Div(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
        };
        substituted.simplify()
    }

    /// Free parameters referenced by this expression, in first-seen order.
    pub fn refs(&self) -> Vec<ParamRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut Vec<ParamRef>) {
        match self {
            Param::Const(_) | Param::Pi => {}
            Param::Ref(r) => {
                if !out.contains(r) {
                    out.push(r.clone());
                }
            }
            Param::Neg(e) => e.collect_refs(out),
            Param::Add(a, b) | Param::Sub(a, b) | Param::Mul(a, b) | Param::Div(a, b) => {
                a.collect_refs(out);
                b.collect_refs(out);
            }
        }
    }

    /// Rewrite every free parameter through `f`.
    ///
    /// Used when an expression moves between circuits whose registries
    /// assign different ids.
    pub fn map_refs(&self, f: &mut impl FnMut(&ParamRef) -> ParamRef) -> Param {
        match self {
            Param::Ref(r) => Param::Ref(f(r)),
            Param::Const(_) | Param::Pi => self.clone(),
            Param::Neg(e) => Param::Neg(Box::new(e.map_refs(f))),
            Param::Add(a, b) => Param::Add(Box::new(a.map_refs(f)), Box::new(b.map_refs(f))),
            Param::Sub(a, b) => Param::Sub(Box::new(a.map_refs(f)), Box::new(b.map_refs(f))),
            Param::Mul(a, b) => Param::Mul(Box::new(a.map_refs(f)), Box::new(b.map_refs(f))),
            Param::Div(a, b) => Param::Div(Box::new(a.map_refs(f)), Box::new(b.map_refs(f))),
        }
    }

    /// Fold constant subexpressions.
    pub fn simplify(&self) -> Param {
        if let Some(v) = self.as_f64() {
            return match self {
                Param::Pi => Param::Pi,
                _ => Param::Const(v),
            };
        }
        match self {
            Param::Neg(e) => match e.simplify() {
                Param::Neg(inner) => *inner,
                e => Param::Neg(Box::new(e)),
            },
            Param::Add(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), _) if x == 0.0 => b,
                    (_, Some(y)) if y == 0.0 => a,
                    _ => Param::Add(Box::new(a), Box::new(b)),
                }
            }
            Param::Sub(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), _) if x == 0.0 => Param::Neg(Box::new(b)),
                    (_, Some(y)) if y == 0.0 => a,
                    _ => Param::Sub(Box::new(a), Box::new(b)),
                }
            }
            Param::Mul(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), _) if x == 1.0 => b,
                    (_, Some(y)) if y == 1.0 => a,
                    (Some(x), _) if x == -1.0 => Param::Neg(Box::new(b)),
                    _ => Param::Mul(Box::new(a), Box::new(b)),
                }
            }
            Param::Div(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match b.as_f64() {
                    Some(y) if y == 1.0 => a,
                    _ => Param::Div(Box::new(a), Box::new(b)),
                }
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Const(v) => write!(f, "{v}"),
            Param::Pi => f.write_str("pi"),
            Param::Ref(r) => write!(f, "{r}"),
            Param::Neg(e) => write!(f, "-({e})"),
            Param::Add(a, b) => write!(f, "({a} + {b})"),
            Param::Sub(a, b) => write!(f, "({a} - {b})"),
            Param::Mul(a, b) => write!(f, "({a} * {b})"),
            Param::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Const(value)
    }
}

impl From<ParamRef> for Param {
    fn from(value: ParamRef) -> Self {
        Param::Ref(value)
    }
}

impl std::ops::Add for Param {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Param::Add(Box::new(self), Box::new(rhs)).simplify()
    }
}

impl std::ops::Sub for Param {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Param::Sub(Box::new(self), Box::new(rhs)).simplify()
    }
}

impl std::ops::Mul for Param {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Param::Mul(Box::new(self), Box::new(rhs)).simplify()
    }
}

impl std::ops::Div for Param {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Param::Div(Box::new(self), Box::new(rhs)).simplify()
    }
}

impl std::ops::Neg for Param {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Param::Neg(Box::new(self)).simplify()
    }
}
