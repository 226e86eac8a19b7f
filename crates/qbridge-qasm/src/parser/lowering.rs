//! Syntax-tree to circuit lowering.
//!
//! Registers are laid out in declaration order. Barriers are elided, gate
//! definitions are inlined at each call, and `input` declarations become
//! free parameters of the circuit.

use qbridge_ir::{Circuit, CircuitBuilder, ClbitId, GateTag, Param, QubitId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::f64::consts::{E, FRAC_PI_2, TAU};
use tracing::debug;

use crate::ast::{BinOp, Expression, GateCall, GateDef, Program, QubitRef, Statement, apply_function};
use crate::error::{ParseError, ParseResult};

/// Nesting limit for user gate definitions.
const MAX_INLINE_DEPTH: usize = 32;

/// Lower a parsed program to a circuit.
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::default();
    lowerer.lower(program)
}

/// Map a gate name to its canonical tag, including legacy QASM aliases.
pub(crate) fn standard_gate(name: &str) -> Option<GateTag> {
    let tag = match name {
        "U" | "u3" => GateTag::U,
        "CX" | "cnot" => GateTag::CX,
        "u1" | "phase" => GateTag::Phase,
        "cu1" | "cphase" => GateTag::CPhase,
        "toffoli" => GateTag::CCX,
        "fredkin" => GateTag::CSwap,
        "i" => GateTag::I,
        _ => {
            return GateTag::ALL
                .iter()
                .copied()
                .filter(|t| !matches!(t, GateTag::Unitary | GateTag::Measure))
                .find(|t| t.name() == name);
        }
    };
    Some(tag)
}

/// Formal-to-actual bindings inside an inlined gate body.
#[derive(Default)]
struct Scope {
    params: FxHashMap<String, Param>,
    qubits: FxHashMap<String, QubitId>,
}

#[derive(Default)]
struct Lowerer<'p> {
    /// Qubit registers: name -> (`start_id`, size).
    qregs: FxHashMap<String, (u32, u32)>,
    /// Classical bit registers: name -> (`start_id`, size).
    cregs: FxHashMap<String, (u32, u32)>,
    inputs: FxHashMap<String, Param>,
    gate_defs: FxHashMap<&'p str, &'p GateDef>,
    opaque: FxHashSet<&'p str>,
    next_qubit: u32,
    next_clbit: u32,
}

impl<'p> Lowerer<'p> {
    fn lower(&mut self, program: &'p Program) -> ParseResult<Circuit> {
        // First pass: register layout
        for stmt in &program.statements {
            match stmt {
                Statement::QubitDecl { name, size } => {
                    self.check_fresh(name)?;
                    self.qregs.insert(name.clone(), (self.next_qubit, *size));
                    self.next_qubit = grow(self.next_qubit, *size, name)?;
                }
                Statement::BitDecl { name, size } => {
                    self.check_fresh(name)?;
                    self.cregs.insert(name.clone(), (self.next_clbit, *size));
                    self.next_clbit = grow(self.next_clbit, *size, name)?;
                }
                _ => {}
            }
        }

        let mut builder = Circuit::builder(self.next_qubit, self.next_clbit);

        // Second pass: statements in program order
        for stmt in &program.statements {
            self.lower_statement(&mut builder, stmt)?;
        }

        Ok(builder.build())
    }

    fn check_fresh(&self, name: &str) -> ParseResult<()> {
        if self.qregs.contains_key(name)
            || self.cregs.contains_key(name)
            || self.inputs.contains_key(name)
        {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        Ok(())
    }

    fn lower_statement(&mut self, builder: &mut CircuitBuilder, stmt: &'p Statement) -> ParseResult<()> {
        match stmt {
            Statement::QubitDecl { .. } | Statement::BitDecl { .. } | Statement::Include(_) => Ok(()),

            Statement::InputDecl { name } => {
                self.check_fresh(name)?;
                let param = builder.param(name.as_str());
                self.inputs.insert(name.clone(), param);
                Ok(())
            }

            Statement::GateDef(def) => {
                if standard_gate(&def.name).is_some() {
                    debug!(gate = %def.name, "ignoring definition of a standard gate");
                    return Ok(());
                }
                if self.gate_defs.insert(def.name.as_str(), def).is_some() {
                    return Err(ParseError::DuplicateDeclaration(def.name.clone()));
                }
                Ok(())
            }

            Statement::Opaque { name } => {
                self.opaque.insert(name.as_str());
                Ok(())
            }

            Statement::Gate(call) => self.lower_gate_call(builder, call, &Scope::default(), 0),

            Statement::Measure { qubits, bits } => {
                let q_ids: Vec<QubitId> = qubits
                    .iter()
                    .map(|r| self.resolve_qubit(r, None))
                    .collect::<ParseResult<Vec<_>>>()?
                    .concat();
                let c_ids: Vec<ClbitId> = bits
                    .iter()
                    .map(|r| self.resolve_clbit(r))
                    .collect::<ParseResult<Vec<_>>>()?
                    .concat();

                // A bare `measure q;` writes qubit i into bit i.
                let c_ids = if bits.is_empty() {
                    q_ids.iter().map(|q| ClbitId(q.0)).collect()
                } else {
                    c_ids
                };
                if q_ids.len() != c_ids.len() {
                    return Err(ParseError::Generic(format!(
                        "measure maps {} qubits onto {} bits",
                        q_ids.len(),
                        c_ids.len()
                    )));
                }

                for (q, c) in q_ids.into_iter().zip(c_ids) {
                    builder.measure(q, c)?;
                }
                Ok(())
            }

            Statement::Reset { .. } => Err(ParseError::UnsupportedStatement("reset".into())),

            Statement::Barrier { .. } => {
                debug!("eliding barrier");
                Ok(())
            }
        }
    }

    fn lower_gate_call(
        &self,
        builder: &mut CircuitBuilder,
        call: &GateCall,
        scope: &Scope,
        depth: usize,
    ) -> ParseResult<()> {
        let mut params = call
            .params
            .iter()
            .map(|e| self.expr_to_param(e, scope))
            .collect::<ParseResult<Vec<_>>>()?;
        let args = call
            .qubits
            .iter()
            .map(|r| self.resolve_qubit(r, Some(scope)))
            .collect::<ParseResult<Vec<_>>>()?;

        let name = call.name.as_str();
        let tag = if name == "u2" {
            // u2(φ, λ) = U(π/2, φ, λ)
            check_param_count(name, &params, 2)?;
            params.insert(0, Param::Const(FRAC_PI_2));
            Some(GateTag::U)
        } else {
            standard_gate(name)
        };

        if let Some(tag) = tag {
            check_param_count(name, &params, tag.num_params())?;
            let arity = tag.num_qubits().unwrap_or(0) as usize;
            check_qubit_count(name, &args, arity)?;
            for qubits in broadcast(name, &args)? {
                builder.apply(tag, params.clone(), qubits)?;
            }
            return Ok(());
        }

        if let Some(def) = self.gate_defs.get(name) {
            if depth >= MAX_INLINE_DEPTH {
                return Err(ParseError::Generic(format!(
                    "gate '{name}' nests deeper than {MAX_INLINE_DEPTH} definitions"
                )));
            }
            check_param_count(name, &params, def.params.len())?;
            check_qubit_count(name, &args, def.qubits.len())?;
            debug!(gate = name, ops = def.body.len(), "inlining gate definition");

            for qubits in broadcast(name, &args)? {
                let inner = Scope {
                    params: def.params.iter().cloned().zip(params.iter().cloned()).collect(),
                    qubits: def.qubits.iter().cloned().zip(qubits).collect(),
                };
                for body_call in &def.body {
                    self.lower_gate_call(builder, body_call, &inner, depth + 1)?;
                }
            }
            return Ok(());
        }

        if self.opaque.contains(name) {
            debug!(gate = name, "opaque gate has no body");
        }
        Err(ParseError::UnknownGate(name.to_string()))
    }

    /// Qubits named by a reference: one for `q[i]` or a formal, all for `q`.
    fn resolve_qubit(&self, r: &QubitRef, scope: Option<&Scope>) -> ParseResult<Vec<QubitId>> {
        if let (Some(scope), None) = (scope, r.index) {
            if let Some(&q) = scope.qubits.get(&r.register) {
                return Ok(vec![q]);
            }
        }
        let &(start, size) = self
            .qregs
            .get(&r.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(r.register.clone()))?;
        Ok(register_slice(r, start, size)?
            .map(QubitId)
            .collect())
    }

    fn resolve_clbit(&self, r: &QubitRef) -> ParseResult<Vec<ClbitId>> {
        let &(start, size) = self
            .cregs
            .get(&r.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(r.register.clone()))?;
        Ok(register_slice(r, start, size)?
            .map(ClbitId)
            .collect())
    }

    fn expr_to_param(&self, expr: &Expression, scope: &Scope) -> ParseResult<Param> {
        Ok(match expr {
            #[allow(clippy::cast_precision_loss)]
            Expression::Int(v) => Param::Const(*v as f64),
            Expression::Float(v) => Param::Const(*v),
            Expression::Pi => Param::Pi,
            Expression::Tau => Param::Const(TAU),
            Expression::Euler => Param::Const(E),
            Expression::Identifier(name) => scope
                .params
                .get(name)
                .or_else(|| self.inputs.get(name))
                .cloned()
                .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?,
            Expression::Neg(e) => -self.expr_to_param(e, scope)?,
            Expression::Paren(e) => self.expr_to_param(e, scope)?,
            Expression::BinOp { left, op, right } => {
                let l = self.expr_to_param(left, scope)?;
                let r = self.expr_to_param(right, scope)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => match (l.as_f64(), r.as_f64()) {
                        (Some(a), Some(b)) => Param::Const(a.powf(b)),
                        _ => {
                            return Err(ParseError::Generic(
                                "exponentiation of a free parameter is not supported".into(),
                            ));
                        }
                    },
                }
            }
            Expression::FnCall { name, args } => {
                let values = args
                    .iter()
                    .map(|a| self.expr_to_param(a, scope).map(|p| p.as_f64()))
                    .collect::<ParseResult<Vec<_>>>()?;
                match values.as_slice() {
                    [Some(x)] => apply_function(name, *x)
                        .map(Param::Const)
                        .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?,
                    _ => {
                        return Err(ParseError::Generic(format!(
                            "function '{name}' needs one numeric argument"
                        )));
                    }
                }
            }
        })
    }
}

/// Advance a register offset, refusing layouts past the index range.
fn grow(offset: u32, size: u32, register: &str) -> ParseResult<u32> {
    offset.checked_add(size).ok_or_else(|| {
        ParseError::Generic(format!("register '{register}' does not fit the index range"))
    })
}

fn register_slice(
    r: &QubitRef,
    start: u32,
    size: u32,
) -> ParseResult<std::ops::Range<u32>> {
    match r.index {
        Some(index) if index >= size => Err(ParseError::IndexOutOfBounds {
            register: r.register.clone(),
            index,
            size,
        }),
        Some(index) => Ok(start + index..start + index + 1),
        None => Ok(start..start + size),
    }
}

/// Expand register arguments into one application per element.
///
/// Single qubits are repeated; every register argument must have the same
/// size.
fn broadcast(name: &str, args: &[Vec<QubitId>]) -> ParseResult<Vec<Vec<QubitId>>> {
    let width = args
        .iter()
        .map(Vec::len)
        .filter(|&n| n != 1)
        .max()
        .unwrap_or(1);
    if args.iter().any(|a| a.len() != 1 && a.len() != width) {
        return Err(ParseError::Generic(format!(
            "register arguments of '{name}' differ in size"
        )));
    }
    Ok((0..width)
        .map(|i| {
            args.iter()
                .map(|a| if a.len() == 1 { a[0] } else { a[i] })
                .collect()
        })
        .collect())
}

fn check_param_count(gate: &str, params: &[Param], expected: usize) -> ParseResult<()> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongParameterCount {
            gate: gate.to_string(),
            expected,
            got: params.len(),
        })
    }
}

fn check_qubit_count(gate: &str, qubits: &[Vec<QubitId>], expected: usize) -> ParseResult<()> {
    if qubits.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongQubitCount {
            gate: gate.to_string(),
            expected,
            got: qubits.len(),
        })
    }
}
