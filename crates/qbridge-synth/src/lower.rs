//! Lowering a circuit onto a target framework's dispatch table.
//!
//! Every adapter's encoder runs this first. The result contains only gates
//! the target supports natively, with bindings applied, so the encoder is
//! a plain table lookup per instruction.

use qbridge_ir::{Bindings, Circuit, DispatchTable, Instruction};
use tracing::{debug, instrument};

use crate::decompose::{DEFAULT_PHASE_ATOL, Decomposer, MAX_DECOMPOSITION_DEPTH};
use crate::error::{ConvertError, ConvertResult, IrResultExt, SynthError};
use crate::substitute::place;

/// Rewrite `circuit` so every instruction is native to `table`.
///
/// - Bound parameters are substituted. A free parameter left over on a
///   point-valued target is an [`ConvertError::UnboundParameter`].
/// - Measurements are dropped when the target measures implicitly.
/// - Any other gate missing from the table is decomposed and its
///   replacement lowered in turn, up to [`MAX_DECOMPOSITION_DEPTH`] levels.
pub fn lower(circuit: &Circuit, table: &DispatchTable, bindings: &Bindings) -> ConvertResult<Circuit> {
    lower_with_tolerance(circuit, table, bindings, DEFAULT_PHASE_ATOL)
}

/// [`lower`] with an explicit tolerance for recognizing phase gates during
/// single-qubit synthesis.
#[instrument(skip_all, fields(target = %table.framework(), ops = circuit.len(), atol = atol))]
pub fn lower_with_tolerance(
    circuit: &Circuit,
    table: &DispatchTable,
    bindings: &Bindings,
    atol: f64,
) -> ConvertResult<Circuit> {
    let mut lowering = Lowering {
        table,
        bindings,
        engine: Decomposer::with_tolerance(atol),
        out: Vec::with_capacity(circuit.len()),
    };
    for inst in circuit.instructions() {
        lowering.visit(inst, 0)?;
    }
    debug!(
        produced = lowering.out.len(),
        cached = lowering.engine.cached(),
        "lowered circuit"
    );
    circuit
        .with_instructions(lowering.out)
        .for_framework(table.framework())
}

struct Lowering<'a> {
    table: &'a DispatchTable,
    bindings: &'a Bindings,
    engine: Decomposer,
    out: Vec<Instruction>,
}

impl Lowering<'_> {
    fn visit(&mut self, inst: &Instruction, depth: usize) -> ConvertResult<()> {
        let framework = self.table.framework();
        if inst.is_measure() {
            if !self.table.measures_implicitly() {
                self.out.push(inst.clone());
            }
            return Ok(());
        }

        let gate = inst.gate().substitute(self.bindings).for_framework(framework)?;
        if gate.is_parameterized() && !self.table.supports_free_parameters() {
            let name = gate
                .params()
                .iter()
                .flat_map(|p| p.refs())
                .map(|r| r.name)
                .next()
                .unwrap_or_default();
            return Err(ConvertError::UnboundParameter { framework, name });
        }
        if self.table.supports(gate.tag()) {
            self.out.push(inst.with_gate(gate).for_framework(framework)?);
            return Ok(());
        }

        let conversion = |source: SynthError| ConvertError::Conversion {
            framework,
            tag: gate.tag(),
            arity: gate.num_qubits(),
            source,
        };
        if depth >= MAX_DECOMPOSITION_DEPTH {
            return Err(conversion(SynthError::Decomposition {
                tag: gate.tag(),
                arity: gate.num_qubits(),
                reason: format!("nesting exceeds {MAX_DECOMPOSITION_DEPTH} levels"),
            }));
        }
        let sequence = self.engine.decompose(&gate).map_err(conversion)?;
        let replacement = place(&sequence, inst.qubits()).for_framework(framework)?;
        for sub in &replacement {
            self.visit(sub, depth + 1)?;
        }
        Ok(())
    }
}
