//! OpenQASM emitter for lowered circuits.
//!
//! The input must already be lowered onto the version's dispatch table; the
//! emitter only spells out names, angles and registers.

use qbridge_ir::{Circuit, ClbitId, DispatchTable, Instruction, IrError, Param, QubitId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::adapter::QasmVersion;
use crate::error::{ParseError, ParseResult};

/// Angles written symbolically. Each spelling parses back to the same bits.
const PI_FRACTIONS: [(f64, &str); 7] = [
    (PI, "pi"),
    (-PI, "-pi"),
    (FRAC_PI_2, "pi/2"),
    (-FRAC_PI_2, "-pi/2"),
    (FRAC_PI_4, "pi/4"),
    (-FRAC_PI_4, "-pi/4"),
    (TAU, "2*pi"),
];

/// Words the lexer treats as keywords, so they cannot name an input.
const RESERVED: [&str; 19] = [
    "OPENQASM", "include", "qreg", "creg", "qubit", "bit", "input", "float", "angle", "gate",
    "opaque", "measure", "reset", "barrier", "U", "CX", "pi", "tau", "euler",
];

/// Emit `circuit` as OpenQASM source of the given version.
pub fn emit(circuit: &Circuit, version: QasmVersion) -> ParseResult<String> {
    let mut emitter = Emitter::new(version);
    emitter.emit_circuit(circuit)
}

struct Emitter {
    version: QasmVersion,
    table: &'static DispatchTable,
    /// Emitted identifier per parameter id.
    names: FxHashMap<u32, String>,
    output: String,
}

impl Emitter {
    fn new(version: QasmVersion) -> Self {
        Self {
            version,
            table: version.table(),
            names: FxHashMap::default(),
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> ParseResult<String> {
        let inputs = circuit.free_parameters();
        if self.version == QasmVersion::V2 {
            if let Some(first) = inputs.first() {
                return Err(IrError::UnboundParameter(first.name.clone()).into());
            }
        }

        self.writeln(self.version.header());
        self.writeln(match self.version {
            QasmVersion::V2 => "include \"qelib1.inc\";",
            QasmVersion::V3 => "include \"stdgates.inc\";",
        });

        let mut used = FxHashSet::default();
        for param in &inputs {
            let mut name = identifier(&param.name);
            while !used.insert(name.clone()) {
                name.push('_');
            }
            self.writeln(&format!("input float[64] {name};"));
            self.names.insert(param.id, name);
        }

        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        match self.version {
            QasmVersion::V2 => {
                if num_qubits > 0 {
                    self.writeln(&format!("qreg q[{num_qubits}];"));
                }
                if num_clbits > 0 {
                    self.writeln(&format!("creg c[{num_clbits}];"));
                }
            }
            QasmVersion::V3 => {
                if num_qubits > 0 {
                    self.writeln(&format!("qubit[{num_qubits}] q;"));
                }
                if num_clbits > 0 {
                    self.writeln(&format!("bit[{num_clbits}] c;"));
                }
            }
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> ParseResult<()> {
        if instruction.is_measure() {
            for (q, c) in instruction.qubits().iter().zip(instruction.clbits()) {
                let line = match self.version {
                    QasmVersion::V2 => format!("measure {} -> {};", qubit(*q), clbit(*c)),
                    QasmVersion::V3 => format!("{} = measure {};", clbit(*c), qubit(*q)),
                };
                self.writeln(&line);
            }
            return Ok(());
        }

        let gate = instruction.gate();
        let name = self
            .table
            .native(gate.tag())
            .ok_or_else(|| ParseError::UnknownGate(gate.tag().name().to_string()))?;
        let qubits = instruction
            .qubits()
            .iter()
            .map(|q| qubit(*q))
            .collect::<Vec<_>>()
            .join(", ");

        if gate.params().is_empty() {
            self.writeln(&format!("{name} {qubits};"));
        } else {
            let params = gate
                .params()
                .iter()
                .map(|p| self.emit_param(p))
                .collect::<ParseResult<Vec<_>>>()?
                .join(", ");
            self.writeln(&format!("{name}({params}) {qubits};"));
        }
        Ok(())
    }

    fn emit_param(&self, param: &Param) -> ParseResult<String> {
        Ok(match param {
            Param::Const(v) => emit_angle(*v)?,
            Param::Pi => "pi".into(),
            Param::Ref(r) => self
                .names
                .get(&r.id)
                .cloned()
                .ok_or_else(|| ParseError::UndefinedIdentifier(r.name.clone()))?,
            Param::Neg(e) => format!("-({})", self.emit_param(e)?),
            Param::Add(a, b) => format!("({} + {})", self.emit_param(a)?, self.emit_param(b)?),
            Param::Sub(a, b) => format!("({} - {})", self.emit_param(a)?, self.emit_param(b)?),
            Param::Mul(a, b) => format!("({} * {})", self.emit_param(a)?, self.emit_param(b)?),
            Param::Div(a, b) => format!("({} / {})", self.emit_param(a)?, self.emit_param(b)?),
        })
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

#[allow(clippy::float_cmp)]
fn emit_angle(v: f64) -> ParseResult<String> {
    if !v.is_finite() {
        return Err(ParseError::Generic(format!("cannot emit angle {v}")));
    }
    if let Some((_, text)) = PI_FRACTIONS.iter().find(|(x, _)| *x == v) {
        return Ok((*text).to_string());
    }
    // Shortest representation that parses back to the same value.
    Ok(format!("{v}"))
}

/// A valid OpenQASM identifier for a parameter name.
fn identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) || RESERVED.contains(&out.as_str()) {
        out.insert(0, '_');
    }
    out
}

fn qubit(q: QubitId) -> String {
    format!("q[{}]", q.0)
}

fn clbit(c: ClbitId) -> String {
    format!("c[{}]", c.0)
}
