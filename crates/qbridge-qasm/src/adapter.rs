//! OpenQASM 2.0 / 3.0 as framework adapters.

use logos::Logos;
use qbridge_ir::{Circuit, DispatchTable, FrameworkId, GateTag};
use qbridge_synth::{ConvertError, ConvertResult, FrameworkAdapter};
use std::sync::LazyLock;
use tracing::instrument;

use crate::emitter::emit;
use crate::error::ParseError;
use crate::lexer::Token;
use crate::parser::{lower_to_circuit, parse_program};

/// `qelib1.inc` gates, point-valued parameters only.
pub static QASM2_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new(
        FrameworkId::OpenQasm2,
        &[
            (GateTag::H, "h"),
            (GateTag::X, "x"),
            (GateTag::Y, "y"),
            (GateTag::Z, "z"),
            (GateTag::S, "s"),
            (GateTag::Sdg, "sdg"),
            (GateTag::T, "t"),
            (GateTag::Tdg, "tdg"),
            (GateTag::I, "id"),
            (GateTag::SX, "sx"),
            (GateTag::SXdg, "sxdg"),
            (GateTag::Phase, "p"),
            (GateTag::RX, "rx"),
            (GateTag::RY, "ry"),
            (GateTag::RZ, "rz"),
            (GateTag::U, "u"),
            (GateTag::CX, "cx"),
            (GateTag::CY, "cy"),
            (GateTag::CZ, "cz"),
            (GateTag::CH, "ch"),
            (GateTag::Swap, "swap"),
            (GateTag::CPhase, "cp"),
            (GateTag::CRX, "crx"),
            (GateTag::CRY, "cry"),
            (GateTag::CRZ, "crz"),
            (GateTag::RXX, "rxx"),
            (GateTag::RZZ, "rzz"),
            (GateTag::CCX, "ccx"),
            (GateTag::CSwap, "cswap"),
            (GateTag::Measure, "measure"),
        ],
    )
});

/// `stdgates.inc` gates; `input` declarations carry free parameters.
pub static QASM3_TABLE: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new(
        FrameworkId::OpenQasm3,
        &[
            (GateTag::H, "h"),
            (GateTag::X, "x"),
            (GateTag::Y, "y"),
            (GateTag::Z, "z"),
            (GateTag::S, "s"),
            (GateTag::Sdg, "sdg"),
            (GateTag::T, "t"),
            (GateTag::Tdg, "tdg"),
            (GateTag::I, "id"),
            (GateTag::SX, "sx"),
            (GateTag::Phase, "p"),
            (GateTag::RX, "rx"),
            (GateTag::RY, "ry"),
            (GateTag::RZ, "rz"),
            (GateTag::U, "u"),
            (GateTag::CX, "cx"),
            (GateTag::CY, "cy"),
            (GateTag::CZ, "cz"),
            (GateTag::CH, "ch"),
            (GateTag::Swap, "swap"),
            (GateTag::CPhase, "cp"),
            (GateTag::CRX, "crx"),
            (GateTag::CRY, "cry"),
            (GateTag::CRZ, "crz"),
            (GateTag::CCX, "ccx"),
            (GateTag::CSwap, "cswap"),
            (GateTag::Measure, "measure"),
        ],
    )
    .with_free_parameters(true)
});

/// Major OpenQASM version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QasmVersion {
    /// OpenQASM 2.0.
    V2,
    /// OpenQASM 3.0.
    V3,
}

impl QasmVersion {
    /// The framework id for this version.
    pub fn framework(self) -> FrameworkId {
        match self {
            QasmVersion::V2 => FrameworkId::OpenQasm2,
            QasmVersion::V3 => FrameworkId::OpenQasm3,
        }
    }

    /// Version for a framework id, if it is an OpenQASM one.
    pub fn from_framework(framework: FrameworkId) -> Option<Self> {
        match framework {
            FrameworkId::OpenQasm2 => Some(QasmVersion::V2),
            FrameworkId::OpenQasm3 => Some(QasmVersion::V3),
            _ => None,
        }
    }

    /// Header line written by the emitter.
    pub fn header(self) -> &'static str {
        match self {
            QasmVersion::V2 => "OPENQASM 2.0;",
            QasmVersion::V3 => "OPENQASM 3.0;",
        }
    }

    /// The version's dispatch table.
    pub fn table(self) -> &'static DispatchTable {
        match self {
            QasmVersion::V2 => &QASM2_TABLE,
            QasmVersion::V3 => &QASM3_TABLE,
        }
    }

    /// Read the version from the `OPENQASM x.y;` header, skipping comments.
    pub fn detect(source: &str) -> Option<Self> {
        let mut lexer = Token::lexer(source);
        if lexer.next() != Some(Ok(Token::OpenQasm)) {
            return None;
        }
        match lexer.next()? {
            Ok(Token::IntLiteral(2)) => Some(QasmVersion::V2),
            Ok(Token::IntLiteral(3)) => Some(QasmVersion::V3),
            Ok(Token::FloatLiteral(v)) if (2.0..3.0).contains(&v) => Some(QasmVersion::V2),
            Ok(Token::FloatLiteral(v)) if (3.0..4.0).contains(&v) => Some(QasmVersion::V3),
            _ => None,
        }
    }

    fn matches(self, version: &str) -> bool {
        match self {
            QasmVersion::V2 => version.starts_with("2."),
            QasmVersion::V3 => version.starts_with("3."),
        }
    }
}

/// Adapter for one OpenQASM version; the native form is the source text.
#[derive(Debug, Clone, Copy)]
pub struct QasmAdapter {
    version: QasmVersion,
}

impl QasmAdapter {
    /// Create an adapter for `version`.
    pub fn new(version: QasmVersion) -> Self {
        Self { version }
    }

    /// OpenQASM 2.0 adapter.
    pub fn v2() -> Self {
        Self::new(QasmVersion::V2)
    }

    /// OpenQASM 3.0 adapter.
    pub fn v3() -> Self {
        Self::new(QasmVersion::V3)
    }

    /// The version this adapter reads and writes.
    pub fn version(&self) -> QasmVersion {
        self.version
    }
}

impl FrameworkAdapter for QasmAdapter {
    type Native = String;

    fn framework(&self) -> FrameworkId {
        self.version.framework()
    }

    fn dispatch_table(&self) -> &'static DispatchTable {
        self.version.table()
    }

    #[instrument(skip_all, fields(framework = %self.framework(), bytes = native.len()))]
    fn decode(&self, native: &String) -> ConvertResult<Circuit> {
        let framework = self.framework();
        let program = parse_program(native).map_err(|e| convert_error(framework, e))?;
        if !self.version.matches(&program.version) {
            return Err(ConvertError::malformed(
                framework,
                format!("expected {}, found OPENQASM {}", self.version.header(), program.version),
            ));
        }
        lower_to_circuit(&program).map_err(|e| convert_error(framework, e))
    }

    #[instrument(skip_all, fields(framework = %self.framework(), ops = lowered.len()))]
    fn emit(&self, lowered: &Circuit) -> ConvertResult<String> {
        emit(lowered, self.version).map_err(|e| convert_error(self.framework(), e))
    }
}

/// Map parser and emitter failures onto the converter taxonomy.
fn convert_error(framework: FrameworkId, err: ParseError) -> ConvertError {
    match err {
        ParseError::UnknownGate(native) | ParseError::UnsupportedStatement(native) => {
            ConvertError::UnsupportedGate { framework, native }
        }
        ParseError::CircuitError(source) => ConvertError::ir(framework, source),
        other => ConvertError::malformed(framework, other.to_string()),
    }
}
