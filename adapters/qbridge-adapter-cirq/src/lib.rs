//! qbridge adapter for Cirq
//!
//! Reads and writes the JSON produced by `cirq.to_json` for circuits on
//! `LineQubit`s.
//!
//! | Cirq gate | IR tag |
//! |-----------|--------|
//! | `HPowGate`, `XPowGate`, `YPowGate`, `ZPowGate` at named exponents | `H`, `X`, `SX`, `SXdg`, `Y`, `Z`, `S`, `Sdg`, `T`, `Tdg` |
//! | `ZPowGate` / `CZPowGate` at other exponents | `Phase` / `CPhase` |
//! | `Rx`, `Ry`, `Rz` | `RX`, `RY`, `RZ` |
//! | `XXPowGate`, `YYPowGate`, `ZZPowGate` | `RXX`, `RYY`, `RZZ` |
//! | `CXPowGate`, `SwapPowGate`, `ISwapPowGate`, `CCXPowGate`, `CSwapGate` | `CX`, `Swap`, `ISwap`, `CCX`, `CSwap` |
//! | `MatrixGate` | `Unitary` |
//! | `MeasurementGate` | `Measure` |
//!
//! Symbolic exponents and angles are sympy expression trees. Cirq has no
//! declared width, so a decoded circuit spans `0..=max(x)`.

mod adapter;
mod model;
mod symbolic;

pub use adapter::{CIRQ_TABLE, CirqAdapter};
pub use model::{CirqCircuit, CirqGate, CirqValue, LineQubit, Moment, Operation, SympyExpr};
