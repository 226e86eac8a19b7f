//! Gate synthesis and target lowering for qbridge.
//!
//! This crate turns IR gates a framework cannot express into sequences it
//! can, and checks that the result still implements the same unitary.
//!
//! # Decomposition order
//!
//! 1. Closed-form rules ([`rules`]) for controlled, interaction and
//!    three-qubit gates. They accept symbolic parameters.
//! 2. ZYZ Euler synthesis ([`euler`]) for any numeric single-qubit gate.
//! 3. KAK synthesis ([`kak`]) for any numeric two-qubit gate, with at most
//!    three CX.
//!
//! Anything else is a [`SynthError::Decomposition`].
//!
//! # Example
//!
//! ```rust
//! use qbridge_ir::{Bindings, Circuit, DispatchTable, FrameworkId, GateTag, QubitId};
//! use qbridge_synth::{EquivalenceOracle, lower};
//!
//! let mut b = Circuit::builder(2, 0);
//! b.apply(GateTag::ISwap, vec![], [QubitId(0), QubitId(1)]).unwrap();
//! let circuit = b.build();
//!
//! let core: Vec<_> = GateTag::COMMON_CORE.iter().map(|&t| (t, t.name())).collect();
//! let table = DispatchTable::new(FrameworkId::OpenQasm2, &core);
//! let lowered = lower(&circuit, &table, &Bindings::new()).unwrap();
//!
//! assert!(lowered.instructions().iter().all(|i| i.tag().is_common_core()));
//! assert!(EquivalenceOracle::default().equivalent(&circuit, &lowered).unwrap());
//! ```

pub mod adapter;
pub mod decompose;
pub mod equivalence;
pub mod error;
pub mod euler;
pub mod kak;
pub mod lower;
pub mod random;
pub mod rules;
pub mod substitute;
pub mod unitary;

pub use adapter::FrameworkAdapter;
pub use decompose::{DEFAULT_PHASE_ATOL, Decomposer, MAX_DECOMPOSITION_DEPTH};
pub use equivalence::{
    DEFAULT_ATOL, DEFAULT_MAX_QUBITS, EquivalenceOracle, MAX_DENSE_QUBITS, equal_up_to_phase,
};
pub use error::{ConvertError, ConvertResult, IrResultExt, SynthError, SynthResult};
pub use kak::{KakDecomposition, kak_decompose};
pub use lower::{lower, lower_with_tolerance};
pub use substitute::Substitute;
pub use unitary::{Unitary2x2, ZyzAngles};
