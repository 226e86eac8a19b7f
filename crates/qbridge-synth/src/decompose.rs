//! The decomposition engine: closed-form rules first, numeric synthesis
//! second.

use qbridge_ir::{Gate, GateTag};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::error::{SynthError, SynthResult};
use crate::euler::euler_substitutes;
use crate::kak::kak_substitutes;
use crate::rules::closed_form;
use crate::substitute::Substitute;
use crate::unitary::{Unitary2x2, normalize_angle};

/// Nesting limit for decomposition during target lowering.
pub const MAX_DECOMPOSITION_DEPTH: usize = 16;

/// Bit-exact identity of a numeric gate, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tag: GateTag,
    bits: Vec<u64>,
}

impl CacheKey {
    fn of(gate: &Gate) -> Option<Self> {
        let matrix = gate.matrix()?;
        let bits = matrix
            .iter()
            .flat_map(|z| [z.re.to_bits(), z.im.to_bits()])
            .collect();
        Some(Self {
            tag: gate.tag(),
            bits,
        })
    }
}

/// Default tolerance for recognizing single-qubit phase gates.
pub const DEFAULT_PHASE_ATOL: f64 = 1e-7;

/// Produces replacement sequences for gates a target cannot express.
///
/// Numeric syntheses are memoized per engine; create one engine per
/// conversion so caches are never shared between invocations.
#[derive(Debug)]
pub struct Decomposer {
    atol: f64,
    cache: FxHashMap<CacheKey, Rc<[Substitute]>>,
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::with_tolerance(DEFAULT_PHASE_ATOL)
    }
}

impl Decomposer {
    /// Create an engine with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that treats a single-qubit matrix whose off-diagonal
    /// entries are within `atol` of zero as a pure phase gate.
    pub fn with_tolerance(atol: f64) -> Self {
        Self {
            atol,
            cache: FxHashMap::default(),
        }
    }

    /// Number of memoized numeric syntheses.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Replacement sequence for `gate`, in time order, over operand
    /// positions `0..arity`.
    ///
    /// Tries a closed-form rule, then Euler (one qubit) or KAK (two qubits)
    /// synthesis of the gate's matrix.
    pub fn decompose(&mut self, gate: &Gate) -> SynthResult<Rc<[Substitute]>> {
        if let Some(seq) = closed_form(gate)? {
            trace!(tag = %gate.tag(), len = seq.len(), "closed-form rule");
            return Ok(seq.into());
        }

        let arity = gate.num_qubits();
        let Some(key) = CacheKey::of(gate) else {
            return Err(SynthError::Decomposition {
                tag: gate.tag(),
                arity,
                reason: "no closed-form rule and the gate has symbolic parameters".into(),
            });
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Rc::clone(hit));
        }

        let seq: Rc<[Substitute]> = match (arity, gate.matrix()) {
            (1, Some(m)) => {
                let u = Unitary2x2::from_matrix(m).ok_or_else(|| SynthError::Decomposition {
                    tag: gate.tag(),
                    arity,
                    reason: "matrix shape does not match arity".into(),
                })?;
                match pure_phase(&u, self.atol) {
                    Some(angle) => vec![Substitute::rotation(GateTag::RZ, angle, 0)?].into(),
                    None => euler_substitutes(&u, 0)?.into(),
                }
            }
            (2, Some(m)) => kak_substitutes(m)
                .map_err(|err| match err {
                    SynthError::Decomposition { reason, .. } => SynthError::Decomposition {
                        tag: gate.tag(),
                        arity,
                        reason,
                    },
                    other => other,
                })?
                .into(),
            _ => {
                return Err(SynthError::Decomposition {
                    tag: gate.tag(),
                    arity,
                    reason: "numeric synthesis covers one- and two-qubit gates only".into(),
                });
            }
        };
        debug!(tag = %gate.tag(), arity, len = seq.len(), "synthesized from matrix");
        self.cache.insert(key, Rc::clone(&seq));
        Ok(seq)
    }
}

/// Relative phase of a diagonal `u`, read directly from its entries so that
/// near-degenerate Euler angles are never extracted.
fn pure_phase(u: &Unitary2x2, atol: f64) -> Option<f64> {
    let [a, b, c, d] = u.data;
    if b.norm() > atol || c.norm() > atol {
        return None;
    }
    Some(normalize_angle(d.arg() - a.arg()))
}
