//! Per-framework gate dispatch tables.
//!
//! A table is a bijection between canonical [`GateTag`]s and the native
//! gate identifiers of one framework. Adapters build their table once in a
//! `LazyLock` and share it by `&'static` reference; nothing mutates a table
//! after construction.

use rustc_hash::FxHashMap;

use crate::framework::FrameworkId;
use crate::gate::GateTag;

/// Bidirectional tag <-> native-name map plus the framework capabilities the
/// encode driver needs.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    framework: FrameworkId,
    entries: Vec<(GateTag, &'static str)>,
    by_tag: FxHashMap<GateTag, &'static str>,
    by_native: FxHashMap<&'static str, GateTag>,
    free_parameters: bool,
    implicit_measurement: bool,
}

impl DispatchTable {
    /// Build a table from `(tag, native)` pairs.
    ///
    /// A tag or native name listed twice keeps its first pairing; the
    /// duplicate is reported by [`is_bijective`](Self::is_bijective).
    pub fn new(framework: FrameworkId, entries: &[(GateTag, &'static str)]) -> Self {
        let mut by_tag = FxHashMap::default();
        let mut by_native = FxHashMap::default();
        for &(tag, native) in entries {
            by_tag.entry(tag).or_insert(native);
            by_native.entry(native).or_insert(tag);
        }
        Self {
            framework,
            entries: entries.to_vec(),
            by_tag,
            by_native,
            free_parameters: false,
            implicit_measurement: false,
        }
    }

    /// Declare that the framework can carry unbound parameters.
    pub fn with_free_parameters(mut self, yes: bool) -> Self {
        self.free_parameters = yes;
        self
    }

    /// Declare that the framework measures every qubit implicitly at the end
    /// and has no measurement instruction.
    pub fn with_implicit_measurement(mut self, yes: bool) -> Self {
        self.implicit_measurement = yes;
        self
    }

    /// The framework this table belongs to.
    pub fn framework(&self) -> FrameworkId {
        self.framework
    }

    /// Native identifier for `tag`, if the framework has it natively.
    pub fn native(&self, tag: GateTag) -> Option<&'static str> {
        self.by_tag.get(&tag).copied()
    }

    /// Canonical tag for a native identifier.
    pub fn tag(&self, native: &str) -> Option<GateTag> {
        self.by_native.get(native).copied()
    }

    /// Whether `tag` encodes without decomposition.
    pub fn supports(&self, tag: GateTag) -> bool {
        self.by_tag.contains_key(&tag)
    }

    /// Whether unbound parameters survive encoding.
    pub fn supports_free_parameters(&self) -> bool {
        self.free_parameters
    }

    /// Whether measurement is implicit (and measurement instructions elided).
    pub fn measures_implicitly(&self) -> bool {
        self.implicit_measurement
    }

    /// `(tag, native)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (GateTag, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Whether no tag and no native name was declared twice.
    pub fn is_bijective(&self) -> bool {
        self.by_tag.len() == self.entries.len() && self.by_native.len() == self.entries.len()
    }

    /// Common-core tags this table does not cover.
    pub fn missing_common_core(&self) -> Vec<GateTag> {
        GateTag::COMMON_CORE
            .iter()
            .copied()
            .filter(|t| !self.supports(*t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        let table = DispatchTable::new(
            FrameworkId::IonQ,
            &[(GateTag::H, "h"), (GateTag::CX, "cnot")],
        );
        assert_eq!(table.native(GateTag::CX), Some("cnot"));
        assert_eq!(table.tag("h"), Some(GateTag::H));
        assert!(!table.supports(GateTag::CCX));
        assert!(table.is_bijective());
        assert_eq!(table.missing_common_core().len(), 13);
    }

    #[test]
    fn test_duplicates_detected() {
        let table = DispatchTable::new(
            FrameworkId::Qiskit,
            &[(GateTag::H, "h"), (GateTag::X, "h")],
        );
        assert!(!table.is_bijective());
        assert_eq!(table.tag("h"), Some(GateTag::H));
    }

    #[test]
    fn test_capability_flags() {
        let table = DispatchTable::new(FrameworkId::Braket, &[])
            .with_free_parameters(true)
            .with_implicit_measurement(true);
        assert!(table.supports_free_parameters());
        assert!(table.measures_implicitly());
    }
}
