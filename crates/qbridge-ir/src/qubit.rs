//! Qubit and classical bit indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Circuit-local index of a qubit.
///
/// Indices are dense positions into the circuit's register, not framework
/// labels: the first listed qubit of an instruction is the most significant
/// tensor factor of that instruction's matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The index as a `usize`, for addressing arrays and bit positions.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Circuit-local index of a classical bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QubitId(3).to_string(), "q3");
        assert_eq!(ClbitId(0).to_string(), "c0");
    }

    #[test]
    fn test_ordering_follows_index() {
        let mut ids = vec![QubitId(4), QubitId(0), QubitId(2)];
        ids.sort();
        assert_eq!(ids, vec![QubitId(0), QubitId(2), QubitId(4)]);
        assert_eq!(QubitId(7).index(), 7);
    }
}
