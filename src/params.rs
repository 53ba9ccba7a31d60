//! Fixed-length grammatical parameter vectors.
//!
//! A [`ParameterVector`] is exactly [`PARAMETER_COUNT`] bytes. Each byte is a
//! term identifier for one grammatical category position:
//!
//! ```text
//!   0        wildcard ("unknown / don't care")
//!   1..=254  concrete term identifiers
//!   255      explicitly unset (a sentinel, NOT a wildcard)
//! ```
//!
//! Matching is asymmetric: the *pattern* side may wildcard a position with 0,
//! the *candidate* side never does. A 255 in the pattern only matches a 255 in
//! the candidate.

use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of positions in every parameter vector.
pub const PARAMETER_COUNT: usize = 21;

/// Byte value meaning "unknown / wildcard".
pub const WILDCARD: u8 = 0;

/// Byte value meaning "explicitly unset".
pub const UNSET: u8 = 255;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ParameterVector([u8; PARAMETER_COUNT]);

impl ParameterVector {
    /// All positions wildcarded.
    pub const fn wildcard() -> Self {
        ParameterVector([WILDCARD; PARAMETER_COUNT])
    }

    /// Build a vector from a slice, failing unless it has exactly 21 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self, ParameterError> {
        let array: [u8; PARAMETER_COUNT] = bytes
            .try_into()
            .map_err(|_| ParameterError::Length { expected: PARAMETER_COUNT, actual: bytes.len() })?;
        Ok(ParameterVector(array))
    }

    pub fn as_bytes(&self) -> &[u8; PARAMETER_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Result<u8, ParameterError> {
        self.0.get(index).copied().ok_or(ParameterError::IndexOutOfRange { index })
    }

    pub fn set(&mut self, index: usize, value: u8) -> Result<(), ParameterError> {
        let slot = self.0.get_mut(index).ok_or(ParameterError::IndexOutOfRange { index })?;
        *slot = value;
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, index: usize, value: u8) -> Result<Self, ParameterError> {
        self.set(index, value)?;
        Ok(self)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.iter().all(|&b| b == WILDCARD)
    }

    /// Positions holding anything other than the wildcard byte.
    pub fn concrete_positions(&self) -> PositionSet {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != WILDCARD)
            .fold(PositionSet::empty(), |acc, (i, _)| acc | PositionSet::from_bits_retain(1 << i))
    }

    /// Treat `self` as a pattern and test `candidate` against it.
    pub fn matches(&self, candidate: &ParameterVector) -> bool {
        matches(self, candidate)
    }
}

/// Position-wise wildcard match of `candidate` against `pattern`.
///
/// A position matches when the pattern byte is the wildcard or both bytes are
/// equal. The 255 sentinel therefore only matches itself.
pub fn matches(pattern: &ParameterVector, candidate: &ParameterVector) -> bool {
    pattern.0.iter().zip(candidate.0.iter()).all(|(&p, &c)| p == WILDCARD || p == c)
}

impl Default for ParameterVector {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl From<[u8; PARAMETER_COUNT]> for ParameterVector {
    fn from(bytes: [u8; PARAMETER_COUNT]) -> Self {
        ParameterVector(bytes)
    }
}

impl TryFrom<&[u8]> for ParameterVector {
    type Error = ParameterError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl TryFrom<Vec<u8>> for ParameterVector {
    type Error = ParameterError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&bytes)
    }
}

impl From<ParameterVector> for Vec<u8> {
    fn from(value: ParameterVector) -> Self {
        value.0.to_vec()
    }
}

impl fmt::Debug for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterVector{}", self)
    }
}

impl fmt::Display for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match *b {
                WILDCARD => write!(f, "*")?,
                UNSET => write!(f, "-")?,
                v => write!(f, "{v}")?,
            }
        }
        write!(f, "]")
    }
}

bitflags::bitflags! {
    /// A set of parameter positions (bit `i` = position `i`).
    ///
    /// Used by rule projections to declare which child positions are carried
    /// up into the parent vector.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PositionSet: u32 {
        const _ = (1 << PARAMETER_COUNT) - 1;
    }
}

impl PositionSet {
    pub fn single(index: usize) -> Result<Self, ParameterError> {
        if index >= PARAMETER_COUNT {
            return Err(ParameterError::IndexOutOfRange { index });
        }
        Ok(Self::from_bits_retain(1 << index))
    }

    pub fn from_positions<I>(positions: I) -> Result<Self, ParameterError>
    where
        I: IntoIterator<Item = usize>,
    {
        positions.into_iter().try_fold(Self::empty(), |acc, i| Ok(acc | Self::single(i)?))
    }

    pub fn has(&self, index: usize) -> bool {
        index < PARAMETER_COUNT && self.bits() & (1 << index) != 0
    }

    /// Positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..PARAMETER_COUNT).filter(move |&i| self.has(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vector() -> impl Strategy<Value = ParameterVector> {
        proptest::array::uniform21(any::<u8>()).prop_map(ParameterVector::from)
    }

    #[test]
    fn construction_requires_exactly_21_bytes() {
        assert!(ParameterVector::new(&[0; 21]).is_ok());
        assert_eq!(
            ParameterVector::new(&[0; 20]).unwrap_err(),
            ParameterError::Length { expected: 21, actual: 20 }
        );
        assert_eq!(
            ParameterVector::try_from(vec![1; 22]).unwrap_err(),
            ParameterError::Length { expected: 21, actual: 22 }
        );
    }

    #[test]
    fn index_past_20_is_rejected() {
        let mut v = ParameterVector::wildcard();
        assert_eq!(v.get(20), Ok(0));
        assert_eq!(v.get(21), Err(ParameterError::IndexOutOfRange { index: 21 }));
        assert_eq!(v.set(21, 3), Err(ParameterError::IndexOutOfRange { index: 21 }));
        assert!(PositionSet::single(21).is_err());
    }

    #[test]
    fn concrete_positions_skip_wildcards() {
        let v = ParameterVector::wildcard().with(2, 7).unwrap().with(20, UNSET).unwrap();
        let positions: Vec<usize> = v.concrete_positions().positions().collect();
        assert_eq!(positions, vec![2, 20]);
    }

    #[test]
    fn serde_enforces_length() {
        let ok: ParameterVector = serde_json::from_str(&format!("{:?}", vec![0u8; 21])).unwrap();
        assert!(ok.is_wildcard());
        assert!(serde_json::from_str::<ParameterVector>("[1,2,3]").is_err());
    }

    proptest! {
        #[test]
        fn all_wildcard_pattern_matches_everything(candidate in vector()) {
            prop_assert!(matches(&ParameterVector::wildcard(), &candidate));
        }

        #[test]
        fn unset_sentinel_never_wildcards(candidate in vector(), position in 0usize..PARAMETER_COUNT) {
            let pattern = ParameterVector::wildcard().with(position, UNSET).unwrap();
            let expected = candidate.get(position).unwrap() == UNSET;
            prop_assert_eq!(matches(&pattern, &candidate), expected);
        }

        #[test]
        fn every_vector_matches_itself(v in vector()) {
            prop_assert!(v.matches(&v));
        }

        #[test]
        fn concrete_mismatch_fails(v in vector(), position in 0usize..PARAMETER_COUNT, value in 1u8..=254) {
            let pattern = ParameterVector::wildcard().with(position, value).unwrap();
            prop_assert_eq!(pattern.matches(&v), v.get(position).unwrap() == value);
        }
    }
}
