//! Per-locus records produced by the parsing collaborators.
//!
//! A [`Position`] is one genotype call at one coordinate from one analysis
//! source. The reference sequence is represented by the same type with both
//! filter values set to [`FilterValue::NotApplicable`]; only its call matters.
//! [`DuplicatesMarker`] flags reference coordinates inside repetitive regions.

use crate::engine::filter::FilterValue;
use serde::Serialize;
use std::fmt;

/// A call normalised for comparison: degeneracies, no-calls and anything
/// unrecognised collapse to [`Base::N`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Base {
    A,
    C,
    G,
    T,
    N,
}

impl Base {
    /// Normalise a raw call. Lowercase soft-masked bases count as their uppercase base.
    #[inline]
    pub fn from_call(call: char) -> Self {
        match call.to_ascii_uppercase() {
            'A' => Base::A,
            'C' => Base::C,
            'G' => Base::G,
            'T' => Base::T,
            _ => Base::N,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
            Base::N => 'N',
        }
    }

    #[inline]
    pub fn is_n(self) -> bool {
        self == Base::N
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One call at one coordinate from one analysis source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// The literal reported symbol: a base, degeneracy code, `N` (any) or `X` (no call).
    pub call: char,
    /// `call` collapsed onto A/C/G/T/N.
    pub simple_call: Base,
    /// Read depth at this position.
    pub coverage: FilterValue,
    /// Fraction of reads supporting the call.
    pub proportion: FilterValue,
}

/// The reference genome's position; coverage and proportion are not applicable.
pub type ReferencePosition = Position;

impl Position {
    pub fn new(call: char, coverage: FilterValue, proportion: FilterValue) -> Self {
        Position {
            call,
            simple_call: Base::from_call(call),
            coverage,
            proportion,
        }
    }

    /// A reference-style position with no depth information.
    pub fn reference(call: char) -> Self {
        Self::new(call, FilterValue::NotApplicable, FilterValue::NotApplicable)
    }

    /// `true` unless the source reported no call (`X`) or any base (`N`).
    #[inline]
    pub fn is_called(&self) -> bool {
        !matches!(self.call, 'X' | 'N')
    }
}

/// `true` when the reference coordinate lies in a duplicated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DuplicatesMarker(pub bool);

impl DuplicatesMarker {
    /// Duplicates sources encode a duplicated coordinate as the call `'1'`.
    #[inline]
    pub fn from_call(call: char) -> Self {
        DuplicatesMarker(call == '1')
    }

    #[inline]
    pub fn is_duplicated(self) -> bool {
        self.0
    }
}

impl From<&Position> for DuplicatesMarker {
    fn from(position: &Position) -> Self {
        DuplicatesMarker::from_call(position.call)
    }
}
