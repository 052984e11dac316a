////////////////////////////////////////////////////////////////////////////////
// This file is part of "Altair", an embeddable scripting programming         //
// language platform.                                                         //
//                                                                            //
// This work is free software, distributed under the terms of the MIT         //
// license, as published in the LICENSE file of the source code distribution. //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
////////////////////////////////////////////////////////////////////////////////

use std::cmp::Ordering;

use crate::runtime::Cell;

/// A numeric view of a script value, for host callee implementations.
///
/// The view unifies the two script number types and their bridge-wrapped
/// host counterparts, so that a host function declared over
/// [Dynamic](crate::interop::TypeToken::Dynamic) arguments can treat
/// "any number" uniformly:
///
/// ```
/// use altair::{interop::CellNumber, runtime::Cell};
///
/// assert_eq!(CellNumber::of(&Cell::from(7i64)).unwrap().as_f64(), 7.0);
/// assert_eq!(CellNumber::of(&Cell::from(2.5f64)).unwrap().as_i64(), None);
/// assert_eq!(CellNumber::of(&Cell::foreign(3i64)).unwrap().as_i64(), Some(3));
/// assert!(CellNumber::of(&Cell::from("foo")).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellNumber {
    /// An integer number.
    Int(i64),

    /// A floating-point number.
    Real(f64),
}

impl CellNumber {
    /// Reads the numeric payload of `value`, looking through bridge
    /// wrappers of the host `i64` and `f64` types. Returns None if the
    /// value is not a number.
    pub fn of(value: &Cell) -> Option<Self> {
        if let Some(int) = value.as_int() {
            return Some(Self::Int(int));
        }

        if let Some(real) = value.as_real() {
            return Some(Self::Real(real));
        }

        if let Some(int) = value.foreign_ref::<i64>() {
            return Some(Self::Int(*int));
        }

        if let Some(real) = value.foreign_ref::<f64>() {
            return Some(Self::Real(*real));
        }

        None
    }

    /// The value as an integer. Real values round towards zero; returns
    /// None if the value has a fractional part the integer cannot
    /// represent, overflows, or is not finite.
    #[inline(always)]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(int) => Some(int),

            Self::Real(real) => match real.fract() == 0.0 {
                true => cast::i64(real).ok(),
                false => None,
            },
        }
    }

    /// The value as a floating-point number. Integers widen losslessly
    /// in the `f64` sense.
    #[inline(always)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(int) => cast::f64(int),
            Self::Real(real) => real,
        }
    }

    /// The value as an index. Returns None for negative numbers and
    /// non-integral reals.
    #[inline(always)]
    pub fn as_usize(self) -> Option<usize> {
        cast::usize(self.as_i64()?).ok()
    }

    /// Numeric ordering across both representations. Returns None when
    /// either side is a NaN.
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => Some(left.cmp(&right)),
            (left, right) => left.as_f64().partial_cmp(&right.as_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(CellNumber::of(&Cell::from(10i64)), Some(CellNumber::Int(10)));
        assert_eq!(CellNumber::of(&Cell::from(1.5f64)), Some(CellNumber::Real(1.5)));
        assert_eq!(CellNumber::of(&Cell::null()), None);

        assert_eq!(CellNumber::Real(4.0).as_i64(), Some(4));
        assert_eq!(CellNumber::Real(4.5).as_i64(), None);
        assert_eq!(CellNumber::Real(f64::NAN).as_i64(), None);

        assert_eq!(CellNumber::Int(-1).as_usize(), None);
        assert_eq!(CellNumber::Int(3).as_usize(), Some(3));
    }

    #[test]
    fn test_numeric_ordering() {
        assert_eq!(
            CellNumber::Int(2).compare(CellNumber::Real(2.5)),
            Some(Ordering::Less),
        );

        assert_eq!(
            CellNumber::Int(2).compare(CellNumber::Int(2)),
            Some(Ordering::Equal),
        );

        assert_eq!(CellNumber::Int(2).compare(CellNumber::Real(f64::NAN)), None);
    }
}
