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

use crate::runtime::{Cell, Context, RuntimeError, RuntimeResult, TypeHandle};

/// Controls how the conversion protocol treats lossy or fallible
/// conversions (string parsing, real truncation, boolean coercion of
/// arbitrary objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Narrowing {
    /// Narrowing failures degrade to the target type's default value
    /// (`0`, `0.0`, `false`, `""`) instead of raising.
    Deny,

    /// Narrowing failures raise a
    /// [Conversion](crate::runtime::RuntimeError::Conversion) error.
    Allow,
}

impl Narrowing {
    /// Returns true for [Narrowing::Allow].
    #[inline(always)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Converts `value` to the `target` type.
///
/// The algorithm asks up to two descriptors:
///
///  1. If the value's type already equals `target`, the value is returned
///     unchanged. Conversion to the own type is an identity, not a copy.
///  2. Otherwise, the **source** descriptor's
///     [convert_to](crate::runtime::ScriptType::convert_to) hook runs.
///  3. If it declines, the **target** descriptor's
///     [convert_from](crate::runtime::ScriptType::convert_from) hook runs.
///  4. If both decline, the conversion fails with a
///     [Conversion](crate::runtime::RuntimeError::Conversion) error.
///
/// A hook either produces a definite value (a definite null included) or
/// declines; ambiguous results are forbidden by the protocol. Conversion
/// is neither transitive nor symmetric: round-tripping a value through
/// another type is not guaranteed to reproduce it.
///
/// ```
/// use altair::{
///     builtins,
///     runtime::{convert, Cell, Context, Narrowing},
/// };
///
/// let mut cx = Context::new();
///
/// let real = convert(&mut cx, &Cell::from(3i64), builtins::real_type(), Narrowing::Deny)
///     .unwrap();
///
/// assert_eq!(real.as_real(), Some(3.0));
///
/// // A failed narrowing degrades to the target's default when narrowing
/// // is denied...
/// let zero = convert(&mut cx, &Cell::from("abc"), builtins::int_type(), Narrowing::Deny)
///     .unwrap();
///
/// assert_eq!(zero.as_int(), Some(0));
///
/// // ...and raises when narrowing is allowed.
/// let error = convert(&mut cx, &Cell::from("abc"), builtins::int_type(), Narrowing::Allow)
///     .unwrap_err();
///
/// assert!(error.is_conversion());
/// ```
pub fn convert(
    cx: &mut Context,
    value: &Cell,
    target: TypeHandle,
    narrowing: Narrowing,
) -> RuntimeResult<Cell> {
    if value.ty() == target {
        return Ok(value.clone());
    }

    if let Some(converted) = value.ty().get().convert_to(cx, value, target, narrowing)? {
        return Ok(converted);
    }

    if let Some(converted) = target.get().convert_from(cx, value, narrowing)? {
        return Ok(converted);
    }

    Err(RuntimeError::conversion_of(value, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;

    #[test]
    fn test_identity_conversion() {
        let mut cx = Context::new();

        let samples = [
            (Cell::from(5i64), builtins::int_type()),
            (Cell::from(0.5f64), builtins::real_type()),
            (Cell::from(true), builtins::bool_type()),
            (Cell::from('c'), builtins::char_type()),
            (Cell::from("str"), builtins::string_type()),
            (Cell::null(), builtins::null_type()),
            (Cell::from(vec![Cell::from(1i64)]), builtins::list_type()),
            (Cell::hash(), builtins::hash_type()),
        ];

        for (value, target) in samples {
            let converted = convert(&mut cx, &value, target, Narrowing::Deny).unwrap();

            assert_eq!(converted.ty(), value.ty());
            assert_eq!(converted.to_string(), value.to_string());
        }
    }

    #[test]
    fn test_widening_conversions() {
        let mut cx = Context::new();

        let real = convert(
            &mut cx,
            &Cell::from(7i64),
            builtins::real_type(),
            Narrowing::Deny,
        )
        .unwrap();

        assert_eq!(real.as_real(), Some(7.0));

        let string = convert(
            &mut cx,
            &Cell::from(7i64),
            builtins::string_type(),
            Narrowing::Deny,
        )
        .unwrap();

        assert_eq!(string.as_str(), Some("7"));

        let code = convert(
            &mut cx,
            &Cell::from('A'),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();

        assert_eq!(code.as_int(), Some(65));
    }

    #[test]
    fn test_null_stringifies_to_empty() {
        let mut cx = Context::new();

        let string = convert(
            &mut cx,
            &Cell::null(),
            builtins::string_type(),
            Narrowing::Deny,
        )
        .unwrap();

        assert_eq!(string.as_str(), Some(""));
    }

    #[test]
    fn test_unconvertible_pairing_fails() {
        let mut cx = Context::new();

        let error = convert(
            &mut cx,
            &Cell::from(vec![Cell::from(1i64)]),
            builtins::char_type(),
            Narrowing::Allow,
        )
        .unwrap_err();

        assert!(error.is_conversion());
    }
}
