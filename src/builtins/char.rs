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

use crate::{
    builtins::BuiltinKind,
    interop,
    runtime::{
        convert,
        Cell,
        Context,
        Direction,
        Narrowing,
        Operator,
        RuntimeError,
        RuntimeResult,
        ScriptType,
        TypeHandle,
        TypeMeta,
    },
};

static META: TypeMeta = TypeMeta::new("Char", BuiltinKind::Char);

/// The descriptor of Unicode scalar values.
///
/// Increment and decrement step to the adjacent scalar value, skipping
/// over the surrogate range. Addition stringifies both operands and
/// concatenates, so a Char operand behaves like a one-character string
/// under `+`. Member dispatch delegates to the interop bridge wrapper of
/// the host `char` type.
pub(super) struct CharType;

impl ScriptType for CharType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::from('\0')),

            [arg] => convert(cx, arg, super::char_type(), Narrowing::Allow),

            _ => Err(RuntimeError::invalid_call(
                super::char_type(),
                "new",
                "expected zero or one argument",
            )),
        }
    }

    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        interop::bridge_type_of::<char>()
            .get()
            .try_dynamic_call(cx, subject, args, direction, name)
    }

    fn try_static_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        interop::bridge_type_of::<char>()
            .get()
            .try_static_call(cx, args, direction, name)
    }

    fn convert_to(
        &self,
        _cx: &mut Context,
        value: &Cell,
        target: TypeHandle,
        _narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(ch) = value.as_char() else {
            return Ok(None);
        };

        match target.kind() {
            BuiltinKind::Int => Ok(Some(Cell::from(ch as i64))),

            _ => Ok(None),
        }
    }

    fn convert_from(
        &self,
        _cx: &mut Context,
        value: &Cell,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(text) = value.as_str() else {
            return Ok(None);
        };

        let mut chars = text.chars();

        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Some(Cell::from(ch))),

            _ => match narrowing {
                Narrowing::Deny => Ok(Some(Cell::from('\0'))),
                Narrowing::Allow => Err(RuntimeError::conversion_of(value, super::char_type())),
            },
        }
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(ch) = operand.as_char() else {
            return Ok(None);
        };

        match op {
            Operator::Inc => match step(ch, 1) {
                Some(next) => Ok(Some(Cell::from(next))),

                None => Err(RuntimeError::invalid_call(
                    super::char_type(),
                    op.host_name(),
                    "no character follows the last code point",
                )),
            },

            Operator::Dec => match step(ch, -1) {
                Some(previous) => Ok(Some(Cell::from(previous))),

                None => Err(RuntimeError::invalid_call(
                    super::char_type(),
                    op.host_name(),
                    "no character precedes the null code point",
                )),
            },

            _ => Ok(None),
        }
    }

    fn try_binary(
        &self,
        cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        if let Operator::Add = op {
            let text = format!("{}{}", lhs.stringify(cx)?, rhs.stringify(cx)?);

            return Ok(Some(Cell::from(text)));
        }

        if matches!(op, Operator::Eq | Operator::Ne) {
            let Some(equal) = equality(lhs, rhs) else {
                return Ok(None);
            };

            return Ok(Some(Cell::from(match op {
                Operator::Eq => equal,
                _ => !equal,
            })));
        }

        let (Some(a), Some(b)) = (lhs.as_char(), rhs.as_char()) else {
            return Ok(None);
        };

        let result = match op {
            Operator::Lt => a < b,
            Operator::Le => a <= b,
            Operator::Gt => a > b,
            Operator::Ge => a >= b,

            _ => return Ok(None),
        };

        Ok(Some(Cell::from(result)))
    }
}

// Char equality accepts another Char, an Int code point, or a
// single-character String on either side. Anything else declines.
fn equality(lhs: &Cell, rhs: &Cell) -> Option<bool> {
    let (ch, other) = match (lhs.as_char(), rhs.as_char()) {
        (Some(a), Some(b)) => return Some(a == b),
        (Some(a), None) => (a, rhs),
        (None, Some(b)) => (b, lhs),
        (None, None) => return None,
    };

    if let Some(int) = other.as_int() {
        return Some(ch as i64 == int);
    }

    let text = other.as_str()?;
    let mut chars = text.chars();

    match (chars.next(), chars.next()) {
        (Some(first), None) => Some(first == ch),
        _ => Some(false),
    }
}

// The adjacent Unicode scalar value in the given direction, skipping the
// surrogate range. None at the ends of the code space.
fn step(ch: char, direction: i64) -> Option<char> {
    let mut code = ch as i64;

    loop {
        code += direction;

        if code < 0 || code > char::MAX as i64 {
            return None;
        }

        if let Some(next) = char::from_u32(code as u32) {
            return Some(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;

    #[test]
    fn test_char_stepping() {
        let mut cx = Context::new();

        assert_eq!(Cell::from('a').increment(&mut cx).unwrap().as_char(), Some('b'));
        assert_eq!(Cell::from('b').decrement(&mut cx).unwrap().as_char(), Some('a'));

        // Stepping skips the surrogate range.
        assert_eq!(
            Cell::from('\u{D7FF}').increment(&mut cx).unwrap().as_char(),
            Some('\u{E000}'),
        );

        assert_eq!(
            Cell::from('\u{E000}').decrement(&mut cx).unwrap().as_char(),
            Some('\u{D7FF}'),
        );

        let error = Cell::from('\0').decrement(&mut cx).unwrap_err();
        assert!(error.is_invalid_call());

        let error = Cell::from(char::MAX).increment(&mut cx).unwrap_err();
        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_char_concatenation() {
        let mut cx = Context::new();

        let text = Cell::from('a').add(&mut cx, &Cell::from('b')).unwrap();
        assert_eq!(text.as_str(), Some("ab"));

        let text = Cell::from('a').add(&mut cx, &Cell::from(1i64)).unwrap();
        assert_eq!(text.as_str(), Some("a1"));
    }

    #[test]
    fn test_char_comparison() {
        let mut cx = Context::new();

        let less = Cell::from('a').less(&mut cx, &Cell::from('b')).unwrap();
        assert_eq!(less.as_bool(), Some(true));

        let equal = Cell::from('a').equal(&mut cx, &Cell::from('a')).unwrap();
        assert_eq!(equal.as_bool(), Some(true));
    }

    #[test]
    fn test_char_equality_accepts_codes_and_strings() {
        let mut cx = Context::new();

        let equal = Cell::from('A').equal(&mut cx, &Cell::from(65i64)).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let equal = Cell::from(65i64).equal(&mut cx, &Cell::from('A')).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let equal = Cell::from('A').equal(&mut cx, &Cell::from("A")).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let unequal = Cell::from('A')
            .not_equal(&mut cx, &Cell::from("AB"))
            .unwrap();
        assert_eq!(unequal.as_bool(), Some(true));
    }

    #[test]
    fn test_char_conversions() {
        let mut cx = Context::new();

        let code = convert(
            &mut cx,
            &Cell::from('A'),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(code.as_int(), Some(65));

        let ch = convert(
            &mut cx,
            &Cell::from("x"),
            builtins::char_type(),
            Narrowing::Allow,
        )
        .unwrap();
        assert_eq!(ch.as_char(), Some('x'));

        let error = convert(
            &mut cx,
            &Cell::from("xy"),
            builtins::char_type(),
            Narrowing::Allow,
        )
        .unwrap_err();
        assert!(error.is_conversion());

        let default = convert(
            &mut cx,
            &Cell::from("xy"),
            builtins::char_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(default.as_char(), Some('\0'));
    }
}
