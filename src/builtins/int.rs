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

static META: TypeMeta = TypeMeta::new("Int", BuiltinKind::Int);

/// The descriptor of 64-bit signed integers.
///
/// Arithmetic wraps on overflow. Division and remainder by an integer
/// zero fail with an
/// [InvalidCall](crate::runtime::RuntimeError::InvalidCall) error, while
/// mixed Int/Real pairings promote to floating point arithmetic first.
/// Member dispatch delegates to the interop bridge wrapper of the host
/// `i64` type.
pub(super) struct IntType;

impl ScriptType for IntType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::from(0i64)),

            [arg] => convert(cx, arg, super::int_type(), Narrowing::Allow),

            _ => Err(RuntimeError::invalid_call(
                super::int_type(),
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
        interop::bridge_type_of::<i64>()
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
        interop::bridge_type_of::<i64>()
            .get()
            .try_static_call(cx, args, direction, name)
    }

    fn convert_to(
        &self,
        _cx: &mut Context,
        value: &Cell,
        target: TypeHandle,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(int) = value.as_int() else {
            return Ok(None);
        };

        match target.kind() {
            BuiltinKind::Real => Ok(Some(Cell::from(int as f64))),

            BuiltinKind::Bool if narrowing.is_allowed() => Ok(Some(Cell::from(int != 0))),

            BuiltinKind::Char if narrowing.is_allowed() => {
                match u32::try_from(int).ok().and_then(char::from_u32) {
                    Some(ch) => Ok(Some(Cell::from(ch))),
                    None => Err(RuntimeError::conversion_of(value, target)),
                }
            }

            _ => Ok(None),
        }
    }

    fn convert_from(
        &self,
        _cx: &mut Context,
        value: &Cell,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        if let Some(ch) = value.as_char() {
            return Ok(Some(Cell::from(ch as i64)));
        }

        let Some(text) = value.as_str() else {
            return Ok(None);
        };

        match text.trim().parse::<i64>() {
            Ok(int) => Ok(Some(Cell::from(int))),

            Err(_) => match narrowing {
                Narrowing::Deny => Ok(Some(Cell::from(0i64))),
                Narrowing::Allow => Err(RuntimeError::conversion_of(value, super::int_type())),
            },
        }
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(int) = operand.as_int() else {
            return Ok(None);
        };

        let result = match op {
            Operator::Neg => int.wrapping_neg(),
            Operator::BitNot => !int,
            Operator::Inc => int.wrapping_add(1),
            Operator::Dec => int.wrapping_sub(1),

            _ => return Ok(None),
        };

        Ok(Some(Cell::from(result)))
    }

    fn try_binary(
        &self,
        _cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        super::numeric_binary(op, lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        builtins,
        runtime::{convert, Cell, Context, Narrowing},
    };

    #[test]
    fn test_int_arithmetic() {
        let mut cx = Context::new();

        let sum = Cell::from(2i64).add(&mut cx, &Cell::from(3i64)).unwrap();
        assert_eq!(sum.as_int(), Some(5));

        let product = Cell::from(7i64).mul(&mut cx, &Cell::from(-2i64)).unwrap();
        assert_eq!(product.as_int(), Some(-14));

        let rem = Cell::from(7i64).rem(&mut cx, &Cell::from(3i64)).unwrap();
        assert_eq!(rem.as_int(), Some(1));

        let wrapped = Cell::from(i64::MAX).add(&mut cx, &Cell::from(1i64)).unwrap();
        assert_eq!(wrapped.as_int(), Some(i64::MIN));
    }

    #[test]
    fn test_int_division_by_zero() {
        let mut cx = Context::new();

        let error = Cell::from(1i64).div(&mut cx, &Cell::from(0i64)).unwrap_err();
        assert!(error.is_invalid_call());

        let error = Cell::from(1i64).rem(&mut cx, &Cell::from(0i64)).unwrap_err();
        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_int_real_promotion() {
        let mut cx = Context::new();

        let quotient = Cell::from(1i64).div(&mut cx, &Cell::from(2.0f64)).unwrap();
        assert_eq!(quotient.as_real(), Some(0.5));

        let less = Cell::from(1i64).less(&mut cx, &Cell::from(1.5f64)).unwrap();
        assert_eq!(less.as_bool(), Some(true));
    }

    #[test]
    fn test_int_foreign_numeric_operand() {
        let mut cx = Context::new();

        let sum = Cell::from(2i64).add(&mut cx, &Cell::foreign(3i64)).unwrap();
        assert_eq!(sum.as_int(), Some(5));

        let equal = Cell::from(5i64).equal(&mut cx, &Cell::foreign(5i64)).unwrap();
        assert_eq!(equal.as_bool(), Some(true));
    }

    #[test]
    fn test_int_equality_forbids_null() {
        let mut cx = Context::new();

        // Even though null coerces to zero in order comparisons, `null == 0`
        // is false.
        let equal = Cell::from(0i64).equal(&mut cx, &Cell::null()).unwrap();
        assert_eq!(equal.as_bool(), Some(false));

        let unequal = Cell::from(0i64).not_equal(&mut cx, &Cell::null()).unwrap();
        assert_eq!(unequal.as_bool(), Some(true));

        let less = Cell::from(-1i64).less(&mut cx, &Cell::null()).unwrap();
        assert_eq!(less.as_bool(), Some(true));
    }

    #[test]
    fn test_int_unary() {
        let mut cx = Context::new();

        assert_eq!(Cell::from(5i64).negate(&mut cx).unwrap().as_int(), Some(-5));
        assert_eq!(Cell::from(0i64).bit_not(&mut cx).unwrap().as_int(), Some(-1));
        assert_eq!(Cell::from(5i64).increment(&mut cx).unwrap().as_int(), Some(6));
        assert_eq!(Cell::from(5i64).decrement(&mut cx).unwrap().as_int(), Some(4));

        let error = Cell::from(5i64).logical_not(&mut cx).unwrap_err();
        assert!(error.is_not_applicable());
    }

    #[test]
    fn test_int_conversions() {
        let mut cx = Context::new();

        let int = convert(
            &mut cx,
            &Cell::from(" 42 "),
            builtins::int_type(),
            Narrowing::Allow,
        )
        .unwrap();
        assert_eq!(int.as_int(), Some(42));

        let bool_value = convert(
            &mut cx,
            &Cell::from(5i64),
            builtins::bool_type(),
            Narrowing::Allow,
        )
        .unwrap();
        assert_eq!(bool_value.as_bool(), Some(true));

        // Implicit Int to Bool coercion is rejected.
        let error = convert(
            &mut cx,
            &Cell::from(5i64),
            builtins::bool_type(),
            Narrowing::Deny,
        )
        .unwrap_err();
        assert!(error.is_conversion());

        let ch = convert(
            &mut cx,
            &Cell::from(65i64),
            builtins::char_type(),
            Narrowing::Allow,
        )
        .unwrap();
        assert_eq!(ch.as_char(), Some('A'));

        let error = convert(
            &mut cx,
            &Cell::from(-1i64),
            builtins::char_type(),
            Narrowing::Allow,
        )
        .unwrap_err();
        assert!(error.is_conversion());
    }
}
