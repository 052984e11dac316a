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

static META: TypeMeta = TypeMeta::new("Real", BuiltinKind::Real);

/// The descriptor of 64-bit floating point numbers.
///
/// Arithmetic follows IEEE 754 (division by zero produces an infinity,
/// not an error). Conversion to Int truncates toward zero; a value
/// outside the Int range, the non-finite values included, converts to
/// zero when narrowing is denied and fails when narrowing is allowed.
/// Member dispatch delegates to the interop bridge wrapper of the host
/// `f64` type.
pub(super) struct RealType;

impl ScriptType for RealType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::from(0.0f64)),

            [arg] => convert(cx, arg, super::real_type(), Narrowing::Allow),

            _ => Err(RuntimeError::invalid_call(
                super::real_type(),
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
        interop::bridge_type_of::<f64>()
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
        interop::bridge_type_of::<f64>()
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
        let Some(real) = value.as_real() else {
            return Ok(None);
        };

        match target.kind() {
            BuiltinKind::Int => match cast::i64(real.trunc()) {
                Ok(int) => Ok(Some(Cell::from(int))),

                // Out of the Int range, the non-finite values included.
                Err(_) => match narrowing {
                    Narrowing::Deny => Ok(Some(Cell::from(0i64))),
                    Narrowing::Allow => Err(RuntimeError::conversion_of(value, target)),
                },
            },

            BuiltinKind::Bool if narrowing.is_allowed() => Ok(Some(Cell::from(real != 0.0))),

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

        match text.trim().parse::<f64>() {
            Ok(real) => Ok(Some(Cell::from(real))),

            Err(_) => match narrowing {
                Narrowing::Deny => Ok(Some(Cell::from(0.0f64))),
                Narrowing::Allow => Err(RuntimeError::conversion_of(value, super::real_type())),
            },
        }
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(real) = operand.as_real() else {
            return Ok(None);
        };

        let result = match op {
            Operator::Neg => -real,
            Operator::Inc => real + 1.0,
            Operator::Dec => real - 1.0,

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
    fn test_real_arithmetic() {
        let mut cx = Context::new();

        let sum = Cell::from(0.5f64).add(&mut cx, &Cell::from(0.25f64)).unwrap();
        assert_eq!(sum.as_real(), Some(0.75));

        let quotient = Cell::from(1.0f64).div(&mut cx, &Cell::from(0.0f64)).unwrap();
        assert_eq!(quotient.as_real(), Some(f64::INFINITY));

        let negated = Cell::from(2.5f64).negate(&mut cx).unwrap();
        assert_eq!(negated.as_real(), Some(-2.5));

        let incremented = Cell::from(2.5f64).increment(&mut cx).unwrap();
        assert_eq!(incremented.as_real(), Some(3.5));
    }

    #[test]
    fn test_real_truncation() {
        let mut cx = Context::new();

        let int = convert(
            &mut cx,
            &Cell::from(2.9f64),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(int.as_int(), Some(2));

        let int = convert(
            &mut cx,
            &Cell::from(-2.9f64),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(int.as_int(), Some(-2));

        let zero = convert(
            &mut cx,
            &Cell::from(f64::NAN),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(zero.as_int(), Some(0));

        let error = convert(
            &mut cx,
            &Cell::from(f64::INFINITY),
            builtins::int_type(),
            Narrowing::Allow,
        )
        .unwrap_err();
        assert!(error.is_conversion());

        // Finite values beyond the Int range follow the non-finite rule
        // instead of saturating.
        let zero = convert(
            &mut cx,
            &Cell::from(1e30f64),
            builtins::int_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(zero.as_int(), Some(0));

        let error = convert(
            &mut cx,
            &Cell::from(-1e30f64),
            builtins::int_type(),
            Narrowing::Allow,
        )
        .unwrap_err();
        assert!(error.is_conversion());
    }

    #[test]
    fn test_real_parse() {
        let mut cx = Context::new();

        let real = convert(
            &mut cx,
            &Cell::from("2.5"),
            builtins::real_type(),
            Narrowing::Allow,
        )
        .unwrap();
        assert_eq!(real.as_real(), Some(2.5));

        let zero = convert(
            &mut cx,
            &Cell::from("not a number"),
            builtins::real_type(),
            Narrowing::Deny,
        )
        .unwrap();
        assert_eq!(zero.as_real(), Some(0.0));
    }
}
