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

static META: TypeMeta = TypeMeta::new("Bool", BuiltinKind::Bool);

/// The descriptor of boolean values.
///
/// Ones-complement, unary negation, and logical-not all compute the same
/// logical inversion. This is a deliberate alias, not three distinct
/// operators. Construction coerces the single argument through the
/// conversion protocol with narrowing allowed, so `Bool(value)` succeeds
/// for any non-null value.
pub(super) struct BoolType;

impl ScriptType for BoolType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::from(false)),

            [arg] => convert(cx, arg, super::bool_type(), Narrowing::Allow),

            _ => Err(RuntimeError::invalid_call(
                super::bool_type(),
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
        interop::bridge_type_of::<bool>()
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
        interop::bridge_type_of::<bool>()
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
        let Some(flag) = value.as_bool() else {
            return Ok(None);
        };

        match target.kind() {
            BuiltinKind::Int => Ok(Some(Cell::from(flag as i64))),
            BuiltinKind::Real => Ok(Some(Cell::from(flag as i64 as f64))),

            _ => Ok(None),
        }
    }

    fn convert_from(
        &self,
        _cx: &mut Context,
        value: &Cell,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        if let Some(text) = value.as_str() {
            let text = text.trim();

            if text.eq_ignore_ascii_case("true") {
                return Ok(Some(Cell::from(true)));
            }

            if text.eq_ignore_ascii_case("false") {
                return Ok(Some(Cell::from(false)));
            }

            return match narrowing {
                Narrowing::Deny => Ok(Some(Cell::from(false))),
                Narrowing::Allow => Err(RuntimeError::conversion_of(value, super::bool_type())),
            };
        }

        // Boolean coercion of an arbitrary non-null value is a narrowing
        // conversion that always produces true.
        match narrowing {
            Narrowing::Allow if !value.is_null() => Ok(Some(Cell::from(true))),
            _ => Ok(None),
        }
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(flag) = operand.as_bool() else {
            return Ok(None);
        };

        match op {
            Operator::Neg | Operator::Not | Operator::BitNot => Ok(Some(Cell::from(!flag))),

            _ => Ok(None),
        }
    }

    fn try_binary(
        &self,
        _cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let (Some(a), Some(b)) = (lhs.as_bool(), rhs.as_bool()) else {
            return Ok(None);
        };

        let result = match op {
            Operator::BitAnd => a && b,
            Operator::BitOr => a || b,
            Operator::BitXor => a ^ b,
            Operator::Eq => a == b,
            Operator::Ne => a != b,

            _ => return Ok(None),
        };

        Ok(Some(Cell::from(result)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        builtins,
        runtime::{Cell, Context},
    };

    #[test]
    fn test_bool_inversion_aliases() {
        let mut cx = Context::new();

        let value = Cell::from(true);

        assert_eq!(value.negate(&mut cx).unwrap().as_bool(), Some(false));
        assert_eq!(value.logical_not(&mut cx).unwrap().as_bool(), Some(false));
        assert_eq!(value.bit_not(&mut cx).unwrap().as_bool(), Some(false));
    }

    #[test]
    fn test_bool_logic() {
        let mut cx = Context::new();

        let yes = Cell::from(true);
        let no = Cell::from(false);

        assert_eq!(yes.bit_and(&mut cx, &no).unwrap().as_bool(), Some(false));
        assert_eq!(yes.bit_or(&mut cx, &no).unwrap().as_bool(), Some(true));
        assert_eq!(yes.bit_xor(&mut cx, &yes).unwrap().as_bool(), Some(false));
        assert_eq!(yes.equal(&mut cx, &yes).unwrap().as_bool(), Some(true));
        assert_eq!(yes.not_equal(&mut cx, &no).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_bool_construction_coerces() {
        let mut cx = Context::new();

        let default = builtins::bool_type().construct(&mut cx, &mut []).unwrap();
        assert_eq!(default.as_bool(), Some(false));

        let from_int = builtins::bool_type()
            .construct(&mut cx, &mut [Cell::from(5i64)])
            .unwrap();
        assert_eq!(from_int.as_bool(), Some(true));

        let from_text = builtins::bool_type()
            .construct(&mut cx, &mut [Cell::from(" False ")])
            .unwrap();
        assert_eq!(from_text.as_bool(), Some(false));

        let from_list = builtins::bool_type()
            .construct(&mut cx, &mut [Cell::from(vec![Cell::from(1i64)])])
            .unwrap();
        assert_eq!(from_list.as_bool(), Some(true));

        let from_null = builtins::bool_type()
            .construct(&mut cx, &mut [Cell::null()])
            .unwrap();
        assert_eq!(from_null.as_bool(), Some(false));
    }
}
