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
    runtime::{
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

static META: TypeMeta = TypeMeta::new("Null", BuiltinKind::Null);

/// The descriptor of the null value.
///
/// Null is absorbing: member reads on null yield null, unary operators
/// yield null, and the arithmetic and bitwise binary operators pass the
/// other operand through unchanged (see
/// [ops](crate::runtime::ops)). For ordering, null is the unique
/// minimum of the value universe, while equality holds between null and
/// null only.
pub(super) struct NullType;

impl ScriptType for NullType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, _cx: &mut Context, _args: &mut [Cell]) -> RuntimeResult<Cell> {
        Ok(Cell::null())
    }

    fn try_dynamic_call(
        &self,
        _cx: &mut Context,
        _subject: &Cell,
        _args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        match direction {
            Direction::Get => Ok(Cell::null()),

            Direction::Set => Err(RuntimeError::invalid_call(
                super::null_type(),
                name,
                "cannot set a member of the null value",
            )),
        }
    }

    fn try_static_call(
        &self,
        _cx: &mut Context,
        _args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        match direction {
            Direction::Get => Ok(Cell::null()),

            Direction::Set => Err(RuntimeError::invalid_call(
                super::null_type(),
                name,
                "cannot set a static member of the Null type",
            )),
        }
    }

    fn convert_to(
        &self,
        _cx: &mut Context,
        _value: &Cell,
        target: TypeHandle,
        _narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        let converted = match target.kind() {
            BuiltinKind::Bool => Cell::from(false),
            BuiltinKind::Int => Cell::from(0i64),
            BuiltinKind::Real => Cell::from(0.0f64),
            BuiltinKind::Char => Cell::from('\0'),

            _ => return Ok(None),
        };

        Ok(Some(converted))
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        _op: Operator,
        _operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(Some(Cell::null()))
    }

    fn try_binary(
        &self,
        _cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        // The receiver descriptor guarantees that at least one operand is
        // null. The arithmetic and bitwise operators never reach this
        // hook because the dispatch driver absorbs them beforehand.
        let result = match op {
            Operator::Eq => lhs.is_null() && rhs.is_null(),
            Operator::Ne => !(lhs.is_null() && rhs.is_null()),
            Operator::Lt => lhs.is_null() && !rhs.is_null(),
            Operator::Le => lhs.is_null(),
            Operator::Gt => !lhs.is_null() && rhs.is_null(),
            Operator::Ge => rhs.is_null(),

            _ => return Ok(None),
        };

        Ok(Some(Cell::from(result)))
    }
}
