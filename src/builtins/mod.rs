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

//! The closed family of built-in type descriptors.
//!
//! Each descriptor is a stateless process-wide singleton implementing the
//! [ScriptType](crate::runtime::ScriptType) protocol with type-specific
//! coercion and operator rules. The scalar descriptors (Bool, Int, Real,
//! Char, String) delegate member dispatch to the
//! [interop bridge](crate::interop) wrappers of the equivalent host
//! primitive types, while the container descriptors (List, Hash) and the
//! [structure](structure) descriptor family implement their member tables
//! directly.
//!
//! The [kind tag](BuiltinKind) attached to every descriptor drives fast
//! `match`-style dispatch and descriptor equality for the closed family.

mod boolean;
mod char;
mod int;
mod list;
mod null;
mod real;
mod string;

pub(crate) mod hash;

pub mod structure;

use crate::{
    interop,
    runtime::{Cell, Operator, RuntimeError, RuntimeResult, TypeHandle},
};

/// The kind tag of a type descriptor.
///
/// Every descriptor of the closed built-in family carries its own tag;
/// the interop bridge descriptors all carry [None](BuiltinKind::None).
/// Descriptor equality compares tags first and falls back to the
/// symmetric double-dispatch protocol only for the open families (see
/// [TypeHandle](crate::runtime::TypeHandle)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// An interop bridge descriptor wrapping a host type.
    None,

    /// The [Null type](null_type).
    Null,

    /// The [Bool type](bool_type).
    Bool,

    /// The [Int type](int_type).
    Int,

    /// The [Real type](real_type).
    Real,

    /// The [Char type](char_type).
    Char,

    /// The [String type](string_type).
    String,

    /// The [List type](list_type).
    List,

    /// The [Hash type](hash_type).
    Hash,

    /// A [structure](structure) descriptor.
    Structure,
}

impl BuiltinKind {
    /// Returns true if descriptors of this kind form an open-ended family
    /// where the tag alone cannot settle descriptor equality.
    #[inline(always)]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::None | Self::Structure)
    }
}

/// The Null type descriptor.
#[inline(always)]
pub fn null_type() -> TypeHandle {
    TypeHandle::new(&null::NullType)
}

/// The Bool type descriptor.
#[inline(always)]
pub fn bool_type() -> TypeHandle {
    TypeHandle::new(&boolean::BoolType)
}

/// The Int type descriptor.
#[inline(always)]
pub fn int_type() -> TypeHandle {
    TypeHandle::new(&int::IntType)
}

/// The Real type descriptor.
#[inline(always)]
pub fn real_type() -> TypeHandle {
    TypeHandle::new(&real::RealType)
}

/// The Char type descriptor.
#[inline(always)]
pub fn char_type() -> TypeHandle {
    TypeHandle::new(&char::CharType)
}

/// The String type descriptor.
#[inline(always)]
pub fn string_type() -> TypeHandle {
    TypeHandle::new(&string::StringType)
}

/// The List type descriptor.
#[inline(always)]
pub fn list_type() -> TypeHandle {
    TypeHandle::new(&list::ListType)
}

/// The Hash type descriptor.
#[inline(always)]
pub fn hash_type() -> TypeHandle {
    TypeHandle::new(&hash::HashType)
}

// A numeric operand view shared by the Int and Real operator hooks.
//
// The numeric operators accept Int, Real, a bridge value wrapping one of
// the host numeric primitives, and (for comparisons) null as zero.
// Everything else makes the hook decline.
#[derive(Clone, Copy)]
pub(super) enum Num {
    Int(i64),
    Real(f64),
}

impl Num {
    #[inline(always)]
    pub(super) fn as_real(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Real(value) => value,
        }
    }
}

pub(super) fn probe_num(value: &Cell, null_as_zero: bool) -> Option<Num> {
    if let Some(int) = value.as_int() {
        return Some(Num::Int(int));
    }

    if let Some(real) = value.as_real() {
        return Some(Num::Real(real));
    }

    if let Some(int) = value.foreign_ref::<i64>() {
        return Some(Num::Int(*int));
    }

    if let Some(real) = value.foreign_ref::<f64>() {
        return Some(Num::Real(*real));
    }

    if null_as_zero && value.is_null() {
        return Some(Num::Int(0));
    }

    None
}

// The shared binary operator core of the Int and Real descriptors.
//
// Equality and inequality probe strictly (a null operand makes the hook
// decline, so that `null == 0` is false), while the order comparisons
// accept null as zero. Integer pairings stay in wrapping 64-bit
// arithmetic; any Real operand promotes the computation to floating
// point, where the bitwise operators decline.
pub(super) fn numeric_binary(
    op: Operator,
    lhs: &Cell,
    rhs: &Cell,
) -> RuntimeResult<Option<Cell>> {
    let strict = matches!(op, Operator::Eq | Operator::Ne);
    let null_as_zero = op.is_comparison() && !strict;

    let (Some(a), Some(b)) = (
        probe_num(lhs, null_as_zero),
        probe_num(rhs, null_as_zero),
    ) else {
        return Ok(None);
    };

    match (a, b) {
        (Num::Int(a), Num::Int(b)) => int_binary(op, a, b),
        (a, b) => Ok(real_binary(op, a.as_real(), b.as_real())),
    }
}

fn int_binary(op: Operator, a: i64, b: i64) -> RuntimeResult<Option<Cell>> {
    if matches!(op, Operator::Div | Operator::Rem) && b == 0 {
        return Err(RuntimeError::invalid_call(
            int_type(),
            op.host_name(),
            "division by zero",
        ));
    }

    let result = match op {
        Operator::Add => Cell::from(a.wrapping_add(b)),
        Operator::Sub => Cell::from(a.wrapping_sub(b)),
        Operator::Mul => Cell::from(a.wrapping_mul(b)),
        Operator::Div => Cell::from(a.wrapping_div(b)),
        Operator::Rem => Cell::from(a.wrapping_rem(b)),

        Operator::BitAnd => Cell::from(a & b),
        Operator::BitOr => Cell::from(a | b),
        Operator::BitXor => Cell::from(a ^ b),

        Operator::Eq => Cell::from(a == b),
        Operator::Ne => Cell::from(a != b),
        Operator::Lt => Cell::from(a < b),
        Operator::Le => Cell::from(a <= b),
        Operator::Gt => Cell::from(a > b),
        Operator::Ge => Cell::from(a >= b),

        _ => return Ok(None),
    };

    Ok(Some(result))
}

fn real_binary(op: Operator, a: f64, b: f64) -> Option<Cell> {
    let result = match op {
        Operator::Add => Cell::from(a + b),
        Operator::Sub => Cell::from(a - b),
        Operator::Mul => Cell::from(a * b),
        Operator::Div => Cell::from(a / b),
        Operator::Rem => Cell::from(a % b),

        Operator::Eq => Cell::from(a == b),
        Operator::Ne => Cell::from(a != b),
        Operator::Lt => Cell::from(a < b),
        Operator::Le => Cell::from(a <= b),
        Operator::Gt => Cell::from(a > b),
        Operator::Ge => Cell::from(a >= b),

        _ => return None,
    };

    Some(result)
}

pub(super) fn unknown_member(ty: TypeHandle, name: &str, table: &[&str]) -> RuntimeError {
    match interop::closest(name, table.iter().copied()) {
        Some(suggestion) => RuntimeError::invalid_call(
            ty,
            name,
            format!("unknown member. Did you mean '{suggestion}'?"),
        ),

        None => RuntimeError::invalid_call(ty, name, "unknown member"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(null_type().kind(), BuiltinKind::Null);
        assert_eq!(bool_type().kind(), BuiltinKind::Bool);
        assert_eq!(int_type().kind(), BuiltinKind::Int);
        assert_eq!(real_type().kind(), BuiltinKind::Real);
        assert_eq!(char_type().kind(), BuiltinKind::Char);
        assert_eq!(string_type().kind(), BuiltinKind::String);
        assert_eq!(list_type().kind(), BuiltinKind::List);
        assert_eq!(hash_type().kind(), BuiltinKind::Hash);

        assert!(!BuiltinKind::Int.is_open());
        assert!(BuiltinKind::None.is_open());
        assert!(BuiltinKind::Structure.is_open());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(null_type().name(), "Null");
        assert_eq!(bool_type().name(), "Bool");
        assert_eq!(int_type().name(), "Int");
        assert_eq!(real_type().name(), "Real");
        assert_eq!(char_type().name(), "Char");
        assert_eq!(string_type().name(), "String");
        assert_eq!(list_type().name(), "List");
        assert_eq!(hash_type().name(), "Hash");
    }

    #[test]
    fn test_numeric_probe() {
        assert!(matches!(
            probe_num(&Cell::from(3i64), false),
            Some(Num::Int(3)),
        ));

        assert!(matches!(
            probe_num(&Cell::from(0.5f64), false),
            Some(Num::Real(value)) if value == 0.5,
        ));

        assert!(matches!(
            probe_num(&Cell::foreign(7i64), false),
            Some(Num::Int(7)),
        ));

        assert!(probe_num(&Cell::null(), false).is_none());
        assert!(matches!(probe_num(&Cell::null(), true), Some(Num::Int(0))));
        assert!(probe_num(&Cell::from(true), true).is_none());
        assert!(probe_num(&Cell::from("5"), true).is_none());
    }

    #[test]
    fn test_numeric_binary_promotion() {
        let product = numeric_binary(Operator::Mul, &Cell::from(2i64), &Cell::from(0.5f64))
            .unwrap()
            .unwrap();

        assert_eq!(product.as_real(), Some(1.0));

        let masked = numeric_binary(Operator::BitAnd, &Cell::from(6i64), &Cell::from(3i64))
            .unwrap()
            .unwrap();

        assert_eq!(masked.as_int(), Some(2));

        // Bitwise operators decline on floating point operands.
        let declined =
            numeric_binary(Operator::BitAnd, &Cell::from(6i64), &Cell::from(0.5f64)).unwrap();

        assert!(declined.is_none());

        // Strict equality declines on null operands, order comparisons
        // accept null as zero.
        let declined = numeric_binary(Operator::Eq, &Cell::from(0i64), &Cell::null()).unwrap();
        assert!(declined.is_none());

        let less = numeric_binary(Operator::Lt, &Cell::from(-1i64), &Cell::null())
            .unwrap()
            .unwrap();

        assert_eq!(less.as_bool(), Some(true));
    }
}
