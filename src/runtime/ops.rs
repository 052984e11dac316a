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

//! Operator dispatch.
//!
//! The dispatch drivers in this module route the unary and binary
//! operators of [Cell] through the operator hooks of the operands' type
//! descriptors, and through the operator member fallback when both hooks
//! decline.

use std::fmt::{Display, Formatter};

use crate::runtime::{Cell, Context, Direction, RuntimeError, RuntimeResult};

/// An operator of the dispatch protocol.
///
/// The first five operators are unary, the rest are binary. Each operator
/// has three spellings: the surface [symbol](Operator::symbol), the
/// canonical host [member name](Operator::host_name) used by the static
/// member fallback, and the parenthesized
/// [script name](Operator::script_name) under which user structures
/// overload it.
///
/// ```
/// use altair::runtime::Operator;
///
/// assert_eq!(Operator::Rem.symbol(), "mod");
/// assert_eq!(Operator::Rem.host_name(), "rem");
/// assert_eq!(Operator::Rem.script_name(), "(mod)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Arithmetic negation `-x`.
    Neg,

    /// Logical complement `not x`.
    Not,

    /// Bitwise complement `~x`.
    BitNot,

    /// Increment `x++`.
    Inc,

    /// Decrement `x--`.
    Dec,

    /// Addition `x + y`.
    Add,

    /// Subtraction `x - y`.
    Sub,

    /// Multiplication `x * y`.
    Mul,

    /// Division `x / y`.
    Div,

    /// Remainder `x mod y`.
    Rem,

    /// Bitwise conjunction `x & y`.
    BitAnd,

    /// Bitwise disjunction `x | y`.
    BitOr,

    /// Bitwise exclusive disjunction `x ^ y`.
    BitXor,

    /// Equality `x == y`.
    Eq,

    /// Inequality `x != y`.
    Ne,

    /// Strict order `x < y`.
    Lt,

    /// Non-strict order `x <= y`.
    Le,

    /// Inverted strict order `x > y`.
    Gt,

    /// Inverted non-strict order `x >= y`.
    Ge,
}

impl Display for Operator {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.symbol())
    }
}

impl Operator {
    /// The surface syntax of this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
            Self::BitNot => "~",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "mod",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The canonical member name under which a host type exposes this
    /// operator as a static function.
    pub fn host_name(&self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Not => "not",
            Self::BitNot => "bitnot",
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "rem",
            Self::BitAnd => "bitand",
            Self::BitOr => "bitor",
            Self::BitXor => "bitxor",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }

    /// The parenthesized member name under which a script structure
    /// overloads this operator. Unary negation is spelled `(-.)` to keep
    /// it distinct from binary subtraction.
    pub fn script_name(&self) -> &'static str {
        match self {
            Self::Neg => "(-.)",
            Self::Not => "(not)",
            Self::BitNot => "(~)",
            Self::Inc => "(++)",
            Self::Dec => "(--)",
            Self::Add => "(+)",
            Self::Sub => "(-)",
            Self::Mul => "(*)",
            Self::Div => "(/)",
            Self::Rem => "(mod)",
            Self::BitAnd => "(&)",
            Self::BitOr => "(|)",
            Self::BitXor => "(^)",
            Self::Eq => "(==)",
            Self::Ne => "(!=)",
            Self::Lt => "(<)",
            Self::Le => "(<=)",
            Self::Gt => "(>)",
            Self::Ge => "(>=)",
        }
    }

    /// Returns true if this operator takes a single operand.
    #[inline(always)]
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::Neg | Self::Not | Self::BitNot | Self::Inc | Self::Dec,
        )
    }

    /// Returns true for the six comparison operators.
    #[inline(always)]
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge,
        )
    }

    // The arithmetic and bitwise binary operators pass a null operand
    // through unchanged instead of consulting the descriptors.
    #[inline(always)]
    pub(crate) fn absorbs_null(&self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Rem
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor,
        )
    }
}

// Applies a unary operator.
//
// The operand's descriptor hook is consulted first. If it declines, the
// operator degrades to a member call, and if no member matches either,
// the operator fails with a NotApplicable error.
pub(crate) fn unary(cx: &mut Context, op: Operator, operand: &Cell) -> RuntimeResult<Cell> {
    if let Some(result) = operand.ty().get().try_unary(cx, op, operand)? {
        return Ok(result);
    }

    if let Some(result) = unary_member(cx, op, operand)? {
        return Ok(result);
    }

    Err(RuntimeError::not_applicable_unary(op, operand.ty()))
}

// Applies a binary operator.
//
// The driver settles null absorption and reference identity without
// consulting the descriptors. Otherwise the left operand's hook is
// consulted first, then the right operand's hook with the operand order
// preserved, then the member fallback.
pub(crate) fn binary(
    cx: &mut Context,
    op: Operator,
    lhs: &Cell,
    rhs: &Cell,
) -> RuntimeResult<Cell> {
    if op.absorbs_null() {
        match (lhs.is_null(), rhs.is_null()) {
            (true, true) => return Ok(Cell::null()),
            (true, false) => return Ok(rhs.clone()),
            (false, true) => return Ok(lhs.clone()),
            (false, false) => (),
        }
    }

    // Two handles to the same list, hash, structure, or foreign object
    // compare equal regardless of content.
    if lhs.ty() == rhs.ty() && lhs.same_identity(rhs) {
        match op {
            Operator::Eq => return Ok(Cell::from(true)),
            Operator::Ne => return Ok(Cell::from(false)),
            _ => (),
        }
    }

    if let Some(result) = lhs.ty().get().try_binary(cx, op, lhs, rhs)? {
        return Ok(result);
    }

    if lhs.ty() != rhs.ty() {
        if let Some(result) = rhs.ty().get().try_binary(cx, op, lhs, rhs)? {
            return Ok(result);
        }
    }

    if let Some(result) = binary_member(cx, op, lhs, rhs)? {
        return Ok(result);
    }

    Err(RuntimeError::not_applicable_binary(op, lhs.ty(), rhs.ty()))
}

// The member fallback of the unary driver: a static member on the
// operand's type under the host name with the operand as the argument,
// then an instance member on the operand under the script name.
//
// An InvalidCall from a probe means the member does not exist and reads
// as a decline. Other errors propagate.
fn unary_member(cx: &mut Context, op: Operator, operand: &Cell) -> RuntimeResult<Option<Cell>> {
    let mut args = [operand.clone()];

    match operand
        .ty()
        .static_call(cx, &mut args, Direction::Get, op.host_name())
    {
        Ok(result) => return Ok(Some(result)),
        Err(error) if error.is_invalid_call() => (),
        Err(error) => return Err(error),
    }

    match operand.dynamic_call(cx, &mut [], Direction::Get, op.script_name()) {
        Ok(result) => Ok(Some(result)),
        Err(error) if error.is_invalid_call() => Ok(None),
        Err(error) => Err(error),
    }
}

// The member fallback of the binary driver: a static member under the
// host name on the left operand's type, then on the right operand's
// type, with both operands as arguments in source order, then an
// instance member on the left operand under the script name with the
// right operand as the argument.
fn binary_member(
    cx: &mut Context,
    op: Operator,
    lhs: &Cell,
    rhs: &Cell,
) -> RuntimeResult<Option<Cell>> {
    let mut args = [lhs.clone(), rhs.clone()];

    match lhs
        .ty()
        .static_call(cx, &mut args, Direction::Get, op.host_name())
    {
        Ok(result) => return Ok(Some(result)),
        Err(error) if error.is_invalid_call() => (),
        Err(error) => return Err(error),
    }

    if lhs.ty() != rhs.ty() {
        let mut args = [lhs.clone(), rhs.clone()];

        match rhs
            .ty()
            .static_call(cx, &mut args, Direction::Get, op.host_name())
        {
            Ok(result) => return Ok(Some(result)),
            Err(error) if error.is_invalid_call() => (),
            Err(error) => return Err(error),
        }
    }

    let mut args = [rhs.clone()];

    match lhs.dynamic_call(cx, &mut args, Direction::Get, op.script_name()) {
        Ok(result) => Ok(Some(result)),
        Err(error) if error.is_invalid_call() => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_spellings() {
        assert_eq!(Operator::Neg.symbol(), "-");
        assert_eq!(Operator::Neg.script_name(), "(-.)");
        assert_eq!(Operator::Sub.symbol(), "-");
        assert_eq!(Operator::Sub.script_name(), "(-)");
        assert_eq!(Operator::BitXor.host_name(), "bitxor");
        assert_eq!(Operator::Ge.symbol(), ">=");
        assert_eq!(Operator::Ge.script_name(), "(>=)");

        assert!(Operator::Inc.is_unary());
        assert!(!Operator::Add.is_unary());
        assert!(Operator::Ne.is_comparison());
        assert!(!Operator::Ne.absorbs_null());
        assert!(Operator::Rem.absorbs_null());
    }

    #[test]
    fn test_null_absorption() {
        let mut cx = Context::new();

        let sum = Cell::from(5i64).add(&mut cx, &Cell::null()).unwrap();
        assert_eq!(sum.as_int(), Some(5));

        let sum = Cell::null().add(&mut cx, &Cell::from(5i64)).unwrap();
        assert_eq!(sum.as_int(), Some(5));

        let quotient = Cell::from(5i64).div(&mut cx, &Cell::null()).unwrap();
        assert_eq!(quotient.as_int(), Some(5));

        let masked = Cell::null().bit_and(&mut cx, &Cell::from(true)).unwrap();
        assert_eq!(masked.as_bool(), Some(true));

        let product = Cell::null().mul(&mut cx, &Cell::null()).unwrap();
        assert!(product.is_null());
    }

    #[test]
    fn test_identity_equality() {
        let mut cx = Context::new();

        let list = Cell::from(vec![Cell::from(1i64), Cell::from(2i64)]);
        let alias = list.clone();

        let equal = list.equal(&mut cx, &alias).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let unequal = list.not_equal(&mut cx, &alias).unwrap();
        assert_eq!(unequal.as_bool(), Some(false));
    }

    #[test]
    fn test_not_applicable() {
        let mut cx = Context::new();

        let error = Cell::hash().less(&mut cx, &Cell::hash()).unwrap_err();

        assert!(error.is_not_applicable());

        assert_eq!(
            error.to_string(),
            "operator '<' is not applicable to operands of types 'Hash' and 'Hash'",
        );
    }
}
