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

use std::{
    fmt::{Debug, Display, Formatter},
    ptr,
};

use crate::{
    builtins::BuiltinKind,
    runtime::{conversion::Narrowing, ops::Operator, Cell, Context, RuntimeResult},
};

/// The call direction of a dynamic or static member dispatch.
///
/// `Get` reads a member (or invokes it); `Set` writes a member. A `Set`
/// dispatch requires at least one argument: the value being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read or invoke the member.
    Get,

    /// Write the member. The stored value is the last argument.
    Set,
}

/// Static metadata of a type descriptor: its canonical name and its
/// built-in kind tag.
///
/// Instances are created in static memory
/// (`static META: TypeMeta = TypeMeta::new("Int", BuiltinKind::Int);`) by
/// the descriptor implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMeta {
    name: &'static str,
    kind: BuiltinKind,
}

impl Display for TypeMeta {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

impl TypeMeta {
    /// Creates the metadata object. Suitable for static initialization.
    #[inline(always)]
    pub const fn new(name: &'static str, kind: BuiltinKind) -> Self {
        Self { name, kind }
    }

    /// The canonical type name, as printed in error messages.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The built-in kind tag. [BuiltinKind::None] for every descriptor
    /// outside the closed built-in family.
    #[inline(always)]
    pub fn kind(&self) -> BuiltinKind {
        self.kind
    }
}

/// The runtime handler of a script type.
///
/// A descriptor is stateless and lives for the process lifetime. Every
/// runtime operation on a [Cell] (construction, member dispatch,
/// conversion, operators) goes through the descriptor attached to it.
///
/// The operator and conversion hooks are "try" operations: they return
/// `Ok(None)` to decline, leaving the resolution chain free to probe the
/// other operand's descriptor or the interop fallback strategies. Hooks
/// must never return a partial result: a successful conversion that
/// produces the null value returns the canonical null cell, not a decline.
pub trait ScriptType: Send + Sync + 'static {
    /// The descriptor's static metadata.
    fn meta(&self) -> &'static TypeMeta;

    /// Constructs a new instance of the type.
    ///
    /// Zero-argument construction always succeeds and yields the
    /// type-appropriate default value. One-argument construction converts
    /// the argument.
    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell>;

    /// Dispatches an instance member call on `subject`.
    ///
    /// The `name` may carry a trailing `\Directive` suffix, and the empty
    /// name addresses the default member (indexer).
    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell>;

    /// Dispatches a type-level member call. There is no subject.
    fn try_static_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell>;

    /// Converts `value` (an instance of this type) to `target`.
    ///
    /// The source descriptor is consulted before the target descriptor.
    /// `Ok(None)` declines.
    #[allow(unused_variables)]
    fn convert_to(
        &self,
        cx: &mut Context,
        value: &Cell,
        target: TypeHandle,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(None)
    }

    /// Converts `value` (an instance of a foreign type) to this type.
    ///
    /// Consulted when the source descriptor has declined. `Ok(None)`
    /// declines.
    #[allow(unused_variables)]
    fn convert_from(
        &self,
        cx: &mut Context,
        value: &Cell,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(None)
    }

    /// Applies a unary operator to `operand`, an instance of this type.
    /// `Ok(None)` declines.
    #[allow(unused_variables)]
    fn try_unary(
        &self,
        cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(None)
    }

    /// Applies a binary operator. The hook is consulted for both operand
    /// positions: first as the left operand's descriptor, then as the
    /// right operand's. `Ok(None)` declines.
    #[allow(unused_variables)]
    fn try_binary(
        &self,
        cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(None)
    }

    /// The symmetric equality hook for the open descriptor families.
    ///
    /// Descriptor equality first compares handle addresses, then the
    /// built-in kind tags. Only when both descriptors belong to an open
    /// family (interop bridge or structure) does equality fall back to
    /// asking the left descriptor and, failing that, the right one.
    #[allow(unused_variables)]
    fn equals_type(&self, other: TypeHandle) -> bool {
        false
    }
}

/// A cheap, copyable handle to a process-wide type descriptor.
///
/// Equality between handles follows the descriptor equality protocol:
/// address identity, then [BuiltinKind] tag comparison for the closed
/// family, then symmetric double-dispatch for bridge and structure
/// descriptors.
///
/// ```
/// use altair::builtins;
///
/// assert_eq!(builtins::int_type(), builtins::int_type());
/// assert_ne!(builtins::int_type(), builtins::real_type());
/// ```
#[derive(Clone, Copy)]
pub struct TypeHandle {
    ty: &'static dyn ScriptType,
}

impl Debug for TypeHandle {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl Display for TypeHandle {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self.ty, other.ty) {
            return true;
        }

        let kind = self.kind();

        if kind != other.kind() {
            return false;
        }

        match kind.is_open() {
            // Distinct descriptors of an open family compare through the
            // symmetric protocol.
            true => self.ty.equals_type(*other) || other.ty.equals_type(*self),

            // The closed family descriptors are singletons. An equal tag
            // means an equal type.
            false => true,
        }
    }
}

impl Eq for TypeHandle {}

impl TypeHandle {
    /// Wraps a `'static` descriptor reference. Suitable for static
    /// initialization.
    #[inline(always)]
    pub const fn new(ty: &'static dyn ScriptType) -> Self {
        Self { ty }
    }

    /// The underlying descriptor.
    #[inline(always)]
    pub fn get(&self) -> &'static dyn ScriptType {
        self.ty
    }

    /// The descriptor's canonical name.
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.ty.meta().name()
    }

    /// The descriptor's built-in kind tag.
    #[inline(always)]
    pub fn kind(&self) -> BuiltinKind {
        self.ty.meta().kind()
    }

    /// Constructs an instance of the type. See
    /// [ScriptType::try_construct].
    #[inline(always)]
    pub fn construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        self.ty.try_construct(cx, args)
    }

    /// Dispatches a type-level member call. See
    /// [ScriptType::try_static_call].
    #[inline(always)]
    pub fn static_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        self.ty.try_static_call(cx, args, direction, name)
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins;

    #[test]
    fn test_handle_equality_is_tag_based_for_builtins() {
        assert_eq!(builtins::int_type(), builtins::int_type());
        assert_eq!(builtins::null_type(), builtins::null_type());
        assert_ne!(builtins::int_type(), builtins::real_type());
        assert_ne!(builtins::list_type(), builtins::hash_type());
    }

    #[test]
    fn test_handle_names() {
        assert_eq!(builtins::int_type().name(), "Int");
        assert_eq!(builtins::string_type().name(), "String");
        assert_eq!(builtins::null_type().name(), "Null");
    }
}
