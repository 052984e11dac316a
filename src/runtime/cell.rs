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
    any::Any,
    fmt::{Debug, Display, Formatter},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use ahash::AHashMap;
use compact_str::CompactString;

use crate::{
    builtins::{self, hash::HashKey, structure::StructInstance, BuiltinKind},
    interop,
    runtime::{
        conversion,
        ident,
        ops,
        Context,
        Direction,
        Narrowing,
        Operator,
        RuntimeError,
        RuntimeResult,
        TypeHandle,
    },
};

// Cycles through self-referential containers are cut off during rendering.
const DISPLAY_DEPTH: usize = 16;

#[inline(always)]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub(crate) enum Payload {
    Void,
    Bool(bool),
    Int(i64),
    Real(f64),
    Char(char),
    Str(CompactString),
    List(Arc<Mutex<Vec<Cell>>>),
    Hash(Arc<Mutex<AHashMap<HashKey, Cell>>>),
    Struct(Arc<StructInstance>),
    Foreign(Arc<dyn Any + Send + Sync>),
}

/// The universal dynamically-typed value of the script runtime.
///
/// A cell is a pair of a payload and the [type descriptor](TypeHandle)
/// that handles it, plus a *type-locked* flag. Type-locked means the
/// value's type was fixed by its producer (a literal, a constructor
/// result) rather than inferred opportunistically. Overload resolution in
/// the interop bridge requires an exact or widening match for type-locked
/// arguments, and may attempt speculative conversion for unlocked ones.
///
/// Cells are value objects: they are cheap to clone and carry no identity
/// beyond their payload and type. The List, Hash, and Structure payloads
/// are shared containers, so a cloned cell aliases the same container
/// (reference semantics); the scalar payloads are copied.
///
/// ```
/// use altair::runtime::Cell;
///
/// let cell = Cell::from(42i64);
///
/// assert_eq!(cell.as_int(), Some(42));
/// assert!(cell.is_type_locked());
/// assert!(!cell.is_null());
/// assert!(Cell::null().is_null());
/// ```
#[derive(Clone)]
pub struct Cell {
    data: Payload,
    ty: TypeHandle,
    locked: bool,
}

impl Default for Cell {
    #[inline(always)]
    fn default() -> Self {
        Self::null()
    }
}

impl From<bool> for Cell {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::from_payload(Payload::Bool(value), builtins::bool_type(), true)
    }
}

impl From<i64> for Cell {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Self::from_payload(Payload::Int(value), builtins::int_type(), true)
    }
}

impl From<i32> for Cell {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self::from(value as i64)
    }
}

impl From<f64> for Cell {
    #[inline(always)]
    fn from(value: f64) -> Self {
        Self::from_payload(Payload::Real(value), builtins::real_type(), true)
    }
}

impl From<char> for Cell {
    #[inline(always)]
    fn from(value: char) -> Self {
        Self::from_payload(Payload::Char(value), builtins::char_type(), true)
    }
}

impl From<&str> for Cell {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::from_payload(
            Payload::Str(CompactString::from(value)),
            builtins::string_type(),
            true,
        )
    }
}

impl From<String> for Cell {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::from_payload(
            Payload::Str(CompactString::from(value)),
            builtins::string_type(),
            true,
        )
    }
}

impl From<CompactString> for Cell {
    #[inline(always)]
    fn from(value: CompactString) -> Self {
        Self::from_payload(Payload::Str(value), builtins::string_type(), true)
    }
}

impl From<Vec<Cell>> for Cell {
    #[inline(always)]
    fn from(value: Vec<Cell>) -> Self {
        Self::from_payload(
            Payload::List(Arc::new(Mutex::new(value))),
            builtins::list_type(),
            true,
        )
    }
}

impl Display for Cell {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_value(formatter, false, DISPLAY_DEPTH)
    }
}

impl Debug for Cell {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_value(formatter, true, DISPLAY_DEPTH)
    }
}

impl Cell {
    /// The canonical null value.
    ///
    /// Null is itself typed: the cell carries the
    /// [Null descriptor](crate::builtins::null_type), and conversions and
    /// comparisons involving it follow the absorbing-element rules of the
    /// operator protocol.
    #[inline(always)]
    pub fn null() -> Self {
        Self::from_payload(Payload::Void, builtins::null_type(), true)
    }

    /// An empty Hash value.
    #[inline(always)]
    pub fn hash() -> Self {
        Self::from_payload(
            Payload::Hash(Arc::new(Mutex::new(AHashMap::new()))),
            builtins::hash_type(),
            true,
        )
    }

    /// A Hash value populated from key-value pairs. A later pair silently
    /// overrides an earlier pair with an equal key.
    pub fn hash_from_pairs(pairs: impl IntoIterator<Item = (Cell, Cell)>) -> Self {
        let map = pairs
            .into_iter()
            .map(|(key, value)| (HashKey::new(&key), value))
            .collect::<AHashMap<_, _>>();

        Self::from_payload(
            Payload::Hash(Arc::new(Mutex::new(map))),
            builtins::hash_type(),
            true,
        )
    }

    /// Wraps a host object into an interop bridge cell.
    ///
    /// If the value's type has been registered through the
    /// [interop registry](crate::interop::HostTypeBuilder), the cell is
    /// dispatched through its declared members. Otherwise, a fallback
    /// empty wrapper descriptor is created for the type on first use.
    #[inline(always)]
    pub fn foreign<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_payload(
            Payload::Foreign(Arc::new(value)),
            interop::bridge_type_of::<T>(),
            true,
        )
    }

    #[inline(always)]
    pub(crate) fn from_payload(data: Payload, ty: TypeHandle, locked: bool) -> Self {
        Self { data, ty, locked }
    }

    /// The type descriptor attached to this value.
    #[inline(always)]
    pub fn ty(&self) -> TypeHandle {
        self.ty
    }

    /// The built-in kind tag of the attached descriptor.
    #[inline(always)]
    pub fn kind(&self) -> BuiltinKind {
        self.ty.kind()
    }

    /// Returns true if this cell is the null value.
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self.data, Payload::Void)
    }

    /// Returns true if the value's type is authoritative for overload
    /// scoring.
    #[inline(always)]
    pub fn is_type_locked(&self) -> bool {
        self.locked
    }

    /// Re-flags the value. An unlocked value permits speculative
    /// conversions during overload scoring.
    #[inline(always)]
    pub fn with_type_locked(mut self, locked: bool) -> Self {
        self.locked = locked;

        self
    }

    /// The Int payload, if this cell holds one.
    #[inline(always)]
    pub fn as_int(&self) -> Option<i64> {
        match &self.data {
            Payload::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The Real payload, if this cell holds one.
    #[inline(always)]
    pub fn as_real(&self) -> Option<f64> {
        match &self.data {
            Payload::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// The Bool payload, if this cell holds one.
    #[inline(always)]
    pub fn as_bool(&self) -> Option<bool> {
        match &self.data {
            Payload::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The Char payload, if this cell holds one.
    #[inline(always)]
    pub fn as_char(&self) -> Option<char> {
        match &self.data {
            Payload::Char(value) => Some(*value),
            _ => None,
        }
    }

    /// The String payload, if this cell holds one.
    #[inline(always)]
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Payload::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// A snapshot of the List payload elements, if this cell holds a list.
    pub fn list_items(&self) -> Option<Vec<Cell>> {
        match &self.data {
            Payload::List(list) => Some(lock(list).clone()),
            _ => None,
        }
    }

    /// The List payload length, if this cell holds a list.
    #[inline(always)]
    pub fn list_len(&self) -> Option<usize> {
        match &self.data {
            Payload::List(list) => Some(lock(list).len()),
            _ => None,
        }
    }

    /// The Hash payload length, if this cell holds a hash.
    #[inline(always)]
    pub fn hash_len(&self) -> Option<usize> {
        match &self.data {
            Payload::Hash(hash) => Some(lock(hash).len()),
            _ => None,
        }
    }

    /// The value stored in the Hash payload under `key`, if this cell
    /// holds a hash and the key is present.
    pub fn hash_get(&self, key: &Cell) -> Option<Cell> {
        match &self.data {
            Payload::Hash(hash) => lock(hash).get(&HashKey::new(key)).cloned(),
            _ => None,
        }
    }

    /// A shared reference to the wrapped host object, if this cell holds a
    /// bridge value of type `T`.
    #[inline(always)]
    pub fn foreign_ref<T: Any>(&self) -> Option<&T> {
        match &self.data {
            Payload::Foreign(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn payload(&self) -> &Payload {
        &self.data
    }

    #[inline(always)]
    pub(crate) fn list_payload(&self) -> Option<&Arc<Mutex<Vec<Cell>>>> {
        match &self.data {
            Payload::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn hash_payload(&self) -> Option<&Arc<Mutex<AHashMap<HashKey, Cell>>>> {
        match &self.data {
            Payload::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn struct_payload(&self) -> Option<&Arc<StructInstance>> {
        match &self.data {
            Payload::Struct(instance) => Some(instance),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn foreign_payload(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        match &self.data {
            Payload::Foreign(any) => Some(any),
            _ => None,
        }
    }

    // True if both cells alias the same shared container or host object.
    // Scalar payloads carry no identity.
    pub(crate) fn same_identity(&self, other: &Cell) -> bool {
        match (&self.data, &other.data) {
            (Payload::List(a), Payload::List(b)) => Arc::ptr_eq(a, b),
            (Payload::Hash(a), Payload::Hash(b)) => Arc::ptr_eq(a, b),
            (Payload::Struct(a), Payload::Struct(b)) => Arc::ptr_eq(a, b),
            (Payload::Foreign(a), Payload::Foreign(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Dispatches an instance member call through the attached descriptor.
    ///
    /// The `\boxed` and `\implements` intrinsic members are resolved here,
    /// ahead of the descriptor, so they exist on every value and cannot be
    /// shadowed.
    ///
    /// See [ScriptType::try_dynamic_call](crate::runtime::ScriptType::try_dynamic_call).
    pub fn dynamic_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        if let Some(result) = interop::intrinsic_call(cx, self, args, name)? {
            return Ok(result);
        }

        self.ty.get().try_dynamic_call(cx, self, args, direction, name)
    }

    /// Reads the member `name`.
    #[inline(always)]
    pub fn get_member(&self, cx: &mut Context, name: &str) -> RuntimeResult<Cell> {
        self.dynamic_call(cx, &mut [], Direction::Get, name)
    }

    /// Writes the member `name`.
    #[inline(always)]
    pub fn set_member(&self, cx: &mut Context, name: &str, value: Cell) -> RuntimeResult<Cell> {
        self.dynamic_call(cx, &mut [value], Direction::Set, name)
    }

    /// Reads the default member (indexer): `subject[index]`.
    #[inline(always)]
    pub fn index(&self, cx: &mut Context, index: Cell) -> RuntimeResult<Cell> {
        self.dynamic_call(cx, &mut [index], Direction::Get, "")
    }

    /// Writes the default member (indexer): `subject[index] = value`.
    #[inline(always)]
    pub fn set_index(&self, cx: &mut Context, index: Cell, value: Cell) -> RuntimeResult<Cell> {
        self.dynamic_call(cx, &mut [index, value], Direction::Set, "")
    }

    /// Converts this value to `target`. See [convert](crate::runtime::convert).
    #[inline(always)]
    pub fn convert_to(
        &self,
        cx: &mut Context,
        target: TypeHandle,
        narrowing: Narrowing,
    ) -> RuntimeResult<Cell> {
        conversion::convert(cx, self, target, narrowing)
    }

    /// Calls the value itself, as if it were a function.
    ///
    /// Structures delegate to their `IndirectCall` slot; bridge values
    /// delegate to their `call` member; reference slots rely on this
    /// operation to forward reads. Values of other kinds are not callable.
    pub fn indirect_call(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        cx.enter(self.ty.name())?;

        let result = match self.kind() {
            BuiltinKind::Structure => {
                self.dynamic_call(cx, args, Direction::Get, "IndirectCall")
            }

            BuiltinKind::None => self.dynamic_call(cx, args, Direction::Get, "call"),

            BuiltinKind::Null => Err(RuntimeError::invalid_call(
                self.ty,
                "",
                "the null value is not callable",
            )),

            _ => Err(RuntimeError::invalid_call(
                self.ty,
                "",
                "the value is not callable",
            )),
        };

        cx.leave();

        result
    }

    /// Renders the value as a string using the conversion protocol.
    ///
    /// Unlike the [Display] implementation, stringification may dispatch
    /// into host code (a bridge value's `to_string` member), so it needs
    /// the execution context and may fail.
    pub fn stringify(&self, cx: &mut Context) -> RuntimeResult<CompactString> {
        let converted = self.convert_to(cx, builtins::string_type(), Narrowing::Deny)?;

        match converted.as_str() {
            Some(string) => Ok(CompactString::from(string)),

            // The String descriptor's conversion hooks only produce
            // string cells.
            None => Ok(CompactString::new("")),
        }
    }

    /// Applies unary negation.
    #[inline(always)]
    pub fn negate(&self, cx: &mut Context) -> RuntimeResult<Cell> {
        ops::unary(cx, Operator::Neg, self)
    }

    /// Applies logical inversion.
    #[inline(always)]
    pub fn logical_not(&self, cx: &mut Context) -> RuntimeResult<Cell> {
        ops::unary(cx, Operator::Not, self)
    }

    /// Applies ones-complement.
    #[inline(always)]
    pub fn bit_not(&self, cx: &mut Context) -> RuntimeResult<Cell> {
        ops::unary(cx, Operator::BitNot, self)
    }

    /// Applies the increment operator.
    #[inline(always)]
    pub fn increment(&self, cx: &mut Context) -> RuntimeResult<Cell> {
        ops::unary(cx, Operator::Inc, self)
    }

    /// Applies the decrement operator.
    #[inline(always)]
    pub fn decrement(&self, cx: &mut Context) -> RuntimeResult<Cell> {
        ops::unary(cx, Operator::Dec, self)
    }

    /// Applies the `+` operator.
    ///
    /// ```
    /// use altair::runtime::{Cell, Context};
    ///
    /// let mut cx = Context::new();
    ///
    /// let sum = Cell::from(2i64).add(&mut cx, &Cell::from(3i64)).unwrap();
    ///
    /// assert_eq!(sum.as_int(), Some(5));
    /// ```
    #[inline(always)]
    pub fn add(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Add, self, rhs)
    }

    /// Applies the `-` operator.
    #[inline(always)]
    pub fn sub(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Sub, self, rhs)
    }

    /// Applies the `*` operator.
    ///
    /// ```
    /// use altair::runtime::{Cell, Context};
    ///
    /// let mut cx = Context::new();
    ///
    /// let repeated = Cell::from("ab").mul(&mut cx, &Cell::from(3i64)).unwrap();
    ///
    /// assert_eq!(repeated.as_str(), Some("ababab"));
    /// ```
    #[inline(always)]
    pub fn mul(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Mul, self, rhs)
    }

    /// Applies the `/` operator.
    #[inline(always)]
    pub fn div(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Div, self, rhs)
    }

    /// Applies the modulus operator.
    #[inline(always)]
    pub fn rem(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Rem, self, rhs)
    }

    /// Applies the bitwise-and operator.
    #[inline(always)]
    pub fn bit_and(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::BitAnd, self, rhs)
    }

    /// Applies the bitwise-or operator.
    #[inline(always)]
    pub fn bit_or(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::BitOr, self, rhs)
    }

    /// Applies the bitwise exclusive-or operator.
    #[inline(always)]
    pub fn bit_xor(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::BitXor, self, rhs)
    }

    /// Applies the equality operator.
    ///
    /// ```
    /// use altair::runtime::{Cell, Context};
    ///
    /// let mut cx = Context::new();
    ///
    /// let verdict = Cell::null().equal(&mut cx, &Cell::null()).unwrap();
    ///
    /// assert_eq!(verdict.as_bool(), Some(true));
    /// ```
    #[inline(always)]
    pub fn equal(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Eq, self, rhs)
    }

    /// Applies the inequality operator.
    #[inline(always)]
    pub fn not_equal(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Ne, self, rhs)
    }

    /// Applies the `<` operator.
    #[inline(always)]
    pub fn less(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Lt, self, rhs)
    }

    /// Applies the `<=` operator.
    #[inline(always)]
    pub fn less_or_equal(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Le, self, rhs)
    }

    /// Applies the `>` operator.
    #[inline(always)]
    pub fn greater(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Gt, self, rhs)
    }

    /// Applies the `>=` operator.
    #[inline(always)]
    pub fn greater_or_equal(&self, cx: &mut Context, rhs: &Cell) -> RuntimeResult<Cell> {
        ops::binary(cx, Operator::Ge, self, rhs)
    }

    pub(crate) fn fmt_value(
        &self,
        formatter: &mut Formatter<'_>,
        nested: bool,
        depth: usize,
    ) -> std::fmt::Result {
        if depth == 0 {
            return formatter.write_str("...");
        }

        match &self.data {
            Payload::Void => match nested {
                true => formatter.write_str("null"),
                false => Ok(()),
            },

            Payload::Bool(value) => Display::fmt(value, formatter),
            Payload::Int(value) => Display::fmt(value, formatter),
            Payload::Real(value) => Display::fmt(value, formatter),

            Payload::Char(value) => match nested {
                true => formatter.write_fmt(format_args!("'{value}'")),
                false => formatter.write_fmt(format_args!("{value}")),
            },

            Payload::Str(value) => match nested {
                true => formatter
                    .write_fmt(format_args!("\"{}\"", ident::escape(value.as_str()))),
                false => formatter.write_str(value.as_str()),
            },

            Payload::List(list) => {
                formatter.write_str("[")?;

                let items = lock(list).clone();

                let mut first = true;

                for item in &items {
                    match first {
                        true => first = false,
                        false => formatter.write_str(", ")?,
                    }

                    item.fmt_value(formatter, true, depth - 1)?;
                }

                formatter.write_str("]")
            }

            Payload::Hash(hash) => {
                formatter.write_str("{")?;

                let pairs = lock(hash)
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Vec<_>>();

                let mut first = true;

                for (key, value) in &pairs {
                    match first {
                        true => first = false,
                        false => formatter.write_str(", ")?,
                    }

                    key.as_cell().fmt_value(formatter, true, depth - 1)?;
                    formatter.write_str(": ")?;
                    value.fmt_value(formatter, true, depth - 1)?;
                }

                formatter.write_str("}")
            }

            Payload::Struct(instance) => instance.fmt_slots(formatter, depth - 1),

            Payload::Foreign(_) => {
                formatter.write_fmt(format_args!("<{}>", self.ty.name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cell() {
        let null = Cell::null();

        assert!(null.is_null());
        assert_eq!(null.kind(), BuiltinKind::Null);
        assert_eq!(null.to_string(), "");
    }

    #[test]
    fn test_scalar_payloads() {
        assert_eq!(Cell::from(7i64).as_int(), Some(7));
        assert_eq!(Cell::from(2.5f64).as_real(), Some(2.5));
        assert_eq!(Cell::from(true).as_bool(), Some(true));
        assert_eq!(Cell::from('x').as_char(), Some('x'));
        assert_eq!(Cell::from("abc").as_str(), Some("abc"));

        assert_eq!(Cell::from(7i64).as_real(), None);
        assert_eq!(Cell::from("abc").as_int(), None);
    }

    #[test]
    fn test_cloned_lists_alias() {
        let list = Cell::from(vec![Cell::from(1i64)]);
        let alias = list.clone();

        assert!(list.same_identity(&alias));
        assert!(!list.same_identity(&Cell::from(vec![Cell::from(1i64)])));
    }

    #[test]
    fn test_display_rendering() {
        let list = Cell::from(vec![
            Cell::from(1i64),
            Cell::from("a\"b"),
            Cell::null(),
            Cell::from('c'),
        ]);

        assert_eq!(list.to_string(), "[1, \"a\\\"b\", null, 'c']");
        assert_eq!(Cell::from("plain").to_string(), "plain");
        assert_eq!(Cell::from(false).to_string(), "false");
    }

    #[test]
    fn test_type_locking() {
        let locked = Cell::from(1i64);
        let unlocked = Cell::from(1i64).with_type_locked(false);

        assert!(locked.is_type_locked());
        assert!(!unlocked.is_type_locked());
    }

    #[test]
    fn test_intrinsics_on_builtin_values() {
        let mut cx = Context::new();
        let list = Cell::from(vec![Cell::from(1i64)]);

        let boxed = list.get_member(&mut cx, "\\boxed").unwrap();

        assert_eq!(boxed.ty().name(), "Boxed");
        assert!(boxed
            .get_member(&mut cx, "value")
            .unwrap()
            .same_identity(&list));

        let flag = list
            .dynamic_call(
                &mut cx,
                &mut [Cell::from("List")],
                Direction::Get,
                "\\implements",
            )
            .unwrap();

        assert_eq!(flag.as_bool(), Some(true));

        // Boxing pins even the null value.
        let pinned = Cell::null().get_member(&mut cx, "\\boxed").unwrap();

        assert!(pinned.get_member(&mut cx, "value").unwrap().is_null());
    }
}
