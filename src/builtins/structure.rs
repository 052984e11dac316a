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

//! Script-defined records built on the type descriptor protocol.
//!
//! A structure descriptor is defined by an ordered list of named slots,
//! each holding its value either *by value* or *by reference*. Reading a
//! by-value slot returns the stored cell; reading a by-reference slot
//! instead calls the stored cell with the read arguments, which is how a
//! structure exposes methods.
//!
//! Descriptors are interned per canonical signature (the ordered sequence
//! of slot names and reference flags), so two layouts with an equal
//! signature define the identical, interchangeable descriptor. Instances
//! are open: writing an unknown member name defines a new by-value slot on
//! that instance without affecting its descriptor.
//!
//! A few member names have protocol meaning. `IndirectCall` is the slot
//! invoked when the structure itself is [called](crate::runtime::Cell::indirect_call),
//! `to_string` overrides stringification, operator slots such as `(+)` or
//! `(==)` overload the corresponding operators, and the `\set` (alias `\`)
//! and `\\` members force-write a slot with explicit value or reference
//! semantics. The name `New` is reserved.
//!
//! ```
//! use altair::{builtins::structure::StructureLayout, runtime::{Cell, Context}};
//!
//! let mut cx = Context::new();
//!
//! let point = StructureLayout::new()
//!     .slot("x")
//!     .slot("y")
//!     .define()
//!     .unwrap();
//!
//! let origin = point.construct(&mut cx, &mut []).unwrap();
//!
//! origin.set_member(&mut cx, "x", Cell::from(3i64)).unwrap();
//!
//! assert_eq!(origin.get_member(&mut cx, "x").unwrap().as_int(), Some(3));
//!
//! let same = StructureLayout::new().slot("x").slot("y").define().unwrap();
//!
//! assert_eq!(point, same);
//! ```

use std::{
    fmt::Formatter,
    sync::{Arc, Mutex, OnceLock, PoisonError, RwLock},
};

use ahash::AHashMap;
use compact_str::{CompactString, ToCompactString};

use crate::{
    builtins::BuiltinKind,
    report::system_panic,
    runtime::{
        ident,
        lock,
        Cell,
        Context,
        Direction,
        Narrowing,
        Operator,
        Payload,
        RuntimeError,
        RuntimeResult,
        ScriptType,
        TypeHandle,
        TypeMeta,
    },
};

static META: TypeMeta = TypeMeta::new("Structure", BuiltinKind::Structure);

static REGISTRY: OnceLock<RwLock<AHashMap<CompactString, &'static StructureType>>> =
    OnceLock::new();

// Member names that force-write a slot: the first two write a by-value
// slot, the last one writes a by-reference slot.
const SET_BY_VALUE: &str = "\\set";
const SET_BY_VALUE_ALIAS: &str = "\\";
const SET_BY_REF: &str = "\\\\";

/// A builder of structure descriptors.
///
/// Slots are declared in order; the order is part of the descriptor's
/// identity. [define](Self::define) validates the slot names and returns
/// the interned descriptor handle.
#[derive(Default, Clone)]
pub struct StructureLayout {
    slots: Vec<(CompactString, bool)>,
}

impl StructureLayout {
    /// Creates an empty layout. An empty layout is valid: its instances
    /// start without slots and grow through member writes.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a by-value slot.
    pub fn slot(mut self, name: impl AsRef<str>) -> Self {
        self.slots.push((CompactString::from(name.as_ref()), false));

        self
    }

    /// Declares a by-reference slot. Reading the slot calls its held
    /// value instead of returning it.
    pub fn reference_slot(mut self, name: impl AsRef<str>) -> Self {
        self.slots.push((CompactString::from(name.as_ref()), true));

        self
    }

    /// Validates the layout and returns the descriptor handle.
    ///
    /// Two layouts with an equal canonical signature yield the identical
    /// handle. Slot names must be non-empty, must not contain the `\`
    /// directive separator, must not be the reserved name `New`, and must
    /// not repeat within the layout (comparison ignores ASCII case, the
    /// way slot lookup does).
    pub fn define(self) -> RuntimeResult<TypeHandle> {
        for (index, (name, _)) in self.slots.iter().enumerate() {
            check_slot_name(name)?;

            let duplicated = self.slots[..index]
                .iter()
                .any(|(earlier, _)| earlier.eq_ignore_ascii_case(name));

            if duplicated {
                return Err(slot_name_error(name, "the slot name repeats"));
            }
        }

        Ok(intern(self.slots))
    }
}

fn check_slot_name(name: &str) -> RuntimeResult<()> {
    if name.is_empty() {
        return Err(slot_name_error(name, "the slot name is empty"));
    }

    if name.contains('\\') {
        return Err(slot_name_error(
            name,
            "slot names cannot contain the '\\' directive separator",
        ));
    }

    if name.eq_ignore_ascii_case("new") {
        return Err(slot_name_error(name, "the name 'New' is reserved"));
    }

    // `Call` reads as an alias of the `IndirectCall` slot and cannot be
    // defined on its own.
    if name.eq_ignore_ascii_case("call") {
        return Err(slot_name_error(name, "the name 'Call' is reserved"));
    }

    Ok(())
}

#[inline]
fn slot_name_error(name: &str, message: &str) -> RuntimeError {
    RuntimeError::InvalidCall {
        receiver: CompactString::from(META.name()),
        name: CompactString::from(name),
        message: CompactString::from(message),
    }
}

fn signature_of(slots: &[(CompactString, bool)]) -> CompactString {
    let mut signature = CompactString::new("");

    for (index, (name, by_ref)) in slots.iter().enumerate() {
        if index > 0 {
            signature.push(',');
        }

        if *by_ref {
            signature.push_str("ref ");
        }

        signature.push_str(&ident::to_id_or_literal(name));
    }

    signature
}

fn intern(slots: Vec<(CompactString, bool)>) -> TypeHandle {
    let registry = REGISTRY.get_or_init(|| RwLock::new(AHashMap::new()));

    let signature = signature_of(&slots);

    {
        let guard = registry.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(ty) = guard.get(&signature) {
            return TypeHandle::new(*ty);
        }
    }

    let mut guard = registry.write().unwrap_or_else(PoisonError::into_inner);

    if let Some(ty) = guard.get(&signature) {
        return TypeHandle::new(*ty);
    }

    let ty: &'static StructureType = Box::leak(Box::new(StructureType {
        this: OnceLock::new(),
        prototype: slots,
    }));

    // The back-reference is published before the descriptor becomes
    // reachable through the registry.
    let _ = ty.this.set(TypeHandle::new(ty));

    guard.insert(signature, ty);

    TypeHandle::new(ty)
}

#[derive(Clone)]
struct Slot {
    name: CompactString,
    by_ref: bool,
    value: Cell,
}

/// The mutable slot table of one structure value.
pub(crate) struct StructInstance {
    slots: Mutex<Vec<Slot>>,
}

impl StructInstance {
    fn find(&self, name: &str) -> Option<Slot> {
        lock(&self.slots)
            .iter()
            .find(|slot| slot.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    // A write through the ordinary member path: an existing slot keeps
    // its reference flag, an unknown name defines a new by-value slot.
    fn assign(&self, name: &str, value: Cell) {
        let mut guard = lock(&self.slots);

        for slot in guard.iter_mut() {
            if slot.name.eq_ignore_ascii_case(name) {
                slot.value = value;

                return;
            }
        }

        guard.push(Slot {
            name: CompactString::from(name),
            by_ref: false,
            value,
        });
    }

    // A force-write: both the value and the reference flag are replaced.
    fn force_assign(&self, name: &str, by_ref: bool, value: Cell) {
        let mut guard = lock(&self.slots);

        for slot in guard.iter_mut() {
            if slot.name.eq_ignore_ascii_case(name) {
                slot.by_ref = by_ref;
                slot.value = value;

                return;
            }
        }

        guard.push(Slot {
            name: CompactString::from(name),
            by_ref,
            value,
        });
    }

    fn slot_names(&self) -> Vec<CompactString> {
        lock(&self.slots)
            .iter()
            .map(|slot| slot.name.clone())
            .collect()
    }

    pub(crate) fn fmt_slots(
        &self,
        formatter: &mut Formatter<'_>,
        depth: usize,
    ) -> std::fmt::Result {
        formatter.write_str("{")?;

        let slots = lock(&self.slots).clone();

        let mut first = true;

        for slot in &slots {
            match first {
                true => first = false,
                false => formatter.write_str(", ")?,
            }

            if slot.by_ref {
                formatter.write_str("ref ")?;
            }

            formatter.write_str(&ident::to_id_or_literal(&slot.name))?;
            formatter.write_str(": ")?;

            slot.value.fmt_value(formatter, true, depth)?;
        }

        formatter.write_str("}")
    }
}

struct StructureType {
    this: OnceLock<TypeHandle>,
    prototype: Vec<(CompactString, bool)>,
}

impl StructureType {
    fn handle(&self) -> TypeHandle {
        match self.this.get() {
            Some(handle) => *handle,

            // Descriptors only come out of [intern], which sets the
            // back-reference before publishing them.
            None => system_panic!("Structure descriptor outside of the registry."),
        }
    }

    fn force_set(
        &self,
        cx: &mut Context,
        instance: &StructInstance,
        args: &mut [Cell],
        by_ref: bool,
        directive: &str,
    ) -> RuntimeResult<Cell> {
        let [name_arg, value] = args else {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                directive,
                "a forced slot write expects a slot name and a value",
            ));
        };

        let name = name_arg.stringify(cx)?;

        check_slot_name(&name)?;

        instance.force_assign(&name, by_ref, value.clone());

        Ok(Cell::null())
    }
}

impl ScriptType for StructureType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, _cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        if args.len() > self.prototype.len() {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                "new",
                format!(
                    "expected at most {} arguments, got {}",
                    self.prototype.len(),
                    args.len(),
                ),
            ));
        }

        let mut slots = Vec::with_capacity(self.prototype.len());

        for (index, (name, by_ref)) in self.prototype.iter().enumerate() {
            let value = match args.get(index) {
                Some(arg) => arg.clone(),
                None => Cell::null(),
            };

            slots.push(Slot {
                name: name.clone(),
                by_ref: *by_ref,
                value,
            });
        }

        let instance = StructInstance {
            slots: Mutex::new(slots),
        };

        Ok(Cell::from_payload(
            Payload::Struct(Arc::new(instance)),
            self.handle(),
            true,
        ))
    }

    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        let Some(instance) = subject.struct_payload() else {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                name,
                "the subject is not a structure",
            ));
        };

        match name {
            SET_BY_VALUE | SET_BY_VALUE_ALIAS => {
                return self.force_set(cx, instance, args, false, name)
            }

            SET_BY_REF => return self.force_set(cx, instance, args, true, name),

            _ => (),
        }

        if name.eq_ignore_ascii_case("new") {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                name,
                "the member name 'New' is reserved",
            ));
        }

        if name.contains('\\') {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                name,
                "structure members do not accept calling directives",
            ));
        }

        // Reading `Call` reads the `IndirectCall` slot.
        let name = match name.eq_ignore_ascii_case("call") {
            true => "IndirectCall",
            false => name,
        };

        match direction {
            Direction::Get => match instance.find(name) {
                Some(slot) => match slot.by_ref {
                    true => slot.value.indirect_call(cx, args),
                    false => Ok(slot.value),
                },

                None => {
                    let names = instance.slot_names();

                    Err(unknown_slot(self.handle(), name, &names))
                }
            },

            Direction::Set => match args {
                [value] => {
                    check_slot_name(name)?;

                    instance.assign(name, value.clone());

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    self.handle(),
                    name,
                    "a member write expects exactly one argument",
                )),
            },
        }
    }

    fn try_static_call(
        &self,
        _cx: &mut Context,
        _args: &mut [Cell],
        _direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        Err(RuntimeError::invalid_call(
            self.handle(),
            name,
            "structure descriptors have no static members",
        ))
    }

    fn convert_to(
        &self,
        cx: &mut Context,
        value: &Cell,
        target: TypeHandle,
        _narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        if target.kind() != BuiltinKind::String {
            return Ok(None);
        }

        let Some(instance) = value.struct_payload() else {
            return Ok(None);
        };

        // A `to_string` slot overrides the default slot-table rendering,
        // which the String descriptor produces through [std::fmt::Display].
        if instance.find("to_string").is_none() {
            return Ok(None);
        }

        let rendered = self.try_dynamic_call(cx, value, &mut [], Direction::Get, "to_string")?;

        match rendered.as_str() {
            Some(_) => Ok(Some(rendered)),
            None => Ok(Some(Cell::from(rendered.to_compact_string()))),
        }
    }

    fn try_binary(
        &self,
        _cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        match op {
            Operator::Eq | Operator::Ne => {
                // An operator slot takes precedence: declining here lets
                // the resolution chain dispatch the member fallback.
                let overloaded = [lhs, rhs].into_iter().any(|operand| {
                    operand
                        .struct_payload()
                        .map(|instance| instance.find(op.script_name()).is_some())
                        .unwrap_or(false)
                });

                if overloaded {
                    return Ok(None);
                }

                let equal = lhs.same_identity(rhs);

                match op {
                    Operator::Eq => Ok(Some(Cell::from(equal))),
                    _ => Ok(Some(Cell::from(!equal))),
                }
            }

            // Every other operator resolves through operator slots, when
            // the instance defines them.
            _ => Ok(None),
        }
    }
}

fn unknown_slot(ty: TypeHandle, name: &str, names: &[CompactString]) -> RuntimeError {
    match crate::interop::closest(name, names.iter().map(|name| name.as_str())) {
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

    fn point() -> TypeHandle {
        StructureLayout::new()
            .slot("x")
            .slot("y")
            .define()
            .unwrap()
    }

    #[test]
    fn test_signature_interning() {
        let direct = point();
        let again = point();

        assert_eq!(direct, again);

        let reordered = StructureLayout::new()
            .slot("y")
            .slot("x")
            .define()
            .unwrap();

        assert_ne!(direct, reordered);

        let referenced = StructureLayout::new()
            .reference_slot("x")
            .slot("y")
            .define()
            .unwrap();

        assert_ne!(direct, referenced);
    }

    #[test]
    fn test_layout_validation() {
        assert!(StructureLayout::new().slot("").define().is_err());
        assert!(StructureLayout::new().slot("a\\b").define().is_err());
        assert!(StructureLayout::new().slot("New").define().is_err());
        assert!(StructureLayout::new()
            .slot("x")
            .slot("X")
            .define()
            .is_err());

        assert!(StructureLayout::new().define().is_ok());
        assert!(StructureLayout::new().slot("(==)").define().is_ok());
    }

    #[test]
    fn test_construction() {
        let mut cx = Context::new();

        let ty = point();

        let origin = ty.construct(&mut cx, &mut []).unwrap();

        assert!(origin.get_member(&mut cx, "x").unwrap().is_null());
        assert!(origin.get_member(&mut cx, "y").unwrap().is_null());

        let unit = ty
            .construct(&mut cx, &mut [Cell::from(1i64), Cell::from(2i64)])
            .unwrap();

        assert_eq!(unit.get_member(&mut cx, "x").unwrap().as_int(), Some(1));
        assert_eq!(unit.get_member(&mut cx, "y").unwrap().as_int(), Some(2));

        let overflow = ty.construct(
            &mut cx,
            &mut [Cell::from(1i64), Cell::from(2i64), Cell::from(3i64)],
        );

        assert!(overflow.unwrap_err().is_invalid_call());
    }

    #[test]
    fn test_slot_access() {
        let mut cx = Context::new();

        let subject = point().construct(&mut cx, &mut [Cell::from(5i64)]).unwrap();

        // Lookup ignores ASCII case.
        assert_eq!(subject.get_member(&mut cx, "X").unwrap().as_int(), Some(5));

        subject.set_member(&mut cx, "x", Cell::from(7i64)).unwrap();
        assert_eq!(subject.get_member(&mut cx, "x").unwrap().as_int(), Some(7));

        // Writing an unknown name extends the instance.
        subject
            .set_member(&mut cx, "label", Cell::from("origin"))
            .unwrap();

        assert_eq!(
            subject.get_member(&mut cx, "label").unwrap().as_str(),
            Some("origin"),
        );

        let error = subject.get_member(&mut cx, "lable").unwrap_err();
        assert!(error.to_string().contains("Did you mean 'label'?"));

        let error = subject
            .dynamic_call(&mut cx, &mut [], Direction::Set, "x")
            .unwrap_err();

        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_reserved_names() {
        let mut cx = Context::new();

        let subject = point().construct(&mut cx, &mut []).unwrap();

        let error = subject.get_member(&mut cx, "New").unwrap_err();
        assert!(error.is_invalid_call());

        let error = subject
            .set_member(&mut cx, "a\\Raise", Cell::null())
            .unwrap_err();

        assert!(error.is_invalid_call());

        assert!(StructureLayout::new().slot("Call").define().is_err());
    }

    #[test]
    fn test_call_reads_the_indirect_call_slot() {
        let mut cx = Context::new();

        let subject = point().construct(&mut cx, &mut []).unwrap();

        subject
            .set_member(&mut cx, "IndirectCall", Cell::from(42i64))
            .unwrap();

        let value = subject.get_member(&mut cx, "Call").unwrap();
        assert_eq!(value.as_int(), Some(42));
    }

    #[test]
    fn test_force_set() {
        let mut cx = Context::new();

        let subject = point().construct(&mut cx, &mut []).unwrap();

        subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from("target"), Cell::from(9i64)],
                Direction::Get,
                "\\\\",
            )
            .unwrap();

        // Reading a by-reference slot calls the held value, and an Int
        // is not callable.
        let error = subject.get_member(&mut cx, "target").unwrap_err();
        assert!(error.is_invalid_call());

        subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from("target"), Cell::from(9i64)],
                Direction::Get,
                "\\set",
            )
            .unwrap();

        assert_eq!(
            subject.get_member(&mut cx, "target").unwrap().as_int(),
            Some(9),
        );
    }

    #[test]
    fn test_default_equality_is_identity() {
        let mut cx = Context::new();

        let ty = point();

        let a = ty.construct(&mut cx, &mut []).unwrap();
        let b = ty.construct(&mut cx, &mut []).unwrap();

        let same = a.equal(&mut cx, &a.clone()).unwrap();
        assert_eq!(same.as_bool(), Some(true));

        let distinct = a.equal(&mut cx, &b).unwrap();
        assert_eq!(distinct.as_bool(), Some(false));

        let unequal = a.not_equal(&mut cx, &b).unwrap();
        assert_eq!(unequal.as_bool(), Some(true));

        let foreign = a.equal(&mut cx, &Cell::from(5i64)).unwrap();
        assert_eq!(foreign.as_bool(), Some(false));
    }

    #[test]
    fn test_display_rendering() {
        let mut cx = Context::new();

        let subject = point()
            .construct(&mut cx, &mut [Cell::from(1i64)])
            .unwrap();

        subject
            .set_member(&mut cx, "label", Cell::from("origin"))
            .unwrap();

        assert_eq!(
            subject.to_string(),
            "{x: 1, y: null, label: \"origin\"}",
        );
    }

    #[test]
    fn test_to_string_slot() {
        let mut cx = Context::new();

        let subject = point().construct(&mut cx, &mut []).unwrap();

        subject
            .set_member(&mut cx, "to_string", Cell::from("custom"))
            .unwrap();

        assert_eq!(subject.stringify(&mut cx).unwrap(), "custom");
    }
}
