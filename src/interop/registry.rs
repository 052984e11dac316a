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
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    sync::{OnceLock, RwLock},
};

use ahash::AHashMap;
use compact_str::CompactString;
use log::debug;

use crate::{
    builtins::{self, BuiltinKind},
    interop::{
        member::{split_directive, HostFn, MemberTable, TypeToken, Variant},
        number::CellNumber,
        resolve::closest,
    },
    report::system_panic,
    runtime::{
        convert,
        ident,
        Cell,
        Context,
        Direction,
        HostError,
        HostResult,
        Narrowing,
        RuntimeError,
        RuntimeResult,
        TypeHandle,
        TypeMeta,
    },
};

/// A bridge wrapper that pins a script value behind an opaque host type,
/// shielding it from overload scoring and implicit conversions.
///
/// Wrapping is available to scripts through the `\boxed` intrinsic member
/// of every bridge value. The wrapper exposes the original value back
/// through its `value` member.
#[derive(Clone)]
pub struct Boxed(Cell);

impl Boxed {
    /// Boxes a value.
    #[inline(always)]
    pub fn new(value: Cell) -> Self {
        Self(value)
    }

    /// The wrapped value.
    #[inline(always)]
    pub fn inner(&self) -> &Cell {
        &self.0
    }
}

// A registered host type: the bridge descriptor plus its member tables.
//
// Instances live for the process lifetime (the registry leaks them), so
// every reference handed out is `'static`.
pub(crate) struct HostType {
    pub(crate) meta: &'static TypeMeta,
    pub(crate) this: OnceLock<TypeHandle>,
    pub(crate) id: TypeId,
    pub(crate) instance: MemberTable,
    pub(crate) statics: MemberTable,
    pub(crate) constructors: Vec<Variant>,
}

impl HostType {
    pub(crate) fn handle(&self) -> TypeHandle {
        match self.this.get() {
            Some(handle) => *handle,
            None => system_panic!("Host descriptor outside of the registry."),
        }
    }

    // The candidate set of an instance member call, or the diagnostic
    // for a name that resolves to nothing.
    pub(crate) fn instance_variants(
        &self,
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<&[Variant]> {
        let (base, directive) = split_directive(self.handle(), name)?;

        match self.instance.variants(base, directive, direction) {
            Some(variants) => Ok(variants),
            None => Err(self.member_error(&self.instance, name, base)),
        }
    }

    pub(crate) fn static_variants(
        &self,
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<&[Variant]> {
        let (base, directive) = split_directive(self.handle(), name)?;

        if self.statics.is_empty() {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                name,
                format!("the {} type has no static members", self.meta.name()),
            ));
        }

        match self.statics.variants(base, directive, direction) {
            Some(variants) => Ok(variants),
            None => Err(self.member_error(&self.statics, name, base)),
        }
    }

    fn member_error(&self, table: &MemberTable, name: &str, base: &str) -> RuntimeError {
        let receiver = self.handle();

        if base.is_empty() {
            let message = match table.has_indexer() {
                true => "the default member does not support this access",
                false => "the type has no default member",
            };

            return RuntimeError::invalid_call(receiver, name, message);
        }

        if table.contains(base) {
            return RuntimeError::invalid_call(
                receiver,
                name,
                "the member does not support this access",
            );
        }

        match closest(base, table.display_names()) {
            Some(suggestion) => RuntimeError::invalid_call(
                receiver,
                name,
                format!("unknown member. Did you mean '{suggestion}'?"),
            ),

            None => RuntimeError::invalid_call(receiver, name, "unknown member"),
        }
    }
}

/// A builder of a bridge type registration.
///
/// The builder assembles the member tables of one host type and
/// publishes them in the process-wide interop registry. Host callees are
/// plain function pointers of the [HostFn] shape; capture-free closures
/// coerce into it:
///
/// ```
/// use altair::{
///     interop::{HostTypeBuilder, TypeToken},
///     runtime::{Cell, Context, Direction},
/// };
///
/// #[derive(Clone, Copy)]
/// struct Meters(f64);
///
/// fn subject_meters(subject: Option<&Cell>) -> Result<f64, altair::runtime::HostError> {
///     match subject.and_then(|cell| cell.foreign_ref::<Meters>()) {
///         Some(meters) => Ok(meters.0),
///         None => Err("the subject is not a Meters value".into()),
///     }
/// }
///
/// HostTypeBuilder::of::<Meters>("Meters")
///     .field("value", |_cx, subject, _args| {
///         Ok(Cell::from(subject_meters(subject)?))
///     })
///     .method("scale", &[TypeToken::Real], |_cx, subject, args| {
///         let factor = args[0].as_real().unwrap_or(1.0);
///
///         Ok(Cell::foreign(Meters(subject_meters(subject)? * factor)))
///     })
///     .register();
///
/// let mut cx = Context::new();
/// let value = Cell::foreign(Meters(1.5));
///
/// assert_eq!(value.get_member(&mut cx, "value").unwrap().as_real(), Some(1.5));
///
/// let scaled = value
///     .dynamic_call(&mut cx, &mut [Cell::from(2.0f64)], Direction::Get, "scale")
///     .unwrap();
///
/// assert_eq!(scaled.get_member(&mut cx, "value").unwrap().as_real(), Some(3.0));
/// ```
///
/// Member names are case-insensitive. Registering several signatures
/// under one name forms an overload set resolved by scoring (see
/// [CallSite](crate::interop::CallSite) for the caching entry point).
///
/// Re-registering a host type replaces the previous registration for
/// values created afterwards; already existing cells keep the descriptor
/// they were created with.
pub struct HostTypeBuilder {
    name: &'static str,
    id: TypeId,
    instance: MemberTable,
    statics: MemberTable,
    constructors: Vec<Variant>,
}

impl HostTypeBuilder {
    /// Starts a registration of the host type `T` under the script-facing
    /// `name`.
    pub fn of<T: Any>(name: &'static str) -> Self {
        Self {
            name,
            id: TypeId::of::<T>(),
            instance: MemberTable::default(),
            statics: MemberTable::default(),
            constructors: Vec::new(),
        }
    }

    /// Registers a read-only instance field. Field access bypasses
    /// overload scoring entirely.
    pub fn field(mut self, name: &str, get: HostFn) -> Self {
        self.instance.entry(name).getters.push(Variant::field_access(get));

        self
    }

    /// Registers a readable and writable instance field. The setter
    /// receives the written value as its sole argument, unconverted.
    pub fn field_mut(mut self, name: &str, get: HostFn, set: HostFn) -> Self {
        {
            let member = self.instance.entry(name);

            member.getters.push(Variant::field_access(get));
            member.setters.push(Variant::field_access(set));
        }

        self
    }

    /// Registers an instance method overload.
    pub fn method(mut self, name: &str, params: &[TypeToken], invoke: HostFn) -> Self {
        self.instance
            .entry(name)
            .getters
            .push(Variant::method(params, false, invoke));

        self
    }

    /// Registers an instance method overload that declares consumption of
    /// the caller's execution context. Such overloads lose score ties to
    /// overloads without the declaration.
    pub fn context_method(mut self, name: &str, params: &[TypeToken], invoke: HostFn) -> Self {
        self.instance
            .entry(name)
            .getters
            .push(Variant::method(params, true, invoke));

        self
    }

    /// Registers a read overload of the default member (indexer).
    pub fn indexer_get(mut self, params: &[TypeToken], invoke: HostFn) -> Self {
        let member = self.instance.entry("item");

        member.indexer = true;
        member.getters.push(Variant::method(params, false, invoke));

        self
    }

    /// Registers a write overload of the default member. The last
    /// parameter receives the written value.
    pub fn indexer_set(mut self, params: &[TypeToken], invoke: HostFn) -> Self {
        let member = self.instance.entry("item");

        member.indexer = true;
        member.setters.push(Variant::method(params, false, invoke));

        self
    }

    /// Registers an event member.
    ///
    /// The `add` and `remove` callees receive one handler argument and
    /// serve the `name\Add` and `name\Remove` calling directives. The
    /// `raise` callee serves both `name\Raise` and the bare `name` call.
    pub fn event(
        mut self,
        name: &str,
        add: HostFn,
        remove: HostFn,
        raise_params: &[TypeToken],
        raise: HostFn,
    ) -> Self {
        {
            let member = self.instance.entry(name);

            member.adders.push(Variant::method(&[TypeToken::Dynamic], false, add));
            member
                .removers
                .push(Variant::method(&[TypeToken::Dynamic], false, remove));
            member.raisers.push(Variant::method(raise_params, false, raise));
        }

        self
    }

    /// Registers a read-only static field.
    pub fn static_field(mut self, name: &str, get: HostFn) -> Self {
        self.statics.entry(name).getters.push(Variant::field_access(get));

        self
    }

    /// Registers a static method overload.
    pub fn static_method(mut self, name: &str, params: &[TypeToken], invoke: HostFn) -> Self {
        self.statics
            .entry(name)
            .getters
            .push(Variant::method(params, false, invoke));

        self
    }

    /// Registers a static method overload that declares consumption of
    /// the caller's execution context.
    pub fn static_context_method(
        mut self,
        name: &str,
        params: &[TypeToken],
        invoke: HostFn,
    ) -> Self {
        self.statics
            .entry(name)
            .getters
            .push(Variant::method(params, true, invoke));

        self
    }

    /// Registers a constructor overload.
    pub fn constructor(mut self, params: &[TypeToken], invoke: HostFn) -> Self {
        self.constructors.push(Variant::method(params, false, invoke));

        self
    }

    /// Registers a constructor overload that declares consumption of the
    /// caller's execution context.
    pub fn context_constructor(mut self, params: &[TypeToken], invoke: HostFn) -> Self {
        self.constructors.push(Variant::method(params, true, invoke));

        self
    }

    /// Publishes the registration and returns the bridge descriptor
    /// handle.
    pub fn register(self) -> TypeHandle {
        let host = self.finish();

        let mut types = match registry().write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };

        let _ = types.insert(host.id, host);

        debug!("{} host type registered.", host.meta.name());

        host.handle()
    }

    fn finish(self) -> &'static HostType {
        let meta = Box::leak(Box::new(TypeMeta::new(self.name, BuiltinKind::None)));

        let host = Box::leak(Box::new(HostType {
            meta,
            this: OnceLock::new(),
            id: self.id,
            instance: self.instance,
            statics: self.statics,
            constructors: self.constructors,
        }));

        let _ = host.this.set(TypeHandle::new(host));

        host
    }
}

type Registry = RwLock<AHashMap<TypeId, &'static HostType>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

// The registry is seeded with the wrappers of the host primitives that
// back the built-in scalar types, so that the scalar descriptors can
// delegate member dispatch to the bridge unconditionally.
fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let mut types = AHashMap::new();

        for host in [
            int_wrapper().finish(),
            real_wrapper().finish(),
            bool_wrapper().finish(),
            char_wrapper().finish(),
            string_wrapper().finish(),
            boxed_wrapper().finish(),
        ] {
            let _ = types.insert(host.id, host);
        }

        debug!("Interop registry seeded with {} primitive wrappers.", types.len());

        RwLock::new(types)
    })
}

/// The bridge descriptor of the host type `T`.
///
/// If `T` has not been registered through a [HostTypeBuilder], an empty
/// wrapper descriptor named after the unqualified Rust type name is
/// created on first use. Values of such a type can be stored and passed
/// around but expose no members until a registration arrives.
///
/// ```
/// use altair::interop::bridge_type_of;
///
/// assert_eq!(bridge_type_of::<i64>().name(), "Int");
/// assert_eq!(bridge_type_of::<String>().name(), "String");
///
/// struct Opaque;
///
/// assert_eq!(bridge_type_of::<Opaque>().name(), "Opaque");
/// ```
pub fn bridge_type_of<T: Any>() -> TypeHandle {
    let id = TypeId::of::<T>();

    {
        let types = match registry().read() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };

        if let Some(host) = types.get(&id) {
            return host.handle();
        }
    }

    let mut types = match registry().write() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    };

    if let Some(host) = types.get(&id) {
        return host.handle();
    }

    let host = HostTypeBuilder::of::<T>(short_name(type_name::<T>())).finish();

    let _ = types.insert(id, host);

    debug!("{} fallback wrapper created.", host.meta.name());

    host.handle()
}

pub(crate) fn registered(id: TypeId) -> Option<&'static HostType> {
    let types = match registry().read() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    };

    types.get(&id).copied()
}

pub(crate) fn registered_handle(id: TypeId) -> Option<TypeHandle> {
    registered(id).map(HostType::handle)
}

// The host type serving member calls on `value`, if any. The scalar
// built-ins delegate to their primitive wrappers; container and
// structure values own their member dispatch.
pub(crate) fn host_type_of_cell(value: &Cell) -> Option<&'static HostType> {
    match value.kind() {
        BuiltinKind::Bool => registered(TypeId::of::<bool>()),
        BuiltinKind::Int => registered(TypeId::of::<i64>()),
        BuiltinKind::Real => registered(TypeId::of::<f64>()),
        BuiltinKind::Char => registered(TypeId::of::<char>()),
        BuiltinKind::String => registered(TypeId::of::<String>()),

        BuiltinKind::None => {
            let any = value.foreign_payload()?;

            registered(any.as_ref().type_id())
        }

        _ => None,
    }
}

// The unqualified tail of a Rust type path, for fallback wrapper names.
fn short_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(angle) => &full[..angle],
        None => full,
    };

    match base.rfind("::") {
        Some(colon) => &base[colon + 2..],
        None => base,
    }
}

fn subject_cell(subject: Option<&Cell>) -> Result<&Cell, HostError> {
    match subject {
        Some(cell) => Ok(cell),
        None => Err(HostError::from("the member requires a subject value")),
    }
}

fn subject_num(subject: Option<&Cell>) -> Result<CellNumber, HostError> {
    let cell = subject_cell(subject)?;

    match CellNumber::of(cell) {
        Some(number) => Ok(number),
        None => Err(HostError::from("the subject is not a number")),
    }
}

fn subject_str(subject: Option<&Cell>) -> Result<&str, HostError> {
    let cell = subject_cell(subject)?;

    match cell
        .as_str()
        .or_else(|| cell.foreign_ref::<String>().map(String::as_str))
    {
        Some(string) => Ok(string),
        None => Err(HostError::from("the subject is not a String value")),
    }
}

fn subject_char(subject: Option<&Cell>) -> Result<char, HostError> {
    let cell = subject_cell(subject)?;

    match cell.as_char().or_else(|| cell.foreign_ref::<char>().copied()) {
        Some(ch) => Ok(ch),
        None => Err(HostError::from("the subject is not a Char value")),
    }
}

fn arg_cell(args: &[Cell], index: usize) -> Result<&Cell, HostError> {
    match args.get(index) {
        Some(cell) => Ok(cell),
        None => Err(HostError::from("missing argument")),
    }
}

fn arg_str(args: &[Cell], index: usize) -> Result<&str, HostError> {
    let cell = arg_cell(args, index)?;

    match cell
        .as_str()
        .or_else(|| cell.foreign_ref::<String>().map(String::as_str))
    {
        Some(string) => Ok(string),
        None => Err(HostError::from("expected a String argument")),
    }
}

fn arg_int(args: &[Cell], index: usize) -> Result<i64, HostError> {
    let cell = arg_cell(args, index)?;

    match CellNumber::of(cell).and_then(CellNumber::as_i64) {
        Some(int) => Ok(int),
        None => Err(HostError::from("expected an Int argument")),
    }
}

fn arg_index(args: &[Cell], index: usize) -> Result<usize, HostError> {
    let int = arg_int(args, index)?;

    match cast::usize(int) {
        Ok(value) => Ok(value),
        Err(_) => Err(HostError::from(format!("{int} is not a valid index"))),
    }
}

fn int_of(value: usize) -> HostResult {
    match cast::i64(value) {
        Ok(int) => Ok(Cell::from(int)),
        Err(_) => Err(HostError::from("the value does not fit into the Int range")),
    }
}

fn subject_to_string(cx: &mut Context, subject: Option<&Cell>, _args: &mut [Cell]) -> HostResult {
    let string = subject_cell(subject)?.stringify(cx)?;

    Ok(Cell::from(string))
}

fn num_compare(_cx: &mut Context, subject: Option<&Cell>, args: &mut [Cell]) -> HostResult {
    let left = subject_num(subject)?;

    let Some(right) = CellNumber::of(arg_cell(args, 0)?) else {
        return Err(HostError::from("cannot compare a number with a non-number value"));
    };

    let Some(ordering) = left.compare(right) else {
        return Err(HostError::from("cannot order against a NaN value"));
    };

    Ok(Cell::from(match ordering {
        Ordering::Less => -1i64,
        Ordering::Equal => 0i64,
        Ordering::Greater => 1i64,
    }))
}

fn num_equals(_cx: &mut Context, subject: Option<&Cell>, args: &mut [Cell]) -> HostResult {
    let left = subject_num(subject)?;

    let equal = match CellNumber::of(arg_cell(args, 0)?) {
        Some(right) => left.compare(right) == Some(Ordering::Equal),
        None => false,
    };

    Ok(Cell::from(equal))
}

fn construct_converting(
    cx: &mut Context,
    args: &mut [Cell],
    target: TypeHandle,
    default: Cell,
) -> HostResult {
    let arg = arg_cell(args, 0)?;

    if arg.is_null() {
        return Ok(default);
    }

    Ok(convert(cx, arg, target, Narrowing::Allow)?)
}

// Case pairs that expand to several characters are left unchanged.
fn single_case(ch: char, upper: bool) -> char {
    match upper {
        true => {
            let mut mapped = ch.to_uppercase();

            match (mapped.next(), mapped.next()) {
                (Some(single), None) => single,
                _ => ch,
            }
        }

        false => {
            let mut mapped = ch.to_lowercase();

            match (mapped.next(), mapped.next()) {
                (Some(single), None) => single,
                _ => ch,
            }
        }
    }
}

fn int_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<i64>("Int")
        .context_method("to_string", &[], subject_to_string)
        .method("compare_to", &[TypeToken::Dynamic], num_compare)
        .method("equals", &[TypeToken::Dynamic], num_equals)
        .static_method("parse", &[TypeToken::String], |_cx, _subject, args| {
            let string = arg_str(args, 0)?;

            match string.trim().parse::<i64>() {
                Ok(int) => Ok(Cell::from(int)),
                Err(_) => Err(HostError::from(format!("cannot parse '{string}' as Int"))),
            }
        })
        .static_field("min_value", |_cx, _subject, _args| Ok(Cell::from(i64::MIN)))
        .static_field("max_value", |_cx, _subject, _args| Ok(Cell::from(i64::MAX)))
        .constructor(&[], |_cx, _subject, _args| Ok(Cell::from(0i64)))
        .context_constructor(&[TypeToken::Dynamic], |cx, _subject, args| {
            construct_converting(cx, args, builtins::int_type(), Cell::from(0i64))
        })
}

fn real_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<f64>("Real")
        .context_method("to_string", &[], subject_to_string)
        .method("compare_to", &[TypeToken::Dynamic], num_compare)
        .method("equals", &[TypeToken::Dynamic], num_equals)
        .method("is_nan", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_num(subject)?.as_f64().is_nan()))
        })
        .method("floor", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_num(subject)?.as_f64().floor()))
        })
        .method("ceiling", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_num(subject)?.as_f64().ceil()))
        })
        .method("round", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_num(subject)?.as_f64().round()))
        })
        .method("sqrt", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_num(subject)?.as_f64().sqrt()))
        })
        .method("abs", &[], |_cx, subject, _args| {
            match subject_num(subject)? {
                CellNumber::Int(int) => Ok(Cell::from(int.saturating_abs())),
                CellNumber::Real(real) => Ok(Cell::from(real.abs())),
            }
        })
        .static_method("parse", &[TypeToken::String], |_cx, _subject, args| {
            let string = arg_str(args, 0)?;

            match string.trim().parse::<f64>() {
                Ok(real) => Ok(Cell::from(real)),
                Err(_) => Err(HostError::from(format!("cannot parse '{string}' as Real"))),
            }
        })
        .static_field("pi", |_cx, _subject, _args| {
            Ok(Cell::from(std::f64::consts::PI))
        })
        .static_field("e", |_cx, _subject, _args| Ok(Cell::from(std::f64::consts::E)))
        .static_field("infinity", |_cx, _subject, _args| Ok(Cell::from(f64::INFINITY)))
        .static_field("nan", |_cx, _subject, _args| Ok(Cell::from(f64::NAN)))
        .constructor(&[], |_cx, _subject, _args| Ok(Cell::from(0.0f64)))
        .context_constructor(&[TypeToken::Dynamic], |cx, _subject, args| {
            construct_converting(cx, args, builtins::real_type(), Cell::from(0.0f64))
        })
}

fn bool_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<bool>("Bool")
        .context_method("to_string", &[], subject_to_string)
        .method("equals", &[TypeToken::Dynamic], |_cx, subject, args| {
            let cell = subject_cell(subject)?;

            let left = match cell.as_bool().or_else(|| cell.foreign_ref::<bool>().copied()) {
                Some(value) => value,
                None => return Err(HostError::from("the subject is not a Bool value")),
            };

            Ok(Cell::from(arg_cell(args, 0)?.as_bool() == Some(left)))
        })
        .static_method("parse", &[TypeToken::String], |_cx, _subject, args| {
            let string = arg_str(args, 0)?;
            let trimmed = string.trim();

            if trimmed.eq_ignore_ascii_case("true") {
                return Ok(Cell::from(true));
            }

            if trimmed.eq_ignore_ascii_case("false") {
                return Ok(Cell::from(false));
            }

            Err(HostError::from(format!("cannot parse '{string}' as Bool")))
        })
        .constructor(&[], |_cx, _subject, _args| Ok(Cell::from(false)))
        .context_constructor(&[TypeToken::Dynamic], |cx, _subject, args| {
            construct_converting(cx, args, builtins::bool_type(), Cell::from(false))
        })
}

fn char_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<char>("Char")
        .context_method("to_string", &[], subject_to_string)
        .method("to_upper", &[], |_cx, subject, _args| {
            Ok(Cell::from(single_case(subject_char(subject)?, true)))
        })
        .method("to_lower", &[], |_cx, subject, _args| {
            Ok(Cell::from(single_case(subject_char(subject)?, false)))
        })
        .field("code", |_cx, subject, _args| {
            Ok(Cell::from(cast::i64(u32::from(subject_char(subject)?))))
        })
        .method("is_digit", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_char(subject)?.is_numeric()))
        })
        .method("is_letter", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_char(subject)?.is_alphabetic()))
        })
        .method("is_white_space", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_char(subject)?.is_whitespace()))
        })
        .static_method("from_code", &[TypeToken::Int], |_cx, _subject, args| {
            let code = arg_int(args, 0)?;

            let scalar = u32::try_from(code).ok().and_then(char::from_u32);

            match scalar {
                Some(ch) => Ok(Cell::from(ch)),
                None => Err(HostError::from(format!(
                    "{code} is not a Unicode scalar value",
                ))),
            }
        })
        .constructor(&[], |_cx, _subject, _args| Ok(Cell::from('\0')))
        .context_constructor(&[TypeToken::Dynamic], |cx, _subject, args| {
            construct_converting(cx, args, builtins::char_type(), Cell::from('\0'))
        })
}

fn string_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<String>("String")
        .field("length", |_cx, subject, _args| {
            int_of(subject_str(subject)?.chars().count())
        })
        .indexer_get(&[TypeToken::Int], |_cx, subject, args| {
            let string = subject_str(subject)?;
            let index = arg_index(args, 0)?;

            match string.chars().nth(index) {
                Some(ch) => Ok(Cell::from(ch)),
                None => Err(HostError::from(format!("index {index} is out of bounds"))),
            }
        })
        .context_method("to_string", &[], subject_to_string)
        .method("to_upper", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_str(subject)?.to_uppercase()))
        })
        .method("to_lower", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_str(subject)?.to_lowercase()))
        })
        .method("trim", &[], |_cx, subject, _args| {
            Ok(Cell::from(subject_str(subject)?.trim()))
        })
        .method("substring", &[TypeToken::Int], |_cx, subject, args| {
            let string = subject_str(subject)?;
            let start = arg_index(args, 0)?;

            Ok(Cell::from(string.chars().skip(start).collect::<String>()))
        })
        .method(
            "substring",
            &[TypeToken::Int, TypeToken::Int],
            |_cx, subject, args| {
                let string = subject_str(subject)?;
                let start = arg_index(args, 0)?;
                let count = arg_index(args, 1)?;

                Ok(Cell::from(
                    string.chars().skip(start).take(count).collect::<String>(),
                ))
            },
        )
        .method("contains", &[TypeToken::String], |_cx, subject, args| {
            Ok(Cell::from(subject_str(subject)?.contains(arg_str(args, 0)?)))
        })
        .method("starts_with", &[TypeToken::String], |_cx, subject, args| {
            Ok(Cell::from(
                subject_str(subject)?.starts_with(arg_str(args, 0)?),
            ))
        })
        .method("ends_with", &[TypeToken::String], |_cx, subject, args| {
            Ok(Cell::from(subject_str(subject)?.ends_with(arg_str(args, 0)?)))
        })
        .method("index_of", &[TypeToken::String], |_cx, subject, args| {
            let string = subject_str(subject)?;
            let needle = arg_str(args, 0)?;

            match string.find(needle) {
                Some(byte) => int_of(string[..byte].chars().count()),
                None => Ok(Cell::from(-1i64)),
            }
        })
        .method(
            "replace",
            &[TypeToken::String, TypeToken::String],
            |_cx, subject, args| {
                Ok(Cell::from(
                    subject_str(subject)?.replace(arg_str(args, 0)?, arg_str(args, 1)?),
                ))
            },
        )
        .method("split", &[TypeToken::String], |_cx, subject, args| {
            let string = subject_str(subject)?;
            let separator = arg_str(args, 0)?;

            if separator.is_empty() {
                return Err(HostError::from("the separator must not be empty"));
            }

            let pieces = string.split(separator).map(Cell::from).collect::<Vec<_>>();

            Ok(Cell::from(pieces))
        })
        .static_method("escape", &[TypeToken::String], |_cx, _subject, args| {
            Ok(Cell::from(ident::escape(arg_str(args, 0)?)))
        })
        .static_method("unescape", &[TypeToken::String], |_cx, _subject, args| {
            Ok(Cell::from(ident::unescape(arg_str(args, 0)?)?))
        })
        .static_method(
            "to_id_or_literal",
            &[TypeToken::String],
            |_cx, _subject, args| {
                Ok(Cell::from(ident::to_id_or_literal(arg_str(args, 0)?)))
            },
        )
        .static_method(
            "is_reserved_word",
            &[TypeToken::String],
            |_cx, _subject, args| {
                Ok(Cell::from(ident::is_reserved_word(arg_str(args, 0)?)))
            },
        )
        .static_context_method(
            "concat",
            &[TypeToken::Dynamic, TypeToken::Dynamic],
            |cx, _subject, args| {
                let mut result = CompactString::new("");

                for index in 0..args.len() {
                    if args[index].is_null() {
                        continue;
                    }

                    result.push_str(&args[index].stringify(cx)?);
                }

                Ok(Cell::from(result))
            },
        )
        .constructor(&[], |_cx, _subject, _args| Ok(Cell::from("")))
        .context_constructor(&[TypeToken::Dynamic], |cx, _subject, args| {
            let arg = arg_cell(args, 0)?;

            if arg.is_null() {
                return Ok(Cell::from(""));
            }

            Ok(Cell::from(arg.stringify(cx)?))
        })
}

fn boxed_wrapper() -> HostTypeBuilder {
    HostTypeBuilder::of::<Boxed>("Boxed")
        .field("value", |_cx, subject, _args| {
            match subject.and_then(|cell| cell.foreign_ref::<Boxed>()) {
                Some(boxed) => Ok(boxed.inner().clone()),
                None => Err(HostError::from("the subject is not a boxed value")),
            }
        })
        .context_method("to_string", &[], |cx, subject, _args| {
            match subject.and_then(|cell| cell.foreign_ref::<Boxed>()) {
                Some(boxed) => Ok(Cell::from(boxed.inner().stringify(cx)?)),
                None => Err(HostError::from("the subject is not a boxed value")),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_wrappers() {
        assert_eq!(bridge_type_of::<i64>().name(), "Int");
        assert_eq!(bridge_type_of::<f64>().name(), "Real");
        assert_eq!(bridge_type_of::<bool>().name(), "Bool");
        assert_eq!(bridge_type_of::<char>().name(), "Char");
        assert_eq!(bridge_type_of::<String>().name(), "String");
        assert_eq!(bridge_type_of::<Boxed>().name(), "Boxed");
    }

    #[test]
    fn test_fallback_wrapper() {
        struct Opaque;

        let first = bridge_type_of::<Opaque>();
        let second = bridge_type_of::<Opaque>();

        assert_eq!(first.name(), "Opaque");
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_names() {
        assert_eq!(short_name("alloc::string::String"), "String");
        assert_eq!(short_name("Opaque"), "Opaque");
        assert_eq!(short_name("alloc::vec::Vec<alloc::string::String>"), "Vec");
    }

    #[test]
    fn test_host_type_of_scalars() {
        let int = host_type_of_cell(&Cell::from(1i64));
        let real = host_type_of_cell(&Cell::from(1.0f64));

        assert_eq!(int.map(|host| host.meta.name()), Some("Int"));
        assert_eq!(real.map(|host| host.meta.name()), Some("Real"));

        assert!(host_type_of_cell(&Cell::null()).is_none());
        assert!(host_type_of_cell(&Cell::from(Vec::<Cell>::new())).is_none());
    }
}
