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

use std::any::{Any, TypeId};

use ahash::AHashMap;
use compact_str::CompactString;

use crate::{
    builtins::{self, BuiltinKind},
    interop::registry,
    runtime::{Cell, Context, Direction, HostResult, RuntimeError, RuntimeResult, TypeHandle},
};

/// The invocable shape of a registered host callee.
///
/// Every callee receives the caller's execution context, the subject value
/// (None for static members and constructors), and the marshalled argument
/// array. A callee reports failures through
/// [HostError](crate::runtime::HostError): a
/// [Script](crate::runtime::HostError::Script) payload propagates as the
/// inner error itself, a [Message](crate::runtime::HostError::Message)
/// payload becomes the details of an
/// [InvalidCall](crate::runtime::RuntimeError::InvalidCall) attributed to
/// the invoked member.
pub type HostFn = fn(&mut Context, Option<&Cell>, &mut [Cell]) -> HostResult;

/// A parameter type declaration of a registered host signature.
///
/// Tokens drive overload scoring (see [CallSite](crate::interop::CallSite)
/// and the [registry](crate::interop::HostTypeBuilder)): an argument whose
/// type matches a token exactly scores free, a widening match costs one
/// upcast, and any other pairing is presumed convertible at the cost of
/// one conversion, verified only when the candidate is actually invoked.
/// Null arguments always pass for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeToken {
    /// Accepts a value of any type. Scores as one upcast.
    Dynamic,

    /// A [Bool](crate::builtins::bool_type) value.
    Bool,

    /// An [Int](crate::builtins::int_type) value.
    Int,

    /// A [Real](crate::builtins::real_type) value. An Int argument widens
    /// into this token.
    Real,

    /// A [Char](crate::builtins::char_type) value.
    Char,

    /// A [String](crate::builtins::string_type) value.
    String,

    /// A [List](crate::builtins::list_type) value.
    List,

    /// A [Hash](crate::builtins::hash_type) value.
    Hash,

    /// A bridge value wrapping the host type with this [TypeId].
    Foreign(TypeId),
}

impl TypeToken {
    /// The token of a registered host type `T`.
    #[inline(always)]
    pub fn of<T: Any>() -> Self {
        Self::Foreign(TypeId::of::<T>())
    }

    // An exact match: the argument needs no conversion at all.
    pub(crate) fn matches(self, arg: &Cell) -> bool {
        match self {
            Self::Dynamic => false,
            Self::Bool => arg.kind() == BuiltinKind::Bool,
            Self::Int => arg.kind() == BuiltinKind::Int,
            Self::Real => arg.kind() == BuiltinKind::Real,
            Self::Char => arg.kind() == BuiltinKind::Char,
            Self::String => arg.kind() == BuiltinKind::String,
            Self::List => arg.kind() == BuiltinKind::List,
            Self::Hash => arg.kind() == BuiltinKind::Hash,

            Self::Foreign(id) => match arg.foreign_payload() {
                Some(any) => any.as_ref().type_id() == id,
                None => false,
            },
        }
    }

    // A widening match: accepted without conversion, at the cost of one
    // upcast in the score.
    pub(crate) fn widens(self, arg: &Cell) -> bool {
        match self {
            Self::Dynamic => true,
            Self::Real => arg.kind() == BuiltinKind::Int,
            _ => false,
        }
    }

    // The descriptor a presumed-convertible argument is marshalled
    // through. None when no conversion exists for the token.
    pub(crate) fn conversion_target(self) -> Option<TypeHandle> {
        match self {
            Self::Dynamic => None,
            Self::Bool => Some(builtins::bool_type()),
            Self::Int => Some(builtins::int_type()),
            Self::Real => Some(builtins::real_type()),
            Self::Char => Some(builtins::char_type()),
            Self::String => Some(builtins::string_type()),
            Self::List => Some(builtins::list_type()),
            Self::Hash => Some(builtins::hash_type()),
            Self::Foreign(id) => registry::registered_handle(id),
        }
    }
}

// One registered overload of a host member.
//
// Field variants bypass arity checks and marshalling, and score best
// unconditionally. The `injects` flag declares the host calling
// convention that consumes the execution context: such variants lose
// score ties to same-signature variants without the flag.
pub(crate) struct Variant {
    pub(crate) field: bool,
    pub(crate) injects: bool,
    pub(crate) params: Vec<TypeToken>,
    pub(crate) invoke: HostFn,
}

impl Variant {
    pub(crate) fn method(params: &[TypeToken], injects: bool, invoke: HostFn) -> Self {
        Self {
            field: false,
            injects,
            params: params.to_vec(),
            invoke,
        }
    }

    pub(crate) fn field_access(invoke: HostFn) -> Self {
        Self {
            field: true,
            injects: false,
            params: Vec::new(),
            invoke,
        }
    }
}

// A named host member: the union of every shape registered under one
// name. Which shape list serves a call depends on the call direction and
// the calling directive.
pub(crate) struct Member {
    pub(crate) display: CompactString,
    pub(crate) getters: Vec<Variant>,
    pub(crate) setters: Vec<Variant>,
    pub(crate) adders: Vec<Variant>,
    pub(crate) removers: Vec<Variant>,
    pub(crate) raisers: Vec<Variant>,
    pub(crate) indexer: bool,
}

impl Member {
    fn new(display: &str) -> Self {
        Self {
            display: CompactString::from(display),
            getters: Vec::new(),
            setters: Vec::new(),
            adders: Vec::new(),
            removers: Vec::new(),
            raisers: Vec::new(),
            indexer: false,
        }
    }
}

/// A calling directive: the `\Name` suffix of a member name selecting a
/// non-default interpretation of the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    None,
    Add,
    Remove,
    Raise,
}

// Splits a call name into the base member name and its directive.
//
// The empty base name addresses the default member (indexer), which
// never accepts a directive suffix.
pub(crate) fn split_directive(
    receiver: TypeHandle,
    name: &str,
) -> RuntimeResult<(&str, Directive)> {
    let Some((base, suffix)) = name.rsplit_once('\\') else {
        return Ok((name, Directive::None));
    };

    if base.is_empty() {
        return Err(RuntimeError::invalid_call(
            receiver,
            name,
            "the default member path does not accept calling directives",
        ));
    }

    let directive = if suffix.eq_ignore_ascii_case("add") {
        Directive::Add
    } else if suffix.eq_ignore_ascii_case("remove") {
        Directive::Remove
    } else if suffix.eq_ignore_ascii_case("raise") {
        Directive::Raise
    } else {
        return Err(RuntimeError::invalid_call(
            receiver,
            name,
            format!("unknown calling directive '{suffix}'"),
        ));
    };

    Ok((base, directive))
}

// The member table of one registered host type (instance or static side).
#[derive(Default)]
pub(crate) struct MemberTable {
    entries: AHashMap<CompactString, Member>,
}

impl MemberTable {
    // Member names are case-insensitive: entries are keyed by the
    // lower-cased registration name.
    pub(crate) fn entry(&mut self, name: &str) -> &mut Member {
        self.entries
            .entry(CompactString::from(name.to_ascii_lowercase()))
            .or_insert_with(|| Member::new(name))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn contains(&self, base: &str) -> bool {
        self.entries.contains_key(base.to_ascii_lowercase().as_str())
    }

    pub(crate) fn has_indexer(&self) -> bool {
        self.entries.values().any(|member| member.indexer)
            || self.entries.contains_key("item")
    }

    pub(crate) fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|member| member.display.as_str())
    }

    // The candidate set of one dispatch attempt, or None when the name
    // (or the name-directive-direction combination) is not served.
    pub(crate) fn variants(
        &self,
        base: &str,
        directive: Directive,
        direction: Direction,
    ) -> Option<&[Variant]> {
        let member = match base.is_empty() {
            // The default-member path narrows to members flagged as
            // default indexers, or literally named "item".
            true => self
                .entries
                .values()
                .find(|member| member.indexer)
                .or_else(|| self.entries.get("item"))?,

            false => self.entries.get(base.to_ascii_lowercase().as_str())?,
        };

        let variants = match (directive, direction) {
            // A bare read of an event member raises it.
            (Directive::None, Direction::Get) => match member.getters.is_empty() {
                false => &member.getters,
                true => &member.raisers,
            },

            (Directive::None, Direction::Set) => &member.setters,

            (Directive::Add, Direction::Get) => &member.adders,
            (Directive::Remove, Direction::Get) => &member.removers,
            (Directive::Raise, Direction::Get) => &member.raisers,

            // Directives are invocations: they never combine with a
            // member write.
            _ => return None,
        };

        match variants.is_empty() {
            true => None,
            false => Some(variants),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matching() {
        assert!(TypeToken::Int.matches(&Cell::from(5i64)));
        assert!(!TypeToken::Int.matches(&Cell::from(5.0f64)));
        assert!(!TypeToken::Dynamic.matches(&Cell::from(5i64)));

        assert!(TypeToken::Dynamic.widens(&Cell::from("x")));
        assert!(TypeToken::Real.widens(&Cell::from(5i64)));
        assert!(!TypeToken::Real.widens(&Cell::from("x")));

        assert!(!TypeToken::of::<std::fs::File>().matches(&Cell::foreign(7i64)));
        assert!(TypeToken::of::<i64>().matches(&Cell::foreign(7i64)));
    }

    #[test]
    fn test_directive_splitting() {
        let receiver = crate::builtins::string_type();

        assert_eq!(
            split_directive(receiver, "on_change").unwrap(),
            ("on_change", Directive::None),
        );

        assert_eq!(
            split_directive(receiver, "on_change\\Add").unwrap(),
            ("on_change", Directive::Add),
        );

        assert_eq!(
            split_directive(receiver, "on_change\\raise").unwrap(),
            ("on_change", Directive::Raise),
        );

        assert_eq!(split_directive(receiver, "").unwrap(), ("", Directive::None));

        assert!(split_directive(receiver, "\\Raise").is_err());
        assert!(split_directive(receiver, "on_change\\Shake").is_err());
        assert!(split_directive(receiver, "on_change\\").is_err());
    }
}
