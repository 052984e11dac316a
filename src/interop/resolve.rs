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

use std::sync::OnceLock;

use compact_str::{CompactString, ToCompactString};
use log::trace;
use strsim::normalized_damerau_levenshtein;

use crate::{
    interop::{
        member::{TypeToken, Variant},
        registry,
    },
    runtime::{
        convert,
        Cell,
        Context,
        Direction,
        HostError,
        Narrowing,
        RuntimeError,
        RuntimeResult,
        TypeHandle,
    },
};

// The preference of one applicable overload candidate. Candidates order
// lexicographically over the three components, lower is better, so a
// candidate that avoids context injection always beats one that needs
// it, then fewer presumed conversions win, then fewer upcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Score {
    injects: bool,
    conversions: u32,
    upcasts: u32,
}

impl Score {
    const BEST: Self = Self {
        injects: false,
        conversions: 0,
        upcasts: 0,
    };
}

// Scores one candidate against the actual arguments, or rejects it.
//
// Null arguments pass into any parameter for free. A type-locked
// argument accepts exact and widening parameter matches only, while an
// unlocked argument is presumed convertible into anything at the cost of
// one conversion. The presumption is verified when the candidate is
// actually invoked.
fn score(variant: &Variant, args: &[Cell]) -> Option<Score> {
    if variant.field {
        return Some(Score::BEST);
    }

    if variant.params.len() != args.len() {
        return None;
    }

    let mut conversions = 0;
    let mut upcasts = 0;

    for (token, arg) in variant.params.iter().zip(args.iter()) {
        if arg.is_null() || token.matches(arg) {
            continue;
        }

        if token.widens(arg) {
            upcasts += 1;
            continue;
        }

        if arg.is_type_locked() {
            return None;
        }

        conversions += 1;
    }

    Some(Score {
        injects: variant.injects,
        conversions,
        upcasts,
    })
}

// All applicable candidates, best first. The sort is stable, so equally
// scored candidates keep their registration order.
pub(crate) fn rank<'a>(variants: &'a [Variant], args: &[Cell]) -> Vec<(&'a Variant, Score)> {
    let mut ranked = variants
        .iter()
        .filter_map(|variant| score(variant, args).map(|score| (variant, score)))
        .collect::<Vec<_>>();

    ranked.sort_by_key(|(_, score)| *score);

    ranked
}

// Converts the actual arguments into the declared parameter shapes. A
// presumed conversion that fails here rejects the candidate, and the
// caller falls through to the next one.
fn marshal(cx: &mut Context, variant: &Variant, args: &[Cell]) -> RuntimeResult<Vec<Cell>> {
    if variant.field {
        return Ok(args.to_vec());
    }

    let mut marshalled = Vec::with_capacity(args.len());

    for (token, arg) in variant.params.iter().zip(args.iter()) {
        if arg.is_null() || matches!(token, TypeToken::Dynamic) || token.matches(arg) {
            marshalled.push(arg.clone());
            continue;
        }

        let Some(target) = token.conversion_target() else {
            return Err(RuntimeError::Conversion {
                from: CompactString::from(arg.ty().name()),
                to: CompactString::from("an unregistered host type"),
                value: arg.to_compact_string(),
            });
        };

        marshalled.push(convert(cx, arg, target, Narrowing::Deny)?);
    }

    Ok(marshalled)
}

// Invokes a host callee with already-marshalled arguments, translating
// the host error convention into runtime errors.
pub(crate) fn call_host(
    cx: &mut Context,
    receiver: TypeHandle,
    name: &str,
    variant: &Variant,
    subject: Option<&Cell>,
    mut args: Vec<Cell>,
) -> RuntimeResult<Cell> {
    match (variant.invoke)(cx, subject, &mut args) {
        Ok(result) => Ok(result),

        Err(HostError::Script(error)) => Err(error),

        Err(HostError::Message(message)) => {
            Err(RuntimeError::invalid_call(receiver, name, message))
        }
    }
}

// Invokes the ranked candidates in order. The first candidate whose
// argument conversions all succeed produces the call result, better
// candidates rejected by a failed conversion are skipped, and a
// non-conversion error aborts the chain immediately.
pub(crate) fn dispatch_ranked(
    cx: &mut Context,
    receiver: TypeHandle,
    name: &str,
    ranked: Vec<(&Variant, Score)>,
    subject: Option<&Cell>,
    args: &[Cell],
) -> RuntimeResult<Cell> {
    let mut declined = None;

    for (variant, _) in ranked {
        let marshalled = match marshal(cx, variant, args) {
            Ok(marshalled) => marshalled,

            Err(error) if error.is_conversion() => {
                trace!("{name} overload candidate declined. {error}");

                declined = Some(error);
                continue;
            }

            Err(error) => return Err(error),
        };

        return call_host(cx, receiver, name, variant, subject, marshalled);
    }

    let message = match declined {
        Some(error) => error.to_compact_string(),
        None => CompactString::from("no overload accepts the arguments"),
    };

    Err(RuntimeError::invalid_call(receiver, name, message))
}

// Full overload dispatch over a member's registered candidate set.
pub(crate) fn dispatch(
    cx: &mut Context,
    receiver: TypeHandle,
    name: &str,
    variants: &[Variant],
    subject: Option<&Cell>,
    args: &[Cell],
) -> RuntimeResult<Cell> {
    let ranked = rank(variants, args);

    if ranked.is_empty() {
        return Err(RuntimeError::invalid_call(
            receiver,
            name,
            format!("no overload accepts {} argument(s)", args.len()),
        ));
    }

    dispatch_ranked(cx, receiver, name, ranked, subject, args)
}

/// A write-once cache of a resolved member call.
///
/// Hosts that issue the same member call repeatedly (a compiled call
/// instruction, a hot interpreter loop) keep one `CallSite` per call
/// expression. The first resolution against a bridge-served subject that
/// yields exactly one applicable candidate is pinned into the site, and
/// later invocations with a subject of the same type skip both the member
/// lookup and the overload ranking.
///
/// A subject of a different type than the pinned one, a subject that is
/// not served by the [interop registry](crate::interop::HostTypeBuilder),
/// and a resolution with several applicable candidates all take the
/// ordinary dispatch path. A pinned candidate that fails to convert its
/// arguments reports the failure as an error rather than re-resolving.
///
/// ```
/// use altair::{
///     interop::CallSite,
///     runtime::{Cell, Context, Direction},
/// };
///
/// let mut cx = Context::new();
/// let site = CallSite::new("length", Direction::Get);
///
/// let first = site.invoke(&mut cx, &Cell::from("hello"), &mut []).unwrap();
/// let second = site.invoke(&mut cx, &Cell::from("worlds!"), &mut []).unwrap();
///
/// assert_eq!(first.as_int(), Some(5));
/// assert_eq!(second.as_int(), Some(7));
/// ```
pub struct CallSite {
    name: CompactString,
    direction: Direction,
    cached: OnceLock<(TypeHandle, &'static Variant)>,
}

impl CallSite {
    /// Creates an unresolved call site for the member `name`.
    #[inline(always)]
    pub fn new(name: impl Into<CompactString>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            cached: OnceLock::new(),
        }
    }

    /// The member name this site calls.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once a resolution has been pinned into this site.
    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Invokes the member on `subject`, reusing the pinned resolution
    /// when the subject's type matches it.
    pub fn invoke(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
    ) -> RuntimeResult<Cell> {
        if let Some((ty, variant)) = self.cached.get() {
            if *ty == subject.ty() {
                if !variant.field && variant.params.len() != args.len() {
                    return Err(RuntimeError::invalid_call(
                        subject.ty(),
                        self.name.as_str(),
                        format!(
                            "the resolved overload takes {} argument(s), got {}",
                            variant.params.len(),
                            args.len(),
                        ),
                    ));
                }

                let marshalled = marshal(cx, variant, args)?;

                return call_host(
                    cx,
                    subject.ty(),
                    &self.name,
                    variant,
                    Some(subject),
                    marshalled,
                );
            }
        }

        // Intrinsic names (a leading backslash) never resolve through
        // member tables.
        if self.name.starts_with('\\') {
            return subject.dynamic_call(cx, args, self.direction, &self.name);
        }

        let Some(host) = registry::host_type_of_cell(subject) else {
            trace!(
                "{} call site falls back to dynamic dispatch of {}.",
                self.name,
                subject.ty().name(),
            );

            return subject.dynamic_call(cx, args, self.direction, &self.name);
        };

        let variants = host.instance_variants(self.direction, &self.name)?;
        let ranked = rank(variants, args);

        if ranked.is_empty() {
            return Err(RuntimeError::invalid_call(
                subject.ty(),
                self.name.as_str(),
                format!("no overload accepts {} argument(s)", args.len()),
            ));
        }

        if let [(variant, _)] = ranked.as_slice() {
            let _ = self.cached.set((subject.ty(), *variant));
        }

        dispatch_ranked(cx, subject.ty(), &self.name, ranked, Some(subject), args)
    }
}

// Picks the registered name closest to the requested one, for the
// "did you mean" part of unknown-member diagnostics. Names further than
// half the edit distance away are not worth suggesting.
pub(crate) fn closest<'a>(
    pattern: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    const THRESHOLD: f64 = 0.5;

    let pattern = pattern.to_ascii_lowercase();

    let mut best = THRESHOLD;
    let mut found = None;

    for candidate in candidates {
        let estimation =
            normalized_damerau_levenshtein(&pattern, &candidate.to_ascii_lowercase());

        if estimation > best {
            best = estimation;
            found = Some(candidate);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::member::TypeToken;

    fn tag(name: &'static str) -> Cell {
        Cell::from(name)
    }

    fn int_overload(
        _cx: &mut Context,
        _subject: Option<&Cell>,
        _args: &mut [Cell],
    ) -> crate::runtime::HostResult {
        Ok(tag("int"))
    }

    fn dynamic_overload(
        _cx: &mut Context,
        _subject: Option<&Cell>,
        _args: &mut [Cell],
    ) -> crate::runtime::HostResult {
        Ok(tag("dynamic"))
    }

    fn list_overload(
        _cx: &mut Context,
        _subject: Option<&Cell>,
        _args: &mut [Cell],
    ) -> crate::runtime::HostResult {
        Ok(tag("list"))
    }

    fn string_overload(
        _cx: &mut Context,
        _subject: Option<&Cell>,
        args: &mut [Cell],
    ) -> crate::runtime::HostResult {
        Ok(args[0].clone())
    }

    #[test]
    fn test_exact_beats_widening() {
        let variants = [
            Variant::method(&[TypeToken::Dynamic], false, dynamic_overload),
            Variant::method(&[TypeToken::Int], false, int_overload),
        ];

        let mut cx = Context::new();
        let receiver = crate::builtins::int_type();

        let result = dispatch(
            &mut cx,
            receiver,
            "f",
            &variants,
            None,
            &[Cell::from(5i64)],
        )
        .unwrap();

        assert_eq!(result.as_str(), Some("int"));
    }

    #[test]
    fn test_injection_loses_ties() {
        let variants = [
            Variant::method(&[TypeToken::Int], true, dynamic_overload),
            Variant::method(&[TypeToken::Int], false, int_overload),
        ];

        let mut cx = Context::new();
        let receiver = crate::builtins::int_type();

        let result = dispatch(
            &mut cx,
            receiver,
            "g",
            &variants,
            None,
            &[Cell::from(5i64)],
        )
        .unwrap();

        assert_eq!(result.as_str(), Some("int"));

        // Without a competitor, the injecting candidate serves the call.
        let alone = [Variant::method(&[TypeToken::Int], true, dynamic_overload)];

        let result = dispatch(&mut cx, receiver, "g", &alone, None, &[Cell::from(5i64)])
            .unwrap();

        assert_eq!(result.as_str(), Some("dynamic"));
    }

    #[test]
    fn test_failed_conversion_falls_through() {
        let variants = [
            Variant::method(&[TypeToken::List], false, list_overload),
            Variant::method(&[TypeToken::String], false, string_overload),
        ];

        let mut cx = Context::new();
        let receiver = crate::builtins::int_type();

        // An unlocked Int presumes one conversion for both candidates.
        // The List candidate is tried first (registration order) and
        // rejected when the conversion fails, then the String candidate
        // receives the converted argument.
        let arg = Cell::from(5i64).with_type_locked(false);

        let result = dispatch(&mut cx, receiver, "h", &variants, None, &[arg]).unwrap();

        assert_eq!(result.as_str(), Some("5"));
    }

    #[test]
    fn test_locked_argument_rejects_conversion() {
        let variants = [Variant::method(&[TypeToken::String], false, string_overload)];

        let mut cx = Context::new();
        let receiver = crate::builtins::int_type();

        let error = dispatch(
            &mut cx,
            receiver,
            "h",
            &variants,
            None,
            &[Cell::from(5i64)],
        )
        .unwrap_err();

        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_null_argument_passes_any_parameter() {
        let variants = [Variant::method(&[TypeToken::String], false, string_overload)];

        let mut cx = Context::new();
        let receiver = crate::builtins::int_type();

        let result = dispatch(&mut cx, receiver, "h", &variants, None, &[Cell::null()])
            .unwrap();

        assert!(result.is_null());
    }

    #[test]
    fn test_closest_candidate() {
        let names = ["length", "substring", "contains"];

        assert_eq!(closest("lenth", names.iter().copied()), Some("length"));
        assert_eq!(closest("Substring", names.iter().copied()), Some("substring"));
        assert_eq!(closest("qqqqq", names.iter().copied()), None);
    }
}
