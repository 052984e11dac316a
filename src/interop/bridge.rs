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

use compact_str::ToCompactString;

use crate::{
    builtins::BuiltinKind,
    interop::{
        member::Directive,
        registry::{Boxed, HostType},
        resolve,
    },
    runtime::{
        convert,
        Cell,
        Context,
        Direction,
        Narrowing,
        RuntimeError,
        RuntimeResult,
        ScriptType,
        TypeHandle,
        TypeMeta,
    },
};

const BOXED: &str = "\\boxed";
const IMPLEMENTS: &str = "\\implements";

impl ScriptType for HostType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        self.meta
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        if self.constructors.is_empty() {
            return Err(RuntimeError::invalid_call(
                self.handle(),
                "",
                format!("the {} type has no constructors", self.meta.name()),
            ));
        }

        resolve::dispatch(cx, self.handle(), "", &self.constructors, None, args)
    }

    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        // Checked here as well as in the cell-level prelude, so direct
        // descriptor calls observe the intrinsics too.
        if let Some(result) = intrinsic_call(cx, subject, args, name)? {
            return Ok(result);
        }

        let variants = self.instance_variants(direction, name)?;

        resolve::dispatch(cx, self.handle(), name, variants, Some(subject), args)
    }

    fn try_static_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        let variants = self.static_variants(direction, name)?;

        resolve::dispatch(cx, self.handle(), name, variants, None, args)
    }

    fn convert_to(
        &self,
        cx: &mut Context,
        value: &Cell,
        target: TypeHandle,
        narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        // Primitive wrappers convert by unwrapping into the built-in
        // counterpart and converting onward as that counterpart, so the
        // canonical numeric and rendering rules live in one place.
        if let Some(unwrapped) = unwrap_primitive(value) {
            if unwrapped.ty() == target {
                return Ok(Some(unwrapped));
            }

            return Ok(Some(convert(cx, &unwrapped, target, narrowing)?));
        }

        match target.kind() {
            // A host object is truthy.
            BuiltinKind::Bool => match narrowing {
                Narrowing::Allow => Ok(Some(Cell::from(true))),
                Narrowing::Deny => Ok(None),
            },

            BuiltinKind::String => {
                let registered = self
                    .instance
                    .variants("to_string", Directive::None, Direction::Get)
                    .is_some();

                if !registered {
                    return Ok(None);
                }

                let result =
                    self.try_dynamic_call(cx, value, &mut [], Direction::Get, "to_string")?;

                Ok(Some(match result.as_str() {
                    Some(_) => result,
                    None => Cell::from(result.to_compact_string()),
                }))
            }

            _ => Ok(None),
        }
    }

    fn convert_from(
        &self,
        _cx: &mut Context,
        value: &Cell,
        _narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        if self.id == std::any::TypeId::of::<i64>() {
            if let Some(int) = value.as_int() {
                return Ok(Some(Cell::foreign(int)));
            }
        }

        if self.id == std::any::TypeId::of::<f64>() {
            if let Some(real) = value.as_real() {
                return Ok(Some(Cell::foreign(real)));
            }

            if let Some(int) = value.as_int() {
                return Ok(Some(Cell::foreign(cast::f64(int))));
            }
        }

        if self.id == std::any::TypeId::of::<bool>() {
            if let Some(flag) = value.as_bool() {
                return Ok(Some(Cell::foreign(flag)));
            }
        }

        if self.id == std::any::TypeId::of::<char>() {
            if let Some(ch) = value.as_char() {
                return Ok(Some(Cell::foreign(ch)));
            }
        }

        if self.id == std::any::TypeId::of::<String>() {
            if let Some(string) = value.as_str() {
                return Ok(Some(Cell::foreign(String::from(string))));
            }
        }

        Ok(None)
    }
}

// The intrinsic members available on every value ahead of any member
// lookup, so no registration can shadow them: `\boxed` pins the subject
// behind the opaque [Boxed] wrapper, and `\implements` probes the
// subject's type name.
pub(crate) fn intrinsic_call(
    cx: &mut Context,
    subject: &Cell,
    args: &mut [Cell],
    name: &str,
) -> RuntimeResult<Option<Cell>> {
    if name.eq_ignore_ascii_case(BOXED) {
        return Ok(Some(Cell::foreign(Boxed::new(subject.clone()))));
    }

    if name.eq_ignore_ascii_case(IMPLEMENTS) {
        return Ok(Some(implements(cx, subject, args)?));
    }

    Ok(None)
}

// Unwraps a bridge value of one of the host primitive types into its
// built-in counterpart.
fn unwrap_primitive(value: &Cell) -> Option<Cell> {
    if let Some(int) = value.foreign_ref::<i64>() {
        return Some(Cell::from(*int));
    }

    if let Some(real) = value.foreign_ref::<f64>() {
        return Some(Cell::from(*real));
    }

    if let Some(flag) = value.foreign_ref::<bool>() {
        return Some(Cell::from(*flag));
    }

    if let Some(ch) = value.foreign_ref::<char>() {
        return Some(Cell::from(*ch));
    }

    if let Some(string) = value.foreign_ref::<String>() {
        return Some(Cell::from(string.as_str()));
    }

    None
}

// The `\implements` intrinsic: true if the subject's type name matches
// every argument, case-insensitively.
fn implements(cx: &mut Context, subject: &Cell, args: &mut [Cell]) -> RuntimeResult<Cell> {
    if args.is_empty() {
        return Err(RuntimeError::invalid_call(
            subject.ty(),
            IMPLEMENTS,
            "expected at least one type name argument",
        ));
    }

    let name = subject.ty().name();

    for arg in args.iter() {
        let token = arg.stringify(cx)?;

        if !token.eq_ignore_ascii_case(name) {
            return Ok(Cell::from(false));
        }
    }

    Ok(Cell::from(true))
}
