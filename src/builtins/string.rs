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
    interop,
    runtime::{
        convert,
        Cell,
        Context,
        Direction,
        Narrowing,
        Operator,
        RuntimeError,
        RuntimeResult,
        ScriptType,
        TypeMeta,
    },
};

static META: TypeMeta = TypeMeta::new("String", BuiltinKind::String);

/// The descriptor of immutable strings.
///
/// String is the universal conversion target: the
/// [convert_from](ScriptType::convert_from) hook renders any value
/// through its display form, which makes
/// [stringify](crate::runtime::Cell::stringify) total over the built-in
/// family.
///
/// Addition stringifies both operands and concatenates. Multiplication
/// takes one String and one Int operand and repeats the string, failing
/// on negative and oversized counts rather than clamping. Increment
/// duplicates the string, decrement truncates it to its first half.
/// Member dispatch delegates to the interop bridge wrapper of the host
/// `String` type.
pub(super) struct StringType;

impl ScriptType for StringType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::from("")),

            [arg] => convert(cx, arg, super::string_type(), Narrowing::Allow),

            _ => Err(RuntimeError::invalid_call(
                super::string_type(),
                "new",
                "expected zero or one argument",
            )),
        }
    }

    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        interop::bridge_type_of::<String>()
            .get()
            .try_dynamic_call(cx, subject, args, direction, name)
    }

    fn try_static_call(
        &self,
        cx: &mut Context,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        interop::bridge_type_of::<String>()
            .get()
            .try_static_call(cx, args, direction, name)
    }

    fn convert_from(
        &self,
        _cx: &mut Context,
        value: &Cell,
        _narrowing: Narrowing,
    ) -> RuntimeResult<Option<Cell>> {
        Ok(Some(Cell::from(value.to_compact_string())))
    }

    fn try_unary(
        &self,
        _cx: &mut Context,
        op: Operator,
        operand: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        let Some(text) = operand.as_str() else {
            return Ok(None);
        };

        match op {
            Operator::Inc => {
                let mut doubled = String::with_capacity(text.len() * 2);

                doubled.push_str(text);
                doubled.push_str(text);

                Ok(Some(Cell::from(doubled)))
            }

            Operator::Dec => {
                let half = text.chars().count() / 2;
                let truncated: String = text.chars().take(half).collect();

                Ok(Some(Cell::from(truncated)))
            }

            _ => Ok(None),
        }
    }

    fn try_binary(
        &self,
        cx: &mut Context,
        op: Operator,
        lhs: &Cell,
        rhs: &Cell,
    ) -> RuntimeResult<Option<Cell>> {
        match op {
            Operator::Add => {
                let text = format!("{}{}", lhs.stringify(cx)?, rhs.stringify(cx)?);

                Ok(Some(Cell::from(text)))
            }

            Operator::Mul => {
                let (text, count) = match (lhs.as_str(), rhs.as_str()) {
                    (Some(text), None) => (text, rhs.as_int()),
                    (None, Some(text)) => (text, lhs.as_int()),
                    _ => return Ok(None),
                };

                let Some(count) = count else {
                    return Ok(None);
                };

                if count < 0 {
                    return Err(RuntimeError::invalid_call(
                        super::string_type(),
                        op.host_name(),
                        "cannot repeat a string a negative number of times",
                    ));
                }

                let Some(count) = repeat_count(text, count) else {
                    return Err(RuntimeError::invalid_call(
                        super::string_type(),
                        op.host_name(),
                        format!(
                            "a string of length {} cannot be repeated {count} times",
                            text.len(),
                        ),
                    ));
                };

                Ok(Some(Cell::from(text.repeat(count))))
            }

            // Null retains its own equality rules: `null == ""` is false.
            Operator::Eq | Operator::Ne if lhs.is_null() || rhs.is_null() => Ok(None),

            Operator::Eq => {
                let equal = lhs.stringify(cx)? == rhs.stringify(cx)?;

                Ok(Some(Cell::from(equal)))
            }

            Operator::Ne => {
                let unequal = lhs.stringify(cx)? != rhs.stringify(cx)?;

                Ok(Some(Cell::from(unequal)))
            }

            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) else {
                    return Ok(None);
                };

                let result = match op {
                    Operator::Lt => a < b,
                    Operator::Le => a <= b,
                    Operator::Gt => a > b,
                    _ => a >= b,
                };

                Ok(Some(Cell::from(result)))
            }

            _ => Ok(None),
        }
    }
}

// The repetition count as a capacity-checked usize. Buffer requests past
// the allocatable range panic rather than fail, so a count whose repeated
// length would overflow it is rejected here.
fn repeat_count(text: &str, count: i64) -> Option<usize> {
    let count = cast::usize(count).ok()?;
    let length = text.len().checked_mul(count)?;

    match cast::isize(length) {
        Ok(_) => Some(count),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        builtins,
        runtime::{Cell, Context},
    };

    #[test]
    fn test_string_concatenation() {
        let mut cx = Context::new();

        let text = Cell::from("ab").add(&mut cx, &Cell::from("cd")).unwrap();
        assert_eq!(text.as_str(), Some("abcd"));

        let text = Cell::from("n = ").add(&mut cx, &Cell::from(5i64)).unwrap();
        assert_eq!(text.as_str(), Some("n = 5"));

        let text = Cell::from(5i64).add(&mut cx, &Cell::from("!")).unwrap();
        assert_eq!(text.as_str(), Some("5!"));
    }

    #[test]
    fn test_string_repetition() {
        let mut cx = Context::new();

        let text = Cell::from("ab").mul(&mut cx, &Cell::from(3i64)).unwrap();
        assert_eq!(text.as_str(), Some("ababab"));

        let text = Cell::from(3i64).mul(&mut cx, &Cell::from("ab")).unwrap();
        assert_eq!(text.as_str(), Some("ababab"));

        let empty = Cell::from("ab").mul(&mut cx, &Cell::from(0i64)).unwrap();
        assert_eq!(empty.as_str(), Some(""));

        let error = Cell::from("ab")
            .mul(&mut cx, &Cell::from(-1i64))
            .unwrap_err();
        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_string_repetition_overflow() {
        let mut cx = Context::new();

        // A repeated length beyond the allocatable range fails instead
        // of aborting the host.
        let error = Cell::from("ab")
            .mul(&mut cx, &Cell::from(i64::MAX))
            .unwrap_err();
        assert!(error.is_invalid_call());

        let error = Cell::from("abc")
            .mul(&mut cx, &Cell::from(i64::MAX))
            .unwrap_err();
        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_string_duplication_and_truncation() {
        let mut cx = Context::new();

        let doubled = Cell::from("ab").increment(&mut cx).unwrap();
        assert_eq!(doubled.as_str(), Some("abab"));

        let halved = Cell::from("abcd").decrement(&mut cx).unwrap();
        assert_eq!(halved.as_str(), Some("ab"));

        let halved = Cell::from("abc").decrement(&mut cx).unwrap();
        assert_eq!(halved.as_str(), Some("a"));
    }

    #[test]
    fn test_string_equality_stringifies() {
        let mut cx = Context::new();

        let equal = Cell::from("5").equal(&mut cx, &Cell::from(5i64)).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let equal = Cell::from(5i64).equal(&mut cx, &Cell::from("5")).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        // The empty string never equals null.
        let equal = Cell::from("").equal(&mut cx, &Cell::null()).unwrap();
        assert_eq!(equal.as_bool(), Some(false));

        let unequal = Cell::null().not_equal(&mut cx, &Cell::from("")).unwrap();
        assert_eq!(unequal.as_bool(), Some(true));
    }

    #[test]
    fn test_string_ordering() {
        let mut cx = Context::new();

        let less = Cell::from("abc").less(&mut cx, &Cell::from("abd")).unwrap();
        assert_eq!(less.as_bool(), Some(true));

        let greater = Cell::from("b").greater(&mut cx, &Cell::from("a")).unwrap();
        assert_eq!(greater.as_bool(), Some(true));
    }

    #[test]
    fn test_string_construction() {
        let mut cx = Context::new();

        let empty = builtins::string_type().construct(&mut cx, &mut []).unwrap();
        assert_eq!(empty.as_str(), Some(""));

        let rendered = builtins::string_type()
            .construct(&mut cx, &mut [Cell::from(2.5f64)])
            .unwrap();
        assert_eq!(rendered.as_str(), Some("2.5"));
    }
}
