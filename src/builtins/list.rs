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

use crate::{
    builtins::BuiltinKind,
    runtime::{
        convert,
        lock,
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

static META: TypeMeta = TypeMeta::new("List", BuiltinKind::List);

// The fixed member table. The empty name is the default indexer.
const MEMBERS: &[&str] = &[
    "add",
    "add_range",
    "clear",
    "contains",
    "count",
    "index_of",
    "insert",
    "length",
    "remove",
    "remove_at",
    "reverse",
    "to_string",
];

/// The descriptor of mutable element sequences.
///
/// Lists are reference values: duplicating a cell aliases the same
/// underlying storage. Addition always allocates a new list, flattening
/// any List operand's elements into it and appending a non-List operand
/// as a single element, so `list + list` concatenates while
/// `list + scalar` appends one item.
pub(super) struct ListType;

impl ScriptType for ListType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, _cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        Ok(Cell::from(args.to_vec()))
    }

    fn try_dynamic_call(
        &self,
        cx: &mut Context,
        subject: &Cell,
        args: &mut [Cell],
        direction: Direction,
        name: &str,
    ) -> RuntimeResult<Cell> {
        let Some(list) = subject.list_payload() else {
            return Err(RuntimeError::invalid_call(
                super::list_type(),
                name,
                "the subject is not a list",
            ));
        };

        if name.is_empty() {
            return match (direction, args) {
                (Direction::Get, [index]) => {
                    let index = index_arg(cx, index, lock(list).len())?;

                    Ok(lock(list)[index].clone())
                }

                (Direction::Set, [index, value]) => {
                    let index = index_arg(cx, index, lock(list).len())?;

                    lock(list)[index] = value.clone();

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "the list indexer takes an index argument and, \
                    when writing, a value",
                )),
            };
        }

        if let Direction::Set = direction {
            return Err(RuntimeError::invalid_call(
                super::list_type(),
                name,
                "list members are not writable",
            ));
        }

        match name.to_ascii_lowercase().as_str() {
            "length" | "count" => Ok(Cell::from(lock(list).len() as i64)),

            "add" => {
                lock(list).extend(args.iter().cloned());

                Ok(Cell::null())
            }

            "add_range" => {
                for arg in args.iter() {
                    let Some(items) = arg.list_items() else {
                        return Err(RuntimeError::invalid_call(
                            super::list_type(),
                            name,
                            "add_range expects list arguments",
                        ));
                    };

                    lock(list).extend(items);
                }

                Ok(Cell::null())
            }

            "insert" => match args {
                [index, value] => {
                    let limit = lock(list).len() + 1;
                    let index = index_arg(cx, index, limit)?;

                    lock(list).insert(index, value.clone());

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "insert expects an index and a value",
                )),
            },

            "clear" => {
                lock(list).clear();

                Ok(Cell::null())
            }

            "contains" => match args {
                [value] => {
                    let position = position_of(cx, subject, value)?;

                    Ok(Cell::from(position.is_some()))
                }

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "contains expects a single argument",
                )),
            },

            "index_of" => match args {
                [value] => {
                    let position = position_of(cx, subject, value)?;

                    match position {
                        Some(index) => Ok(Cell::from(index as i64)),
                        None => Ok(Cell::from(-1i64)),
                    }
                }

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "index_of expects a single argument",
                )),
            },

            "remove" => match args {
                [value] => match position_of(cx, subject, value)? {
                    Some(index) => {
                        lock(list).remove(index);

                        Ok(Cell::from(true))
                    }

                    None => Ok(Cell::from(false)),
                },

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "remove expects a single argument",
                )),
            },

            "remove_at" => match args {
                [index] => {
                    let index = index_arg(cx, index, lock(list).len())?;

                    lock(list).remove(index);

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::list_type(),
                    name,
                    "remove_at expects an index argument",
                )),
            },

            "reverse" => {
                lock(list).reverse();

                Ok(Cell::null())
            }

            "to_string" => Ok(Cell::from(subject.stringify(cx)?)),

            _ => Err(super::unknown_member(super::list_type(), name, MEMBERS)),
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
            super::list_type(),
            name,
            "the List type has no static members",
        ))
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
                let mut joined = match lhs.list_items() {
                    Some(items) => items,
                    None => vec![lhs.clone()],
                };

                match rhs.list_items() {
                    Some(items) => joined.extend(items),
                    None => joined.push(rhs.clone()),
                }

                Ok(Some(Cell::from(joined)))
            }

            Operator::Eq | Operator::Ne => {
                let equal = match (lhs.list_items(), rhs.list_items()) {
                    (Some(a), Some(b)) => {
                        cx.enter("List")?;

                        let result = elements_equal(cx, &a, &b);

                        cx.leave();

                        result?
                    }

                    // A list never equals a value of another kind.
                    _ => false,
                };

                match op {
                    Operator::Eq => Ok(Some(Cell::from(equal))),
                    _ => Ok(Some(Cell::from(!equal))),
                }
            }

            _ => Ok(None),
        }
    }
}

fn index_arg(cx: &mut Context, index: &Cell, len: usize) -> RuntimeResult<usize> {
    let converted = convert(cx, index, super::int_type(), Narrowing::Allow)?;

    let Some(int) = converted.as_int() else {
        return Err(RuntimeError::invalid_call(
            super::list_type(),
            "",
            "the index is not an integer",
        ));
    };

    match cast::usize(int) {
        Ok(index) if index < len => Ok(index),

        _ => Err(RuntimeError::invalid_call(
            super::list_type(),
            "",
            format!("index {int} is out of bounds for length {len}"),
        )),
    }
}

// The position of the first element equal to `value`. Comparisons that
// are not applicable to the pairing read as unequal.
fn position_of(cx: &mut Context, subject: &Cell, value: &Cell) -> RuntimeResult<Option<usize>> {
    let Some(items) = subject.list_items() else {
        return Ok(None);
    };

    for (index, element) in items.iter().enumerate() {
        match element.equal(cx, value) {
            Ok(result) => {
                if result.as_bool() == Some(true) {
                    return Ok(Some(index));
                }
            }

            Err(error) if error.is_not_applicable() => (),
            Err(error) => return Err(error),
        }
    }

    Ok(None)
}

fn elements_equal(cx: &mut Context, a: &[Cell], b: &[Cell]) -> RuntimeResult<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }

    for (left, right) in a.iter().zip(b.iter()) {
        match left.equal(cx, right) {
            Ok(result) => {
                if result.as_bool() != Some(true) {
                    return Ok(false);
                }
            }

            Err(error) if error.is_not_applicable() => return Ok(false),
            Err(error) => return Err(error),
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Cell, Context};

    fn list(items: &[i64]) -> Cell {
        Cell::from(items.iter().copied().map(Cell::from).collect::<Vec<_>>())
    }

    #[test]
    fn test_list_addition_flattens() {
        let mut cx = Context::new();

        let appended = list(&[1, 2]).add(&mut cx, &Cell::from(3i64)).unwrap();
        assert_eq!(appended.list_len(), Some(3));
        assert_eq!(appended.to_string(), "[1, 2, 3]");

        let joined = list(&[1]).add(&mut cx, &list(&[2])).unwrap();
        assert_eq!(joined.list_len(), Some(2));
        assert_eq!(joined.to_string(), "[1, 2]");

        let prepended = Cell::from(3i64).add(&mut cx, &list(&[1, 2])).unwrap();
        assert_eq!(prepended.to_string(), "[3, 1, 2]");
    }

    #[test]
    fn test_list_addition_allocates() {
        let mut cx = Context::new();

        let origin = list(&[1, 2]);
        let extended = origin.add(&mut cx, &Cell::from(3i64)).unwrap();

        assert_eq!(origin.list_len(), Some(2));
        assert_eq!(extended.list_len(), Some(3));
    }

    #[test]
    fn test_list_equality_is_elementwise() {
        let mut cx = Context::new();

        let equal = list(&[1, 2]).equal(&mut cx, &list(&[1, 2])).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let equal = list(&[1, 2]).equal(&mut cx, &list(&[2, 1])).unwrap();
        assert_eq!(equal.as_bool(), Some(false));

        let equal = list(&[1]).equal(&mut cx, &Cell::from(1i64)).unwrap();
        assert_eq!(equal.as_bool(), Some(false));

        let unequal = list(&[1]).not_equal(&mut cx, &list(&[1, 2])).unwrap();
        assert_eq!(unequal.as_bool(), Some(true));
    }

    #[test]
    fn test_list_indexer() {
        let mut cx = Context::new();

        let subject = list(&[10, 20, 30]);

        let element = subject.index(&mut cx, Cell::from(1i64)).unwrap();
        assert_eq!(element.as_int(), Some(20));

        subject
            .set_index(&mut cx, Cell::from(1i64), Cell::from(99i64))
            .unwrap();

        let element = subject.index(&mut cx, Cell::from(1i64)).unwrap();
        assert_eq!(element.as_int(), Some(99));

        let error = subject.index(&mut cx, Cell::from(3i64)).unwrap_err();
        assert!(error.is_invalid_call());

        let error = subject.index(&mut cx, Cell::from(-1i64)).unwrap_err();
        assert!(error.is_invalid_call());

        // A 64-bit index stays out of bounds on every pointer width.
        let error = subject.index(&mut cx, Cell::from(1i64 << 32)).unwrap_err();
        assert!(error.is_invalid_call());
    }

    #[test]
    fn test_list_members() {
        let mut cx = Context::new();

        let subject = list(&[1, 2]);

        subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from(3i64)],
                crate::runtime::Direction::Get,
                "Add",
            )
            .unwrap();

        assert_eq!(subject.list_len(), Some(3));

        let length = subject.get_member(&mut cx, "length").unwrap();
        assert_eq!(length.as_int(), Some(3));

        let contains = subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from(2i64)],
                crate::runtime::Direction::Get,
                "contains",
            )
            .unwrap();
        assert_eq!(contains.as_bool(), Some(true));

        let index = subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from(3i64)],
                crate::runtime::Direction::Get,
                "index_of",
            )
            .unwrap();
        assert_eq!(index.as_int(), Some(2));

        let missing = subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from(99i64)],
                crate::runtime::Direction::Get,
                "index_of",
            )
            .unwrap();
        assert_eq!(missing.as_int(), Some(-1));

        let error = subject.get_member(&mut cx, "lenth").unwrap_err();
        assert!(error.to_string().contains("Did you mean 'length'?"));
    }
}
