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
    hash::{Hash, Hasher},
    mem::discriminant,
    sync::Arc,
};

use crate::{
    builtins::BuiltinKind,
    runtime::{
        lock,
        Cell,
        Context,
        Direction,
        Operator,
        Payload,
        RuntimeError,
        RuntimeResult,
        ScriptType,
        TypeMeta,
    },
};

static META: TypeMeta = TypeMeta::new("Hash", BuiltinKind::Hash);

const MEMBERS: &[&str] = &[
    "add",
    "add_override",
    "clear",
    "contains_key",
    "count",
    "keys",
    "length",
    "remove",
    "to_string",
    "values",
];

/// A hash-table key wrapping a [Cell].
///
/// Scalar payloads key by value (reals by their bit pattern, so `NaN`
/// keys match themselves), and container and bridge payloads key by
/// identity of the shared storage. Payloads of different kinds never
/// collide: an Int `1` and a Real `1.0` are distinct keys.
#[derive(Clone)]
pub(crate) struct HashKey {
    cell: Cell,
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.cell.payload(), other.cell.payload()) {
            (Payload::Void, Payload::Void) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Real(a), Payload::Real(b)) => a.to_bits() == b.to_bits(),
            (Payload::Char(a), Payload::Char(b)) => a == b,
            (Payload::Str(a), Payload::Str(b)) => a == b,
            _ => self.cell.same_identity(&other.cell),
        }
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let payload = self.cell.payload();

        discriminant(payload).hash(state);

        match payload {
            Payload::Void => (),
            Payload::Bool(flag) => flag.hash(state),
            Payload::Int(int) => int.hash(state),
            Payload::Real(real) => real.to_bits().hash(state),
            Payload::Char(ch) => ch.hash(state),
            Payload::Str(string) => string.hash(state),
            Payload::List(list) => (Arc::as_ptr(list) as usize).hash(state),
            Payload::Hash(hash) => (Arc::as_ptr(hash) as usize).hash(state),
            Payload::Struct(instance) => (Arc::as_ptr(instance) as usize).hash(state),
            Payload::Foreign(any) => (Arc::as_ptr(any) as *const u8 as usize).hash(state),
        }
    }
}

impl HashKey {
    #[inline(always)]
    pub(crate) fn new(key: &Cell) -> Self {
        Self { cell: key.clone() }
    }

    #[inline(always)]
    pub(crate) fn as_cell(&self) -> &Cell {
        &self.cell
    }
}

/// The descriptor of mutable key-value tables.
///
/// Hashes are reference values like lists. Entry order is unspecified.
/// The default indexer reads a missing key as null and writes with
/// override, while the `add` member raises
/// [InvalidCall](RuntimeError::InvalidCall) when an equal key is
/// already present.
pub(super) struct HashType;

impl ScriptType for HashType {
    #[inline(always)]
    fn meta(&self) -> &'static TypeMeta {
        &META
    }

    fn try_construct(&self, _cx: &mut Context, args: &mut [Cell]) -> RuntimeResult<Cell> {
        match args {
            [] => Ok(Cell::hash()),

            [prototype] => match prototype.hash_payload() {
                Some(hash) => Ok(Cell::hash_from_pairs(entries(hash))),

                None => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    "new",
                    "the prototype argument is not a hash",
                )),
            },

            _ => Err(RuntimeError::invalid_call(
                super::hash_type(),
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
        let Some(hash) = subject.hash_payload() else {
            return Err(RuntimeError::invalid_call(
                super::hash_type(),
                name,
                "the subject is not a hash",
            ));
        };

        if name.is_empty() {
            return match (direction, args) {
                (Direction::Get, [key]) => {
                    let value = lock(hash).get(&HashKey::new(key)).cloned();

                    Ok(value.unwrap_or_else(Cell::null))
                }

                (Direction::Set, [key, value]) => {
                    lock(hash).insert(HashKey::new(key), value.clone());

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    name,
                    "the hash indexer takes a key argument and, \
                    when writing, a value",
                )),
            };
        }

        if let Direction::Set = direction {
            return Err(RuntimeError::invalid_call(
                super::hash_type(),
                name,
                "hash members are not writable",
            ));
        }

        match name.to_ascii_lowercase().as_str() {
            "length" | "count" => Ok(Cell::from(lock(hash).len() as i64)),

            "add" => match args {
                [key, value] => {
                    let mut guard = lock(hash);

                    if guard.contains_key(&HashKey::new(key)) {
                        return Err(RuntimeError::invalid_call(
                            super::hash_type(),
                            name,
                            "an entry with an equal key already exists",
                        ));
                    }

                    guard.insert(HashKey::new(key), value.clone());

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    name,
                    "add expects a key and a value",
                )),
            },

            "add_override" => match args {
                [key, value] => {
                    lock(hash).insert(HashKey::new(key), value.clone());

                    Ok(Cell::null())
                }

                _ => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    name,
                    "add_override expects a key and a value",
                )),
            },

            "contains_key" => match args {
                [key] => Ok(Cell::from(lock(hash).contains_key(&HashKey::new(key)))),

                _ => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    name,
                    "contains_key expects a single argument",
                )),
            },

            "remove" => match args {
                [key] => Ok(Cell::from(lock(hash).remove(&HashKey::new(key)).is_some())),

                _ => Err(RuntimeError::invalid_call(
                    super::hash_type(),
                    name,
                    "remove expects a single argument",
                )),
            },

            "clear" => {
                lock(hash).clear();

                Ok(Cell::null())
            }

            "keys" => {
                let keys = lock(hash)
                    .keys()
                    .map(|key| key.as_cell().clone())
                    .collect::<Vec<_>>();

                Ok(Cell::from(keys))
            }

            "values" => {
                let values = lock(hash).values().cloned().collect::<Vec<_>>();

                Ok(Cell::from(values))
            }

            "to_string" => Ok(Cell::from(subject.stringify(cx)?)),

            _ => Err(super::unknown_member(super::hash_type(), name, MEMBERS)),
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
            super::hash_type(),
            name,
            "the Hash type has no static members",
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
                let (Some(left), Some(right)) = (lhs.hash_payload(), rhs.hash_payload()) else {
                    return Ok(None);
                };

                let pairs = entries(left).into_iter().chain(entries(right));

                Ok(Some(Cell::hash_from_pairs(pairs)))
            }

            Operator::Eq | Operator::Ne => {
                let equal = match (lhs.hash_payload(), rhs.hash_payload()) {
                    (Some(left), Some(right)) => {
                        cx.enter("Hash")?;

                        let result = tables_equal(cx, left, right);

                        cx.leave();

                        result?
                    }

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

type Table = std::sync::Mutex<ahash::AHashMap<HashKey, Cell>>;

fn entries(hash: &Table) -> Vec<(Cell, Cell)> {
    lock(hash)
        .iter()
        .map(|(key, value)| (key.as_cell().clone(), value.clone()))
        .collect()
}

// Key lookup is structural, value comparison goes through the operator
// protocol. The tables are snapshotted first so no lock is held while
// user comparison hooks run.
fn tables_equal(cx: &mut Context, left: &Table, right: &Table) -> RuntimeResult<bool> {
    let a = lock(left).clone();
    let b = lock(right).clone();

    if a.len() != b.len() {
        return Ok(false);
    }

    for (key, value) in a.iter() {
        let Some(other) = b.get(key) else {
            return Ok(false);
        };

        match value.equal(cx, other) {
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
    use crate::runtime::{Cell, Context, Direction, ScriptType};

    fn sample() -> Cell {
        Cell::hash_from_pairs([
            (Cell::from("a"), Cell::from(1i64)),
            (Cell::from("b"), Cell::from(2i64)),
        ])
    }

    #[test]
    fn test_hash_indexer() {
        let mut cx = Context::new();

        let subject = sample();

        let value = subject.index(&mut cx, Cell::from("a")).unwrap();
        assert_eq!(value.as_int(), Some(1));

        let missing = subject.index(&mut cx, Cell::from("zzz")).unwrap();
        assert!(missing.is_null());

        subject
            .set_index(&mut cx, Cell::from("a"), Cell::from(10i64))
            .unwrap();

        let value = subject.index(&mut cx, Cell::from("a")).unwrap();
        assert_eq!(value.as_int(), Some(10));
    }

    #[test]
    fn test_hash_add_rejects_duplicates() {
        let mut cx = Context::new();

        let subject = sample();

        let error = subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from("a"), Cell::from(3i64)],
                Direction::Get,
                "add",
            )
            .unwrap_err();

        assert!(error.is_invalid_call());

        subject
            .dynamic_call(
                &mut cx,
                &mut [Cell::from("c"), Cell::from(3i64)],
                Direction::Get,
                "add",
            )
            .unwrap();

        assert_eq!(subject.hash_len(), Some(3));
    }

    #[test]
    fn test_hash_keys_by_value_and_kind() {
        let mut cx = Context::new();

        let subject = Cell::hash();

        subject
            .set_index(&mut cx, Cell::from(1i64), Cell::from("int"))
            .unwrap();

        subject
            .set_index(&mut cx, Cell::from(1.0f64), Cell::from("real"))
            .unwrap();

        assert_eq!(subject.hash_len(), Some(2));

        let value = subject.index(&mut cx, Cell::from(1i64)).unwrap();
        assert_eq!(value.as_str(), Some("int"));
    }

    #[test]
    fn test_hash_merge_overrides() {
        let mut cx = Context::new();

        let other = Cell::hash_from_pairs([
            (Cell::from("b"), Cell::from(20i64)),
            (Cell::from("c"), Cell::from(30i64)),
        ]);

        let merged = sample().add(&mut cx, &other).unwrap();

        assert_eq!(merged.hash_len(), Some(3));

        let value = merged.index(&mut cx, Cell::from("b")).unwrap();
        assert_eq!(value.as_int(), Some(20));
    }

    #[test]
    fn test_hash_equality_is_elementwise() {
        let mut cx = Context::new();

        let equal = sample().equal(&mut cx, &sample()).unwrap();
        assert_eq!(equal.as_bool(), Some(true));

        let differing = Cell::hash_from_pairs([
            (Cell::from("a"), Cell::from(1i64)),
            (Cell::from("b"), Cell::from(99i64)),
        ]);

        let equal = sample().equal(&mut cx, &differing).unwrap();
        assert_eq!(equal.as_bool(), Some(false));

        let equal = sample().equal(&mut cx, &Cell::from(5i64)).unwrap();
        assert_eq!(equal.as_bool(), Some(false));
    }

    #[test]
    fn test_hash_construction_copies() {
        let mut cx = Context::new();

        let origin = sample();

        let copy = crate::builtins::hash_type()
            .get()
            .try_construct(&mut cx, &mut [origin.clone()])
            .unwrap();

        copy.set_index(&mut cx, Cell::from("a"), Cell::from(99i64))
            .unwrap();

        let original = origin.index(&mut cx, Cell::from("a")).unwrap();
        assert_eq!(original.as_int(), Some(1));
    }
}
