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

//! # Altair Runtime Type System
//!
//! This crate implements the runtime type layer of the Altair embeddable
//! scripting platform: the dynamically-typed value model shared between the
//! script interpreter and the host application.
//!
//! The interpreter erases static types. Member calls, operator applications,
//! and conversions all dispatch through the
//! [type descriptor](runtime::ScriptType) attached to a
//! [value cell](runtime::Cell). The crate provides:
//!
//!  - The [Cell](runtime::Cell) value object: a payload, its type
//!    descriptor, and a type-locked flag that controls how precisely
//!    overload resolution must match the value.
//!
//!  - The descriptor protocol: construction, dynamic and static member
//!    dispatch, a bidirectional [conversion](runtime::convert) protocol,
//!    and a closed [operator set](runtime::Operator).
//!
//!  - The nine [built-in types](builtins): Int, Real, Bool, Char, String,
//!    Null, List, Hash, and Structure, each implementing the protocol with
//!    exact coercion and operator rules.
//!
//!  - The [interop bridge](interop): an explicit member registry over host
//!    types with scoring-based overload resolution, declared context
//!    injection, and write-once call-site caching.
//!
//! ## Quick start
//!
//! ```
//! use altair::runtime::{Cell, Context};
//!
//! let mut cx = Context::new();
//!
//! let list = Cell::from(vec![Cell::from(1i64), Cell::from(2i64)]);
//! let item = Cell::from(3i64);
//!
//! // List addition allocates a new list, appending a non-list operand
//! // as a single element.
//! let sum = list.add(&mut cx, &item).unwrap();
//!
//! assert_eq!(sum.list_items().unwrap().len(), 3);
//! ```
//!
//! The layer is synchronous and re-entrant: each call runs to completion on
//! the caller's thread and may recursively re-enter the layer. The caller
//! owns the [execution context](runtime::Context).

pub(crate) mod report;

pub mod builtins;
pub mod interop;
pub mod runtime;
