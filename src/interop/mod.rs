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

//! Interoperability between host Rust code and script values.
//!
//! The bridge consists of three cooperating parts:
//!
//!  - A process-wide **registry** of host types. [HostTypeBuilder]
//!    assembles the member tables of a host type (fields, methods,
//!    indexers, events, constructors, statics) and publishes them under
//!    the type's [TypeId](std::any::TypeId). [bridge_type_of] returns
//!    the bridge descriptor of any Rust type, creating an empty wrapper
//!    on first use for types without a registration.
//!
//!  - An **overload resolution** engine. Members registered under one
//!    name with several signatures form an overload set. Candidates are
//!    scored against the actual arguments: exact parameter matches are
//!    free, widening matches cost an upcast, and everything else is
//!    presumed convertible at the cost of a conversion that is verified
//!    only when the candidate is actually invoked. Candidates declaring
//!    [context consumption](HostTypeBuilder::context_method) lose score
//!    ties to those without the declaration, and [CallSite] pins a
//!    settled resolution for repeated calls.
//!
//!  - The **primitive wrappers**. The scalar built-in types delegate
//!    their member dispatch here, so a script-side `"abc".length` and a
//!    host-registered member resolve through the same tables.
//!
//! Every bridge value additionally answers two intrinsic members:
//! `\boxed` wraps the value into an opaque [Boxed] envelope shielded
//! from conversions, and `\implements` tests the value's type name.

mod bridge;
mod member;
mod number;
mod registry;
mod resolve;

pub use crate::interop::{
    member::{HostFn, TypeToken},
    number::CellNumber,
    registry::{bridge_type_of, Boxed, HostTypeBuilder},
    resolve::CallSite,
};

pub(crate) use crate::interop::{bridge::intrinsic_call, resolve::closest};
