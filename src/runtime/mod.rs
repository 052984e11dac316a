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

mod cell;
mod context;
mod conversion;
mod error;
mod ty;

/// Identifier and string-literal utilities: validity rules, escaping, and
/// the id-or-literal rendering used to print member and slot names.
pub mod ident;

/// The closed operator protocol: one entry point per operator, plus the
/// resolution chain shared by every type descriptor.
///
/// Operator entry points never panic on unsupported operand pairings. Each
/// descriptor exposes the operators as "try" hooks that decline rather than
/// fail, and an entry point raises
/// [NotApplicable](crate::runtime::RuntimeError::NotApplicable) only after
/// every lookup strategy has declined.
pub mod ops;

pub use crate::runtime::{
    cell::Cell,
    context::Context,
    conversion::{convert, Narrowing},
    error::{HostError, HostResult, RuntimeError, RuntimeResult},
    ops::Operator,
    ty::{Direction, ScriptType, TypeHandle, TypeMeta},
};

pub(crate) use crate::runtime::cell::{lock, Payload};
