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
    error::Error as StdError,
    fmt::{Display, Formatter},
    result::Result as StdResult,
};

use compact_str::{CompactString, ToCompactString};

use crate::runtime::{ops::Operator, Cell, TypeHandle};

/// A result of a runtime API call, which can either be a normal value or a
/// [RuntimeError].
pub type RuntimeResult<T> = StdResult<T, RuntimeError>;

/// A result returned by a host callee registered in the
/// [interop registry](crate::interop).
///
/// Host functions report failures through [HostError] so that a script
/// error raised inside the host callee propagates as itself rather than as
/// a generic invocation-failure wrapper.
pub type HostResult = StdResult<Cell, HostError>;

/// Represents any error that may occur during the evaluation of the runtime
/// type protocol.
///
/// All three variants are locally recoverable: a caller may match on
/// [NotApplicable](RuntimeError::NotApplicable) to probe an operator and
/// silently try another strategy, and the operator resolution chain inside
/// this crate depends on that.
///
/// This object implements the [Display] trait that provides a brief
/// description of the underlying error.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RuntimeError {
    /// A conversion was required, and no type descriptor on either side of
    /// the conversion accepted it.
    Conversion {
        /// The name of the source value's type.
        from: CompactString,

        /// The name of the requested target type.
        to: CompactString,

        /// A rendering of the offending value.
        value: CompactString,
    },

    /// No member, overload, or candidate succeeded for a call, or a
    /// resolved member failed at the final invocation step.
    InvalidCall {
        /// The name of the receiver's type.
        receiver: CompactString,

        /// The requested member name. Empty for the default-member
        /// (indexer) path and for constructor calls.
        name: CompactString,

        /// The failure details.
        message: CompactString,
    },

    /// An operator has no handler for the given operand types.
    ///
    /// Distinct from [InvalidCall](RuntimeError::InvalidCall), because
    /// callers are expected to probe for this error and silently skip to
    /// another resolution strategy.
    NotApplicable {
        /// The operator that was applied.
        operator: Operator,

        /// The name of the left (or the only) operand's type.
        lhs: CompactString,

        /// The name of the right operand's type. None for unary operators.
        rhs: Option<CompactString>,
    },
}

impl Display for RuntimeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversion { from, to, value } => formatter.write_fmt(format_args!(
                "cannot convert {value} of type '{from}' to '{to}'",
            )),

            Self::InvalidCall {
                receiver,
                name,
                message,
            } => match name.is_empty() {
                true => formatter
                    .write_fmt(format_args!("call on '{receiver}' failed: {message}")),

                false => formatter.write_fmt(format_args!(
                    "call to '{name}' on '{receiver}' failed: {message}",
                )),
            },

            Self::NotApplicable {
                operator,
                lhs,
                rhs: Some(rhs),
            } => formatter.write_fmt(format_args!(
                "operator '{}' is not applicable to operands of types '{lhs}' \
                and '{rhs}'",
                operator.symbol(),
            )),

            Self::NotApplicable {
                operator,
                lhs,
                rhs: None,
            } => formatter.write_fmt(format_args!(
                "operator '{}' is not applicable to an operand of type '{lhs}'",
                operator.symbol(),
            )),
        }
    }
}

impl StdError for RuntimeError {}

impl RuntimeError {
    #[inline(always)]
    pub(crate) fn conversion_of(value: &Cell, to: TypeHandle) -> Self {
        Self::Conversion {
            from: CompactString::from(value.ty().name()),
            to: CompactString::from(to.name()),
            value: value.to_compact_string(),
        }
    }

    #[inline(always)]
    pub(crate) fn invalid_call(
        receiver: TypeHandle,
        name: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::InvalidCall {
            receiver: CompactString::from(receiver.name()),
            name: name.into(),
            message: message.into(),
        }
    }

    #[inline(always)]
    pub(crate) fn not_applicable_unary(operator: Operator, operand: TypeHandle) -> Self {
        Self::NotApplicable {
            operator,
            lhs: CompactString::from(operand.name()),
            rhs: None,
        }
    }

    #[inline(always)]
    pub(crate) fn not_applicable_binary(
        operator: Operator,
        lhs: TypeHandle,
        rhs: TypeHandle,
    ) -> Self {
        Self::NotApplicable {
            operator,
            lhs: CompactString::from(lhs.name()),
            rhs: Some(CompactString::from(rhs.name())),
        }
    }

    /// Returns true if this error is a [Conversion](Self::Conversion)
    /// failure.
    #[inline(always)]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Returns true if this error is an [InvalidCall](Self::InvalidCall)
    /// failure.
    #[inline(always)]
    pub fn is_invalid_call(&self) -> bool {
        matches!(self, Self::InvalidCall { .. })
    }

    /// Returns true if this error is a
    /// [NotApplicable](Self::NotApplicable) failure.
    #[inline(always)]
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}

/// An error returned by a host callee.
///
/// A [Script](HostError::Script) payload is unwrapped by the invocation
/// machinery and propagates as the inner [RuntimeError] directly. A
/// [Message](HostError::Message) payload becomes the details of an
/// [InvalidCall](RuntimeError::InvalidCall) error attributed to the
/// invoked member.
#[derive(Clone, Debug)]
pub enum HostError {
    /// A script-runtime error raised inside the host callee.
    Script(RuntimeError),

    /// An arbitrary host-side failure description.
    Message(CompactString),
}

impl Display for HostError {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Script(error) => Display::fmt(error, formatter),
            Self::Message(message) => formatter.write_str(message),
        }
    }
}

impl From<RuntimeError> for HostError {
    #[inline(always)]
    fn from(value: RuntimeError) -> Self {
        Self::Script(value)
    }
}

impl From<&str> for HostError {
    #[inline(always)]
    fn from(value: &str) -> Self {
        Self::Message(CompactString::from(value))
    }
}

impl From<String> for HostError {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self::Message(CompactString::from(value))
    }
}
