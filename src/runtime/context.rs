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

use compact_str::CompactString;

use crate::runtime::{RuntimeError, RuntimeResult};

/// The default limit of recursive re-entries into the type layer.
pub const DEFAULT_CALL_DEPTH: usize = 512;

/// The caller-owned execution context of the type layer.
///
/// Every protocol operation is synchronous: it runs to completion on the
/// caller's thread and may recursively re-enter the layer (an operator
/// implementation calling back into dynamic dispatch, a reference slot
/// delegating to its held value). The context tracks that recursion and
/// fails the call when it exceeds the configured depth limit, which keeps
/// cyclic value graphs from overflowing the native stack.
///
/// Host functions registered in the [interop registry](crate::interop)
/// receive the context as their first parameter and may use it to call
/// back into the layer.
///
/// ```
/// use altair::runtime::Context;
///
/// let mut cx = Context::new();
///
/// assert_eq!(cx.depth(), 0);
/// ```
pub struct Context {
    depth: usize,
    limit: usize,
}

impl Default for Context {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with the [default](DEFAULT_CALL_DEPTH) recursion
    /// limit.
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_call_depth(DEFAULT_CALL_DEPTH)
    }

    /// Creates a context with a custom recursion limit.
    #[inline(always)]
    pub fn with_call_depth(limit: usize) -> Self {
        Self { depth: 0, limit }
    }

    /// The current recursion depth. Zero outside of any protocol call.
    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self, site: &str) -> RuntimeResult<()> {
        if self.depth >= self.limit {
            return Err(RuntimeError::InvalidCall {
                receiver: CompactString::from(site),
                name: CompactString::new(""),
                message: CompactString::from("the call recursion limit has been exceeded"),
            });
        }

        self.depth += 1;

        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_guard() {
        let mut cx = Context::with_call_depth(2);

        cx.enter("a").unwrap();
        cx.enter("b").unwrap();

        let overflow = cx.enter("c").unwrap_err();

        assert!(overflow.is_invalid_call());

        cx.leave();
        cx.leave();

        assert_eq!(cx.depth(), 0);
    }
}
