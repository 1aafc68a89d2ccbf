//! Call forwarding
//!
//! Re-invokes the original, unwrapped target of an intercepted call from
//! inside its tracing wrapper, producing the result an uninstrumented call
//! would have produced. Forwarding is only legal while a wrapper invocation
//! is in flight and only from a call path rooted at the wrapper entry point.

use crate::context::TraceContext;
use crate::frame::CallStack;
use crate::function::{Function, Invocation};
use crate::value::{ObjRef, Value, VmStr};
use crate::{InterceptError, InterceptResult};
use std::rc::Rc;
use tracing::trace;

/// Name of the synthetic entry point the interception hook installs for
/// every wrapper invocation. The frame-identity check during forwarding
/// requires the nearest named caller to carry this name.
pub const WRAPPER_ENTRY_POINT: &str = "__callhook_wrapper";

/// Descriptor for one forwarded call.
///
/// Arguments are borrowed from the captured original frame; no argument
/// values are copied.
pub struct CallDescriptor<'a> {
    /// Name of the function to invoke (owned, reference-counted copy)
    pub function_name: VmStr,
    /// Argument vector, referenced in place
    pub args: &'a [Value],
    /// Receiver object, if the original call was a method call
    pub receiver: Option<ObjRef>,
    /// When set, arguments are handed over exactly as received, including
    /// by-reference cells; when unset, reference arguments are separated
    /// into plain copies before the callee sees them
    pub no_separation: bool,
}

/// Precomputed resolution for a forwarded call: the concrete function
/// implementation and the class scopes the call binds against, bypassing
/// dynamic resolution by name.
pub struct ResolutionCache {
    /// The resolved target function
    pub function: Rc<Function>,
    /// Scope the original call site resolved from
    pub calling_scope: Option<VmStr>,
    /// Scope the call binds against: the receiver's own class when a
    /// receiver is present, otherwise the originally resolved scope
    pub called_scope: Option<VmStr>,
}

fn misuse() -> InterceptError {
    InterceptError::LogicError(
        "cannot forward a call outside of a tracing wrapper invocation".to_string(),
    )
}

/// Invoke a call described by `descriptor`, resolved through `cache`.
///
/// The host VM's call primitive. Failures raised by the callee propagate
/// unchanged.
pub fn invoke(descriptor: &CallDescriptor, cache: &ResolutionCache) -> InterceptResult<Option<Value>> {
    trace!(function = %descriptor.function_name, args = descriptor.args.len(), "invoking call");

    let separated: Vec<Value>;
    let args: &[Value] = if descriptor.no_separation {
        descriptor.args
    } else {
        separated = descriptor
            .args
            .iter()
            .cloned()
            .map(Value::unwrap_reference)
            .collect();
        &separated
    };

    let invocation = Invocation {
        args,
        receiver: descriptor.receiver.as_ref(),
        calling_scope: cache.calling_scope.as_deref(),
        called_scope: cache.called_scope.as_deref(),
    };
    cache.function.call(&invocation)
}

/// Re-invoke the original function displaced by the current wrapper.
///
/// Preconditions, both checked before anything is acquired:
/// - `ctx` holds a captured original call (an interception actually
///   happened and the hook saved its context), and
/// - the currently executing frame has a live predecessor.
///
/// The nearest named caller below the current frame must be the wrapper
/// entry point; transparent frames (file inclusion) in between are skipped.
/// Violating any of these yields a [`InterceptError::LogicError`] with no
/// side effects.
///
/// Returns the forwarded call's value, dereferenced if the callee returned
/// a reference cell, or `None` if the call produced no value. Failures from
/// inside the forwarded call propagate unchanged.
pub fn forward_current_call(
    ctx: &TraceContext,
    stack: &CallStack,
) -> InterceptResult<Option<Value>> {
    let original = ctx.original().ok_or_else(misuse)?;
    let (current, _) = stack.top().ok_or_else(misuse)?;
    let predecessor = stack.predecessor(current).ok_or_else(misuse)?;

    // Jump out of any transparent frames before checking the caller's name
    let named = stack.nearest_named_frame(predecessor).ok_or_else(misuse)?;
    if named.function_name() != Some(WRAPPER_ENTRY_POINT) {
        return Err(misuse());
    }

    let frame = stack.frame(original.frame).ok_or_else(misuse)?;
    let function_name = frame.function.name.clone().ok_or_else(misuse)?;
    trace!(function = %function_name, "forwarding intercepted call");

    let descriptor = CallDescriptor {
        function_name,
        args: &frame.args,
        receiver: original.receiver.clone(),
        no_separation: true,
    };
    let cache = ResolutionCache {
        function: Rc::clone(&frame.function),
        calling_scope: original.calling_scope.clone(),
        called_scope: match &descriptor.receiver {
            Some(obj) => Some(Rc::clone(&obj.borrow().class_name)),
            None => original.resolved_scope.clone(),
        },
    };

    // The duplicated name in the descriptor is released when it goes out of
    // scope, on every path out of this function.
    let result = invoke(&descriptor, &cache)?;
    Ok(result.map(Value::unwrap_reference))
}
