//! Per-execution-context interception state
//!
//! Each execution context (request, fiber, worker) owns one `TraceContext`
//! holding its dispatch registry and, while a wrapper invocation is in
//! flight, the captured original call. Contexts never share this state, so
//! no synchronization is involved.

use crate::frame::FrameId;
use crate::registry::DispatchRegistry;
use crate::value::{ObjRef, VmStr};
use tracing::debug;

/// Snapshot of the call a wrapper displaced.
///
/// Captured by the interception hook before the wrapper runs; the target
/// function, its name, and the argument vector are read from the captured
/// frame at forward time rather than copied here. Valid only for the
/// duration of the wrapper invocation that captured it.
#[derive(Debug, Clone)]
pub struct OriginalCallContext {
    /// The intercepted call's own frame
    pub frame: FrameId,
    /// Receiver of the intercepted call, if it was a method call
    pub receiver: Option<ObjRef>,
    /// Class scope the intercepted call was made from
    pub calling_scope: Option<VmStr>,
    /// Defining scope of the resolved target function; supplies the called
    /// scope when there is no receiver
    pub resolved_scope: Option<VmStr>,
}

/// Interception state for one execution context.
#[derive(Debug, Default)]
pub struct TraceContext {
    registry: DispatchRegistry,
    original: Option<OriginalCallContext>,
}

impl TraceContext {
    /// Create a fresh context with an empty registry
    pub fn new() -> Self {
        Self {
            registry: DispatchRegistry::new(),
            original: None,
        }
    }

    /// The context's dispatch registry
    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    /// The context's dispatch registry, mutably
    pub fn registry_mut(&mut self) -> &mut DispatchRegistry {
        &mut self.registry
    }

    /// Record the original call displaced by a wrapper invocation.
    ///
    /// Called by the interception hook immediately before it invokes the
    /// wrapper. Any previously captured context is replaced.
    pub fn capture_original(&mut self, original: OriginalCallContext) {
        self.original = Some(original);
    }

    /// The captured original call, if a wrapper invocation is in flight
    pub fn original(&self) -> Option<&OriginalCallContext> {
        self.original.as_ref()
    }

    /// Invalidate the captured original call.
    ///
    /// Must be called when the wrapper frame exits so a stale capture cannot
    /// be reused by an unrelated call.
    pub fn clear_original(&mut self) {
        self.original = None;
    }

    /// Reinitialize the context between isolated requests: drops the
    /// registry's tables and any captured call.
    pub fn reset(&mut self) {
        debug!("resetting trace context");
        self.registry.clear();
        self.original = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{AllocMode, DispatchRecord};
    use crate::frame::{CallFrame, CallStack};
    use crate::function::{noop_handler, Function};
    use std::rc::Rc;

    #[test]
    fn test_capture_and_clear() {
        let mut stack = CallStack::new();
        let frame = stack.push(CallFrame::new(
            Rc::new(Function::new("f", noop_handler())),
            vec![],
        ));

        let mut ctx = TraceContext::new();
        assert!(ctx.original().is_none());

        ctx.capture_original(OriginalCallContext {
            frame,
            receiver: None,
            calling_scope: None,
            resolved_scope: None,
        });
        assert!(ctx.original().is_some());

        ctx.clear_original();
        assert!(ctx.original().is_none());
    }

    #[test]
    fn test_reset_drops_registry_state() {
        let substitute = Rc::new(Function::new("__wrapper", noop_handler()));
        let rec = DispatchRecord::new(Rc::from("query"), Rc::clone(&substitute));

        let mut ctx = TraceContext::new();
        ctx.registry_mut()
            .open_class_table("PDO", AllocMode::Transient)
            .store(&rec);
        drop(rec);
        assert_eq!(Rc::strong_count(&substitute), 2);

        ctx.reset();
        assert!(ctx.registry().is_empty());
        assert_eq!(Rc::strong_count(&substitute), 1);
    }

    #[test]
    fn test_contexts_are_isolated() {
        let mut a = TraceContext::new();
        let b = TraceContext::new();

        a.registry_mut()
            .open_class_table("PDO", AllocMode::Transient);
        assert!(a.registry().table("pdo").is_some());
        assert!(b.registry().table("pdo").is_none());
    }
}
