//! callhook: in-process call interception for dynamically dispatched VMs
//!
//! Lets a tracing subsystem wrap selected functions and methods so every
//! invocation is observable, while keeping the original, unwrapped target
//! reachable from inside the wrapper.
//!
//! The pieces, leaf-first:
//! - [`symbols::SymbolTable`] — case-insensitive lookup of callables by name
//! - [`dispatch::DispatchRecord`] / [`dispatch::ClassDispatchTable`] —
//!   interception metadata, shared across tables by refcount
//! - [`registry::DispatchRegistry`] — per-context map from class identity to
//!   its dispatch table
//! - [`forward::forward_current_call`] — re-invokes the intercepted original
//!   with the exact arguments, receiver, and scopes the call site used
//!
//! All state is context-local: each execution context owns one
//! [`context::TraceContext`] and one [`frame::CallStack`], with no
//! cross-context sharing or locking.

pub mod context;
pub mod dispatch;
pub mod forward;
pub mod frame;
pub mod function;
pub mod registry;
pub mod symbols;
pub mod value;

pub use context::{OriginalCallContext, TraceContext};
pub use dispatch::{AllocMode, ClassDispatchTable, DispatchRecord};
pub use forward::{forward_current_call, invoke, CallDescriptor, ResolutionCache, WRAPPER_ENTRY_POINT};
pub use frame::{CallFrame, CallStack, FrameId};
pub use function::{Function, Invocation, NativeFn};
pub use registry::DispatchRegistry;
pub use symbols::SymbolTable;
pub use value::{ObjRef, Object, Value, VmStr};

/// Interception layer errors
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// Forwarding was invoked from an invalid context; raised before any
    /// state is mutated, so it is always safe to catch and continue
    #[error("Logic error: {0}")]
    LogicError(String),

    /// Failure raised inside a forwarded call, passed through unchanged
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Interception layer result
pub type InterceptResult<T> = Result<T, InterceptError>;
