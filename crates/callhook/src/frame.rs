//! Call frames and the inspectable call stack
//!
//! The host VM's call stack is modeled as an explicit sequence of frames,
//! each linked to its caller by position. This makes the "skip transparent
//! frames" search during forwarding a plain backwards iteration instead of
//! pointer chasing.

use crate::function::Function;
use crate::value::{ObjRef, Value, VmStr};
use std::rc::Rc;

/// Handle to one frame on a `CallStack`.
///
/// Valid only while the identified frame is still live; handles to popped
/// frames dangle and must not be retained past the frame's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(usize);

/// One in-progress function invocation.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// The function being executed
    pub function: Rc<Function>,
    /// Argument vector, exactly as passed at the call site
    pub args: Vec<Value>,
    /// Receiver object for method calls
    pub receiver: Option<ObjRef>,
    /// Class scope the call was made from
    pub scope: Option<VmStr>,
}

impl CallFrame {
    /// Create a frame for a plain function call
    pub fn new(function: Rc<Function>, args: Vec<Value>) -> Self {
        Self {
            function,
            args,
            receiver: None,
            scope: None,
        }
    }

    /// Create a frame for a method call on `receiver`
    pub fn with_receiver(function: Rc<Function>, args: Vec<Value>, receiver: ObjRef) -> Self {
        Self {
            function,
            args,
            receiver: Some(receiver),
            scope: None,
        }
    }

    /// Set the calling class scope
    pub fn in_scope(mut self, scope: VmStr) -> Self {
        self.scope = Some(scope);
        self
    }

    /// The resolvable name of this frame's function, if it has one
    pub fn function_name(&self) -> Option<&str> {
        self.function.name.as_deref()
    }
}

/// Call stack for one execution context.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Push a frame, returning its handle
    pub fn push(&mut self, frame: CallFrame) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(frame);
        id
    }

    /// Pop the top frame
    pub fn pop(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    /// The currently executing frame, if any
    pub fn top(&self) -> Option<(FrameId, &CallFrame)> {
        let last = self.frames.len().checked_sub(1)?;
        Some((FrameId(last), &self.frames[last]))
    }

    /// Get a live frame by handle
    pub fn frame(&self, id: FrameId) -> Option<&CallFrame> {
        self.frames.get(id.0)
    }

    /// The frame that invoked `id`, if any
    pub fn predecessor(&self, id: FrameId) -> Option<FrameId> {
        if id.0 == 0 || id.0 >= self.frames.len() {
            None
        } else {
            Some(FrameId(id.0 - 1))
        }
    }

    /// Starting at `from` and walking toward the stack base, find the first
    /// frame whose function has a resolvable name.
    ///
    /// Skips transparent frames (file inclusion and similar nesting that
    /// executes without a function name). Returns `None` if no named frame
    /// exists at or below `from`.
    pub fn nearest_named_frame(&self, from: FrameId) -> Option<&CallFrame> {
        self.frames
            .get(..=from.0)?
            .iter()
            .rev()
            .find(|frame| frame.function_name().is_some())
    }

    /// Current stack depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if no call is in progress
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
