//! Callable function handles
//!
//! A `Function` is the interception layer's view of one resolvable callable:
//! an optional name (nameless functions model transparent frames such as file
//! inclusion), the class scope it was defined in, and the native handler that
//! executes it.

use crate::value::{ObjRef, Value, VmStr};
use crate::InterceptResult;
use std::fmt;
use std::rc::Rc;

/// Borrowed view of one call handed to a native handler.
///
/// Arguments are referenced in place; handlers must not assume ownership.
pub struct Invocation<'a> {
    /// Argument vector, exactly as the caller passed it
    pub args: &'a [Value],
    /// Receiver object, if this is a method call
    pub receiver: Option<&'a ObjRef>,
    /// Class scope the call was made from
    pub calling_scope: Option<&'a str>,
    /// Class scope the call was resolved against
    pub called_scope: Option<&'a str>,
}

/// Native handler behind a `Function`.
///
/// `Ok(None)` means the call succeeded without producing a value; this is
/// distinct from returning `Value::Null`.
pub type NativeFn = Rc<dyn Fn(&Invocation) -> InterceptResult<Option<Value>>>;

/// A callable function or method.
#[derive(Clone)]
pub struct Function {
    /// Function name (None for transparent frames like file inclusion)
    pub name: Option<VmStr>,
    /// Defining class scope (None for free functions)
    pub scope: Option<VmStr>,
    handler: NativeFn,
}

impl Function {
    /// Create a named free function
    pub fn new(name: &str, handler: NativeFn) -> Self {
        Self {
            name: Some(Rc::from(name)),
            scope: None,
            handler,
        }
    }

    /// Create a method defined in class `scope`
    pub fn method(name: &str, scope: &str, handler: NativeFn) -> Self {
        Self {
            name: Some(Rc::from(name)),
            scope: Some(Rc::from(scope)),
            handler,
        }
    }

    /// Create a nameless function (transparent frame)
    pub fn nameless(handler: NativeFn) -> Self {
        Self {
            name: None,
            scope: None,
            handler,
        }
    }

    /// Run the handler for one invocation
    pub fn call(&self, invocation: &Invocation) -> InterceptResult<Option<Value>> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Handler that returns no value, for functions called only for effect
pub fn noop_handler() -> NativeFn {
    Rc::new(|_: &Invocation| Ok(None))
}
