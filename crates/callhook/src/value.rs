//! Value representation for intercepted calls
//!
//! Values are a small tagged enum rather than the host VM's packed
//! representation: the interception layer only ever stores, forwards, and
//! compares values, it never computes with them. Shared data (strings,
//! objects, reference cells) lives behind `Rc` so that ownership transfers
//! are observable refcount changes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, immutable VM string.
pub type VmStr = Rc<str>;

/// Shared handle to a heap object.
pub type ObjRef = Rc<RefCell<Object>>;

/// Object instance used as a call receiver.
///
/// Only the parts of the host object model the interception layer needs:
/// the class identity (which supplies the called scope during forwarding)
/// and the field values.
#[derive(Debug, Clone)]
pub struct Object {
    /// Name of the object's class
    pub class_name: VmStr,
    /// Field values
    pub fields: Vec<Value>,
}

impl Object {
    /// Create a new object of the given class with no fields
    pub fn new(class_name: VmStr) -> Self {
        Self {
            class_name,
            fields: Vec::new(),
        }
    }

    /// Create a new object behind a shared handle
    pub fn boxed(class_name: VmStr) -> ObjRef {
        Rc::new(RefCell::new(Self::new(class_name)))
    }
}

/// A VM value as seen by the interception layer.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Shared string
    Str(VmStr),
    /// Object handle
    Object(ObjRef),
    /// Reference cell (by-reference binding to another value slot)
    Reference(Rc<RefCell<Value>>),
}

impl Value {
    /// Create a string value from a `&str`
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Create a reference cell wrapping `value`
    pub fn reference(value: Value) -> Self {
        Value::Reference(Rc::new(RefCell::new(value)))
    }

    /// Check if this value is a string
    #[inline]
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Check if this value is a reference cell
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Reference(_))
    }

    /// Borrow the string contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Dereference one level of `Reference`, cloning the inner value.
    ///
    /// Reference cells do not nest, so a single level is sufficient.
    /// Non-reference values pass through unchanged.
    pub fn unwrap_reference(self) -> Value {
        match self {
            Value::Reference(cell) => cell.borrow().clone(),
            other => other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Objects and references compare by identity
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Reference(a), Value::Reference(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(o) => write!(f, "<{} object>", o.borrow().class_name),
            Value::Reference(_) => write!(f, "<reference>"),
        }
    }
}
