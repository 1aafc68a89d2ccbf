//! End-to-end interception and forwarding tests
//!
//! Drives the whole path a host VM would: register a dispatch record for a
//! (class, function) pair, intercept a call by consulting the registry,
//! capture the original call context, run the wrapper, and forward to the
//! original from inside it.

use callhook::{
    forward_current_call, AllocMode, CallFrame, CallStack, DispatchRecord, Function,
    InterceptError, Invocation, NativeFn, Object, OriginalCallContext, TraceContext, Value,
    WRAPPER_ENTRY_POINT,
};
use std::rc::Rc;

fn add_fn() -> Rc<Function> {
    Rc::new(Function::new(
        "add",
        Rc::new(|inv: &Invocation| {
            let mut sum = 0;
            for arg in inv.args {
                if let Value::Int(i) = arg {
                    sum += i;
                }
            }
            Ok(Some(Value::Int(sum)))
        }) as NativeFn,
    ))
}

fn wrapper_fn() -> Rc<Function> {
    Rc::new(Function::new(
        WRAPPER_ENTRY_POINT,
        Rc::new(|_: &Invocation| Ok(None)) as NativeFn,
    ))
}

fn forward_builtin() -> Rc<Function> {
    Rc::new(Function::new(
        "forward_current_call",
        Rc::new(|_: &Invocation| Ok(None)) as NativeFn,
    ))
}

/// Simulate the host hook intercepting `target(args)` and the wrapper
/// immediately forwarding to the original.
fn intercept_and_forward(
    ctx: &mut TraceContext,
    target: Rc<Function>,
    args: Vec<Value>,
) -> Result<Option<Value>, InterceptError> {
    let mut stack = CallStack::new();

    // The intercepted call's own frame
    let original = stack.push(CallFrame::new(target, args));
    ctx.capture_original(OriginalCallContext {
        frame: original,
        receiver: None,
        calling_scope: None,
        resolved_scope: None,
    });

    // The hook invokes the wrapper, which calls the forward builtin
    stack.push(CallFrame::new(wrapper_fn(), vec![]));
    stack.push(CallFrame::new(forward_builtin(), vec![]));

    let result = forward_current_call(ctx, &stack);

    // Wrapper frame exits: the capture must not outlive it
    ctx.clear_original();
    result
}

#[test]
fn test_registered_record_found_under_any_case() {
    let mut ctx = TraceContext::new();
    let record = DispatchRecord::new(Rc::from("query"), wrapper_fn());
    ctx.registry_mut()
        .open_class_table("PDO", AllocMode::Transient)
        .store(&record);

    let table = ctx.registry().table("pdo").unwrap();
    for name in ["query", "Query", "QUERY"] {
        let found = table.lookup(&Value::str(name)).expect(name);
        assert_eq!(&*found.name, "query");
    }
    assert!(table.lookup(&Value::Int(3)).is_none());
}

#[test]
fn test_forward_matches_direct_call() {
    let target = add_fn();
    let args = vec![Value::Int(1), Value::Int(2)];

    // Direct, uninstrumented call
    let direct = target
        .call(&Invocation {
            args: &args,
            receiver: None,
            calling_scope: None,
            called_scope: None,
        })
        .unwrap();

    let mut ctx = TraceContext::new();
    let forwarded = intercept_and_forward(&mut ctx, target, args).unwrap();

    assert_eq!(direct, Some(Value::Int(3)));
    assert_eq!(forwarded, direct);
    assert!(ctx.original().is_none());
}

#[test]
fn test_forward_leaves_no_net_allocation() {
    let target = add_fn();
    let name = target.name.clone().unwrap();
    let before = Rc::strong_count(&name);

    let mut ctx = TraceContext::new();
    intercept_and_forward(&mut ctx, target, vec![Value::Int(1), Value::Int(2)]).unwrap();

    assert_eq!(Rc::strong_count(&name), before);
}

#[test]
fn test_forward_without_interception_fails_cleanly() {
    let mut ctx = TraceContext::new();
    ctx.registry_mut()
        .open_class_table("PDO", AllocMode::Transient);

    let mut stack = CallStack::new();
    stack.push(CallFrame::new(wrapper_fn(), vec![]));
    stack.push(CallFrame::new(forward_builtin(), vec![]));

    let err = forward_current_call(&ctx, &stack).unwrap_err();
    assert!(matches!(err, InterceptError::LogicError(_)));

    // No state was touched by the failed attempt
    assert!(ctx.original().is_none());
    assert_eq!(ctx.registry().len(), 1);
}

#[test]
fn test_method_forwarding_binds_receiver_class() {
    let target = Rc::new(Function::method(
        "describe",
        "Shape",
        Rc::new(|inv: &Invocation| {
            let class = inv
                .receiver
                .map(|obj| obj.borrow().class_name.to_string())
                .unwrap_or_default();
            Ok(Some(Value::str(&format!(
                "{}::{}",
                inv.called_scope.unwrap_or("?"),
                class
            ))))
        }) as NativeFn,
    ));
    let receiver = Object::boxed(Rc::from("Circle"));

    let mut stack = CallStack::new();
    let original = stack.push(CallFrame::with_receiver(
        target,
        vec![],
        receiver.clone(),
    ));
    stack.push(CallFrame::new(wrapper_fn(), vec![]));
    stack.push(CallFrame::new(forward_builtin(), vec![]));

    let mut ctx = TraceContext::new();
    ctx.capture_original(OriginalCallContext {
        frame: original,
        receiver: Some(receiver),
        calling_scope: None,
        resolved_scope: Some(Rc::from("Shape")),
    });

    let result = forward_current_call(&ctx, &stack).unwrap();
    assert_eq!(result, Some(Value::str("Circle::Circle")));
}

#[test]
fn test_reset_isolates_requests() {
    let substitute = wrapper_fn();
    let mut ctx = TraceContext::new();

    let record = DispatchRecord::new(Rc::from("query"), Rc::clone(&substitute));
    ctx.registry_mut()
        .open_class_table("PDO", AllocMode::Transient)
        .store(&record);
    drop(record);
    assert_eq!(Rc::strong_count(&substitute), 2);

    // Next request starts from a clean slate
    ctx.reset();
    assert!(ctx.registry().table("pdo").is_none());
    assert_eq!(Rc::strong_count(&substitute), 1);
}
