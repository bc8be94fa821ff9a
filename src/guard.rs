//! Sandbox checks run by generated evaluators.
//!
//! Expressions must only ever see the data graph they are handed. The
//! guard blocks the escape hatches a host can leak into that graph:
//!
//! - reflective member names that reach constructor or prototype machinery,
//! - records that look like the global execution environment or a UI
//!   element handle,
//! - the function-constructing type itself and generic call forwarders.
//!
//! Member names known at compile time are checked once by the compiler;
//! computed keys and every value flowing through member access, calls and
//! assignment are checked while evaluating.

use crate::value::{FunctionKind, Value};

/// Member names that are never readable or writable from an expression.
pub const BLOCKED_MEMBERS: &[&str] = &[
    "constructor",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

/// Keys a record must expose together to be taken for the global object.
const GLOBAL_MARKERS: &[&str] = &["window", "document", "location"];

/// Keys that, with `children`, mark a jQuery-style element wrapper.
const WRAPPER_MARKERS: &[&str] = &["prop", "attr", "find"];

/// A sandbox violation. Fatal for the evaluation that raised it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    #[error("Referencing '{0}' is disallowed in expressions")]
    BlockedMember(String),

    #[error("Referencing the global object in expressions is disallowed")]
    GlobalObject,

    #[error("Referencing UI elements in expressions is disallowed")]
    Element,

    #[error("Referencing the function constructor in expressions is disallowed")]
    FunctionConstructor,

    #[error("Calling call/apply/bind style forwarders in expressions is disallowed")]
    CallForwarder,
}

pub fn ensure_safe_member_name(name: &str) -> Result<(), SecurityError> {
    if BLOCKED_MEMBERS.contains(&name) {
        return Err(SecurityError::BlockedMember(name.to_string()));
    }
    Ok(())
}

/// Reject values that must never be dereferenced or handed around.
pub fn ensure_safe_object(value: &Value) -> Result<(), SecurityError> {
    match value {
        Value::Function(f) if f.kind() == FunctionKind::Constructor => {
            Err(SecurityError::FunctionConstructor)
        }
        Value::Object(_) if looks_like_global(value) => Err(SecurityError::GlobalObject),
        Value::Object(_) if looks_like_element(value) => Err(SecurityError::Element),
        _ => Ok(()),
    }
}

/// Reject callees that are unsafe to invoke.
pub fn ensure_safe_function(value: &Value) -> Result<(), SecurityError> {
    match value {
        Value::Function(f) => match f.kind() {
            FunctionKind::Plain => Ok(()),
            FunctionKind::Constructor => Err(SecurityError::FunctionConstructor),
            FunctionKind::CallForwarder => Err(SecurityError::CallForwarder),
        },
        _ => Ok(()),
    }
}

fn looks_like_global(value: &Value) -> bool {
    GLOBAL_MARKERS.iter().all(|key| value.has_key(key))
}

fn looks_like_element(value: &Value) -> bool {
    value.has_key("children")
        && (value.has_key("nodeName") || WRAPPER_MARKERS.iter().all(|key| value.has_key(key)))
}
