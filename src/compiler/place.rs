//! Assignment targets.

use std::borrow::Cow;

use super::Thunk;
use crate::{error::EvalError, expression::Frame, guard, value::Value};

/// A member key: fixed at compile time or computed per evaluation.
pub(crate) enum Key {
    Static(String),
    Computed(Thunk),
}

impl Key {
    /// Computed keys are stringified and checked against the blocklist.
    pub(crate) fn resolve(&self, frame: &mut Frame<'_>) -> Result<Cow<'_, str>, EvalError> {
        match self {
            Key::Static(name) => Ok(Cow::Borrowed(name)),
            Key::Computed(thunk) => {
                let key = thunk(frame)?.to_display_string();
                guard::ensure_safe_member_name(&key)?;
                Ok(Cow::Owned(key))
            }
        }
    }
}

pub(crate) enum Root {
    /// Identifier: lives in the locals when they already hold it, else in
    /// the context.
    Scope(String),
    This,
    /// Any other value; writes land in a copy that is then dropped.
    Temporary(Thunk),
}

/// Compiled storage location: a root and a path of member keys.
pub(crate) struct Place {
    pub(crate) root: Root,
    pub(crate) path: Vec<Key>,
}

impl Place {
    pub(crate) fn new(root: Root) -> Self {
        Place {
            root,
            path: Vec::new(),
        }
    }

    /// Evaluate the root and computed keys, leaving the write for later.
    pub(crate) fn resolve(&self, frame: &mut Frame<'_>) -> Result<Target, EvalError> {
        let temporary = match &self.root {
            Root::Temporary(thunk) => {
                let target = thunk(frame)?;
                guard::ensure_safe_object(&target)?;
                Some(target)
            }
            _ => None,
        };

        let mut keys = Vec::with_capacity(self.path.len() + 1);
        if let Root::Scope(name) = &self.root {
            keys.push(name.clone());
        }
        for key in &self.path {
            keys.push(key.resolve(frame)?.into_owned());
        }
        Ok(Target { keys, temporary })
    }

    /// Write `value` at a resolved target, materialising absent
    /// intermediates as empty records.
    pub(crate) fn write(
        &self,
        frame: &mut Frame<'_>,
        target: Target,
        value: Value,
    ) -> Result<(), EvalError> {
        let Target { keys, temporary } = target;
        match (&self.root, temporary) {
            (Root::Scope(name), _) => write_path(vivify(frame.scope_of_mut(name)), &keys, value),
            (Root::This, _) => write_path(vivify(frame.context_mut()), &keys, value),
            (Root::Temporary(_), Some(mut target)) => write_path(&mut target, &keys, value),
            (Root::Temporary(_), None) => Ok(()),
        }
    }

    pub(crate) fn store(&self, frame: &mut Frame<'_>, value: Value) -> Result<(), EvalError> {
        let target = self.resolve(frame)?;
        self.write(frame, target, value)
    }
}

/// A place whose keys have been evaluated.
pub(crate) struct Target {
    keys: Vec<String>,
    temporary: Option<Value>,
}

/// A missing context becomes an empty record on first write.
fn vivify(container: &mut Value) -> &mut Value {
    if container.is_nullish() {
        *container = Value::object();
    }
    container
}

fn write_path(container: &mut Value, keys: &[String], value: Value) -> Result<(), EvalError> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(());
    };
    let mut current = container;
    for key in parents {
        let child = current.member_mut(key, true)?;
        guard::ensure_safe_object(child)?;
        current = child;
    }
    current.set_member(last, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_path_creates_intermediates() {
        let mut root = Value::object();
        write_path(
            &mut root,
            &["a".into(), "b".into(), "c".into()],
            Value::Integer(1),
        )
        .unwrap();
        assert_eq!(
            root.get_member("a").get_member("b").get_member("c"),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_write_path_through_primitive_fails() {
        let mut root = Value::object();
        root.insert("a", 1);
        let err = write_path(&mut root, &["a".into(), "b".into()], Value::Null).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }

    #[test]
    fn test_vivify_only_replaces_nullish() {
        let mut missing = Value::Undefined;
        assert_eq!(*vivify(&mut missing), Value::object());
        let mut number = Value::Integer(3);
        assert_eq!(*vivify(&mut number), Value::Integer(3));
    }
}
