// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TaskContext;
use crate::workflow::Value;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callable executed for a task.
///
/// Receives the task's bound arguments followed by the outputs of its
/// predecessors, in the order the predecessors were declared.
pub type TaskFn = Arc<dyn Fn(&TaskContext, Vec<Value>) -> anyhow::Result<Value> + Send + Sync>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique task identity, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A named unit of work.
///
/// Two tasks with the same name are still distinct tasks; workflows key
/// their edges on [`TaskId`].
#[derive(Clone)]
pub struct Task {
    id: TaskId,
    name: String,
    func: TaskFn,
    bound_args: Vec<Value>,
}

impl Task {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&TaskContext, Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            id: TaskId::next(),
            name: name.into(),
            func: Arc::new(func),
            bound_args: Vec::new(),
        }
    }

    /// Task whose body does not need the execution context.
    pub fn pure<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, move |_ctx, args| func(args))
    }

    /// Task that ignores its inputs and yields `value`.
    pub fn constant(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::pure(name, move |_| Ok(value.clone()))
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.bound_args.push(arg.into());
        self
    }

    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.bound_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bound_args(&self) -> &[Value] {
        &self.bound_args
    }

    pub(crate) fn func(&self) -> &TaskFn {
        &self.func
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }
}

impl Debug for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bound_args", &self.bound_args.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_even_for_equal_names() {
        let a = Task::constant("x", 1);
        let b = Task::constant("x", 1);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn bound_args_keep_order() {
        let t = Task::pure("add", |_| Ok(Value::Unit)).with_arg(1).with_args([2, 3]);
        assert_eq!(t.bound_args(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
    }
}
