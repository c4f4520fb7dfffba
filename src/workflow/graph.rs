// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TaskContext;
use crate::errors::{DispatchError, GraphError};
use crate::workflow::validation::find_cycle;
use crate::workflow::{TaskFn, TaskId, Value, Workflow};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Where a task argument comes from.
#[derive(Debug, Clone)]
pub enum ArgRef {
    Bound(Value),
    /// Output of the node at this index.
    Output(usize),
}

pub struct ExecutableNode {
    id: TaskId,
    name: String,
    func: TaskFn,
    args: Vec<ArgRef>,
    successors: Vec<usize>,
    dependency_count: usize,
}

impl ExecutableNode {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgRef] {
        &self.args
    }

    pub fn successors(&self) -> &[usize] {
        &self.successors
    }
}

/// Immutable, validated form of a [`Workflow`].
///
/// Nodes are indexed densely in the workflow's insertion order. The graph
/// is acyclic and has exactly one sink, whose output is the result of
/// the run.
pub struct ExecutableGraph {
    name: Option<String>,
    nodes: Vec<ExecutableNode>,
    sink: usize,
}

impl ExecutableGraph {
    pub(crate) fn from_workflow(workflow: Workflow) -> Result<Self, GraphError> {
        let outputs = workflow.output_tasks();
        let (name, tasks, predecessors, index) = workflow.into_parts();

        if tasks.is_empty() {
            return Err(GraphError::EmptyWorkflow {
                workflow: name.unwrap_or_default(),
            });
        }

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut pred_indices: Vec<Vec<usize>> = Vec::with_capacity(tasks.len());
        for (i, preds) in predecessors.iter().enumerate() {
            let mut resolved = Vec::with_capacity(preds.len());
            for p in preds {
                let &j = index.get(p).ok_or_else(|| GraphError::UnknownPredecessor {
                    task: tasks[i].name().to_string(),
                    missing: *p,
                })?;
                successors[j].push(i);
                resolved.push(j);
            }
            pred_indices.push(resolved);
        }

        let names: Vec<String> = tasks.iter().map(|t| t.name().to_string()).collect();
        if let Some(cycle) = find_cycle(&names, &successors) {
            return Err(GraphError::CyclicDependency { cycle });
        }

        let sink = match outputs.as_slice() {
            [only] => index[only],
            _ => {
                return Err(GraphError::OutputCount {
                    outputs: outputs
                        .iter()
                        .map(|id| names[index[id]].clone())
                        .collect(),
                })
            }
        };

        let nodes = tasks
            .into_iter()
            .zip(pred_indices)
            .zip(successors)
            .map(|((task, preds), succ)| {
                let mut args: Vec<ArgRef> =
                    task.bound_args().iter().cloned().map(ArgRef::Bound).collect();
                args.extend(preds.iter().map(|&j| ArgRef::Output(j)));
                ExecutableNode {
                    id: task.id(),
                    name: task.name().to_string(),
                    func: task.func().clone(),
                    args,
                    successors: succ,
                    dependency_count: preds.len(),
                }
            })
            .collect();

        Ok(Self { name, nodes, sink })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &ExecutableNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[ExecutableNode] {
        &self.nodes
    }

    pub fn sink(&self) -> usize {
        self.sink
    }

    /// Nodes with no predecessors.
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.dependency_count == 0)
            .map(|(i, _)| i)
    }

    /// Unfinished-predecessor counters, one per node.
    pub fn dependency_counts(&self) -> Vec<usize> {
        self.nodes.iter().map(|n| n.dependency_count).collect()
    }

    /// Materialize the argument list of `index` from finished outputs.
    pub fn collect_args(&self, index: usize, outputs: &[Option<Value>]) -> Result<Vec<Value>, DispatchError> {
        let node = &self.nodes[index];
        node.args
            .iter()
            .map(|arg| match arg {
                ArgRef::Bound(v) => Ok(v.clone()),
                ArgRef::Output(j) => outputs.get(*j).and_then(|o| o.clone()).ok_or_else(|| {
                    DispatchError::Internal(format!(
                        "task '{}' scheduled before its input '{}' finished",
                        node.name, self.nodes[*j].name
                    ))
                }),
            })
            .collect()
    }

    /// Run the callable of `index`, turning errors and panics into
    /// [`DispatchError`]s named after the task.
    pub fn invoke(&self, index: usize, ctx: &TaskContext, args: Vec<Value>) -> Result<Value, DispatchError> {
        let node = &self.nodes[index];
        match catch_unwind(AssertUnwindSafe(|| (node.func)(ctx, args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(DispatchError::TaskFailed {
                task: node.name.clone(),
                source,
            }),
            Err(payload) => Err(DispatchError::TaskPanicked {
                task: node.name.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl std::fmt::Debug for ExecutableGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutableGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>())
            .field("sink", &self.nodes[self.sink].name)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Task;

    #[test]
    fn empty_workflow_is_rejected() {
        let err = Workflow::named("nothing").freeze().unwrap_err();
        assert_eq!(err, GraphError::EmptyWorkflow { workflow: "nothing".into() });
    }

    #[test]
    fn two_outputs_are_rejected_before_anything_runs() {
        let mut wf = Workflow::new();
        wf.add_task(Task::pure("a", |_| panic!("must not run")), &[]).unwrap();
        wf.add_task(Task::pure("b", |_| panic!("must not run")), &[]).unwrap();

        let err = wf.freeze().unwrap_err();
        assert_eq!(err, GraphError::OutputCount { outputs: vec!["a".into(), "b".into()] });
    }

    #[test]
    fn arguments_are_bound_then_predecessors_in_order() {
        let mut wf = Workflow::new();
        let x = wf.add_task(Task::constant("x", 1), &[]).unwrap();
        let y = wf.add_task(Task::constant("y", 2), &[]).unwrap();
        wf.add_task(Task::pure("f", |_| Ok(Value::Unit)).with_arg("bound"), &[y, x])
            .unwrap();

        let graph = wf.freeze().unwrap();
        let sink = graph.node(graph.sink());
        assert_eq!(sink.name(), "f");
        assert!(matches!(sink.args(), [ArgRef::Bound(Value::Text(_)), ArgRef::Output(1), ArgRef::Output(0)]));
        assert_eq!(graph.sources().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(graph.dependency_counts(), vec![0, 0, 2]);
    }

    #[test]
    fn collect_args_reports_missing_inputs() {
        let mut wf = Workflow::new();
        let x = wf.add_task(Task::constant("x", 1), &[]).unwrap();
        wf.add_task(Task::pure("f", |_| Ok(Value::Unit)), &[x]).unwrap();
        let graph = wf.freeze().unwrap();

        let err = graph.collect_args(1, &[None, None]).unwrap_err();
        assert!(matches!(err, DispatchError::Internal(_)));
        let args = graph.collect_args(1, &[Some(Value::Int(1)), None]).unwrap();
        assert_eq!(args, vec![Value::Int(1)]);
    }
}
