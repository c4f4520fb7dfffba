// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::GraphError;
use crate::workflow::{ExecutableGraph, Task, TaskId};
use std::collections::{HashMap, HashSet};

const INSERTED: &str = "<inserted workflow>";

/// Mutable DAG of tasks.
///
/// Edges run from predecessor to successor. A workflow is only a
/// description; [`Workflow::freeze`] turns it into an immutable
/// [`ExecutableGraph`] that dispatchers run.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    name: Option<String>,
    tasks: Vec<Task>,
    /// Parallel to `tasks`, in declaration order.
    predecessors: Vec<Vec<TaskId>>,
    index: HashMap<TaskId, usize>,
    names: HashSet<String>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Workflow of independent tasks.
    pub fn from_tasks<I: IntoIterator<Item = Task>>(tasks: I) -> Result<Self, GraphError> {
        let mut wf = Self::new();
        for task in tasks {
            wf.add_task(task, &[])?;
        }
        Ok(wf)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&i| &self.tasks[i])
    }

    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    pub fn predecessors(&self, id: TaskId) -> &[TaskId] {
        self.index
            .get(&id)
            .map(|&i| self.predecessors[i].as_slice())
            .unwrap_or(&[])
    }

    pub fn successors(&self, id: TaskId) -> Vec<TaskId> {
        self.tasks
            .iter()
            .zip(&self.predecessors)
            .filter(|(_, preds)| preds.contains(&id))
            .map(|(task, _)| task.id())
            .collect()
    }

    /// All `(predecessor, successor)` pairs.
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        self.tasks
            .iter()
            .zip(&self.predecessors)
            .flat_map(|(task, preds)| preds.iter().map(move |&p| (p, task.id())))
            .collect()
    }

    /// Add `task` with an edge from every id in `predecessors`.
    ///
    /// Repeated predecessors are collapsed to their first occurrence.
    pub fn add_task(&mut self, task: Task, predecessors: &[TaskId]) -> Result<TaskId, GraphError> {
        if self.index.contains_key(&task.id()) {
            return Err(GraphError::TaskAlreadyPresent {
                task: task.name().to_string(),
                id: task.id(),
            });
        }
        if self.names.contains(task.name()) {
            return Err(GraphError::DuplicateTaskName {
                name: task.name().to_string(),
            });
        }
        self.check_known(task.name(), predecessors)?;

        let mut preds: Vec<TaskId> = Vec::with_capacity(predecessors.len());
        for &p in predecessors {
            if !preds.contains(&p) {
                preds.push(p);
            }
        }
        Ok(self.push(task, preds))
    }

    /// Tasks with no successors, in insertion order.
    pub fn output_tasks(&self) -> Vec<TaskId> {
        let feeding: HashSet<TaskId> = self.predecessors.iter().flatten().copied().collect();
        self.tasks
            .iter()
            .map(Task::id)
            .filter(|id| !feeding.contains(id))
            .collect()
    }

    /// Tasks with no predecessors, in insertion order.
    pub fn input_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .zip(&self.predecessors)
            .filter(|(_, preds)| preds.is_empty())
            .map(|(task, _)| task.id())
            .collect()
    }

    /// Merge `other` into this workflow.
    ///
    /// Every source task of `other` gets an edge from each id in
    /// `predecessors`. `None` means "the current output tasks", captured
    /// before the merge; `Some(&[])` merges without wiring. Tasks whose
    /// names are already taken are renamed `<name>_<n>` with the smallest
    /// free `n >= 1`.
    ///
    /// Returns the output tasks of the merged-in workflow.
    pub fn insert_workflow(
        &mut self,
        other: Workflow,
        predecessors: Option<&[TaskId]>,
    ) -> Result<Vec<TaskId>, GraphError> {
        let wiring: Vec<TaskId> = match predecessors {
            Some(ids) => {
                self.check_known(other.name().unwrap_or(INSERTED), ids)?;
                ids.to_vec()
            }
            None => self.output_tasks(),
        };
        self.merge(other, |_| wiring.clone())
    }

    /// Merge `other` into this workflow, wiring its `i`-th source task to
    /// `predecessors[i]` only.
    ///
    /// Used when each branch of `other` consumes the output of one upstream
    /// task, e.g. one fit per candidate model. Fails with
    /// [`GraphError::PairingMismatch`] unless the counts are equal.
    pub fn insert_workflow_paired(
        &mut self,
        other: Workflow,
        predecessors: &[TaskId],
    ) -> Result<Vec<TaskId>, GraphError> {
        let workflow = other.name().unwrap_or(INSERTED).to_string();
        self.check_known(&workflow, predecessors)?;
        let sources = other.input_tasks().len();
        if sources != predecessors.len() {
            return Err(GraphError::PairingMismatch {
                workflow,
                sources,
                predecessors: predecessors.len(),
            });
        }
        let mut pairs = predecessors.iter();
        self.merge(other, |_| pairs.next().map(|&p| vec![p]).unwrap_or_default())
    }

    /// Union `other` into `self`. `wire` is called once per source task of
    /// `other`, in insertion order, and returns its new predecessors.
    fn merge<F>(&mut self, other: Workflow, mut wire: F) -> Result<Vec<TaskId>, GraphError>
    where
        F: FnMut(TaskId) -> Vec<TaskId>,
    {
        if let Some(task) = other.tasks.iter().find(|t| self.index.contains_key(&t.id())) {
            return Err(GraphError::TaskAlreadyPresent {
                task: task.name().to_string(),
                id: task.id(),
            });
        }

        let inserted_outputs = other.output_tasks();
        let Workflow {
            tasks,
            predecessors: other_preds,
            names: other_names,
            ..
        } = other;

        for (mut task, preds) in tasks.into_iter().zip(other_preds) {
            if self.names.contains(task.name()) {
                let renamed = self.free_name(task.name(), &other_names);
                task.rename(renamed);
            }
            let preds = if preds.is_empty() { wire(task.id()) } else { preds };
            self.push(task, preds);
        }
        Ok(inserted_outputs)
    }

    /// Validate and snapshot for execution.
    pub fn freeze(self) -> Result<ExecutableGraph, GraphError> {
        ExecutableGraph::from_workflow(self)
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<Task>, Vec<Vec<TaskId>>, HashMap<TaskId, usize>) {
        (self.name, self.tasks, self.predecessors, self.index)
    }

    fn push(&mut self, task: Task, predecessors: Vec<TaskId>) -> TaskId {
        let id = task.id();
        self.index.insert(id, self.tasks.len());
        self.names.insert(task.name().to_string());
        self.tasks.push(task);
        self.predecessors.push(predecessors);
        id
    }

    fn check_known(&self, task: &str, ids: &[TaskId]) -> Result<(), GraphError> {
        match ids.iter().find(|id| !self.index.contains_key(id)) {
            Some(&missing) => Err(GraphError::UnknownPredecessor {
                task: task.to_string(),
                missing,
            }),
            None => Ok(()),
        }
    }

    fn free_name(&self, base: &str, incoming: &HashSet<String>) -> String {
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.names.contains(candidate) && !incoming.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Value;

    fn constant(name: &str) -> Task {
        Task::constant(name, Value::Unit)
    }

    #[test]
    fn add_task_rejects_duplicate_names() {
        let mut wf = Workflow::new();
        wf.add_task(constant("a"), &[]).unwrap();
        let err = wf.add_task(constant("a"), &[]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateTaskName { name: "a".into() });
    }

    #[test]
    fn add_task_rejects_unknown_predecessors() {
        let mut wf = Workflow::new();
        let stranger = constant("elsewhere");
        let err = wf.add_task(constant("a"), &[stranger.id()]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownPredecessor { .. }));
    }

    #[test]
    fn output_tasks_is_idempotent() {
        let mut wf = Workflow::new();
        let a = wf.add_task(constant("a"), &[]).unwrap();
        let b = wf.add_task(constant("b"), &[]).unwrap();
        let c = wf.add_task(constant("c"), &[a]).unwrap();

        let first = wf.output_tasks();
        assert_eq!(first, vec![b, c]);
        assert_eq!(wf.output_tasks(), first);
        assert_eq!(wf.input_tasks(), vec![a, b]);
    }

    #[test]
    fn insert_wires_sources_to_previous_outputs() {
        let mut wf = Workflow::new();
        let a = wf.add_task(constant("a"), &[]).unwrap();
        let b = wf.add_task(constant("b"), &[]).unwrap();

        let mut other = Workflow::new();
        let x = other.add_task(constant("x"), &[]).unwrap();
        let y = other.add_task(constant("y"), &[]).unwrap();
        let z = other.add_task(constant("z"), &[x, y]).unwrap();
        let other_edges = other.edges();

        let outs = wf.insert_workflow(other, None).unwrap();

        assert_eq!(outs, vec![z]);
        assert_eq!(wf.len(), 5);
        assert_eq!(wf.predecessors(x), &[a, b]);
        assert_eq!(wf.predecessors(y), &[a, b]);
        for edge in other_edges {
            assert!(wf.edges().contains(&edge));
        }
        assert_eq!(wf.output_tasks(), vec![z]);
    }

    #[test]
    fn insert_with_empty_predecessors_does_not_wire() {
        let mut wf = Workflow::new();
        let a = wf.add_task(constant("a"), &[]).unwrap();

        let mut other = Workflow::new();
        let x = other.add_task(constant("x"), &[]).unwrap();

        wf.insert_workflow(other, Some(&[])).unwrap();
        assert!(wf.predecessors(x).is_empty());
        assert_eq!(wf.output_tasks(), vec![a, x]);
    }

    #[test]
    fn insert_renames_colliding_names() {
        let mut wf = Workflow::new();
        wf.add_task(constant("run"), &[]).unwrap();
        wf.add_task(constant("run_1"), &[]).unwrap();

        let mut other = Workflow::new();
        let r = other.add_task(constant("run"), &[]).unwrap();
        let s = other.add_task(constant("results"), &[r]).unwrap();

        wf.insert_workflow(other, Some(&[])).unwrap();
        assert_eq!(wf.task(r).unwrap().name(), "run_2");
        assert_eq!(wf.task(s).unwrap().name(), "results");
    }

    #[test]
    fn inserting_the_same_task_twice_fails() {
        let mut wf = Workflow::new();
        let t = constant("a");
        wf.add_task(t.clone(), &[]).unwrap();
        let mut other = Workflow::new();
        other.add_task(t, &[]).unwrap();

        let err = wf.insert_workflow(other, None).unwrap_err();
        assert!(matches!(err, GraphError::TaskAlreadyPresent { .. }));
    }

    #[test]
    fn paired_insert_gives_each_source_one_predecessor() {
        let mut wf = Workflow::new();
        let a = wf.add_task(constant("a"), &[]).unwrap();
        let b = wf.add_task(constant("b"), &[]).unwrap();

        let mut other = Workflow::new();
        let x = other.add_task(constant("x"), &[]).unwrap();
        let y = other.add_task(constant("y"), &[]).unwrap();
        let z = other.add_task(constant("z"), &[y]).unwrap();

        let outs = wf.insert_workflow_paired(other, &[b, a]).unwrap();

        assert_eq!(outs, vec![x, z]);
        assert_eq!(wf.predecessors(x), &[b]);
        assert_eq!(wf.predecessors(y), &[a]);
        assert_eq!(wf.predecessors(z), &[y]);
    }

    #[test]
    fn paired_insert_rejects_count_mismatch() {
        let mut wf = Workflow::new();
        let a = wf.add_task(constant("a"), &[]).unwrap();

        let other = Workflow::from_tasks([constant("x"), constant("y")]).unwrap();
        let err = wf.insert_workflow_paired(other, &[a]).unwrap_err();

        assert_eq!(
            err,
            GraphError::PairingMismatch {
                workflow: INSERTED.to_string(),
                sources: 2,
                predecessors: 1,
            }
        );
        assert_eq!(wf.len(), 1);
    }
}
