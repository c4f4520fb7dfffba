// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end runs of small workflows on both backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::database::{LocalDirectoryToolDatabase, RESULTS_FILE};
use crate::engine::{execute_workflow, DistributedDispatcher, LocalCluster, ThreadedDispatcher};
use crate::errors::{DispatchError, GraphError};
use crate::results::Results;
use crate::traits::{Dispatcher, ToolDatabase};
use crate::workflow::{Task, Value, Workflow};

fn database(dir: &tempfile::TempDir) -> Arc<dyn ToolDatabase> {
    Arc::new(LocalDirectoryToolDatabase::create("test", dir.path().join("db"), true).unwrap())
}

fn dispatchers() -> Vec<Arc<dyn Dispatcher>> {
    vec![
        Arc::new(ThreadedDispatcher::new(4)),
        Arc::new(DistributedDispatcher::new(2)),
    ]
}

fn sum(name: &str) -> Task {
    Task::pure(name, |args| Ok(Value::Int(args.iter().filter_map(Value::as_int).sum())))
}

fn add_one(name: &str) -> Task {
    Task::pure(name, |args| {
        let x = args.first().and_then(Value::as_int).unwrap_or_default();
        Ok(Value::Int(x + 1))
    })
}

async fn run(wf: Workflow, dispatcher: &Arc<dyn Dispatcher>, dir: &tempfile::TempDir) -> Result<Value, DispatchError> {
    execute_workflow(wf, Some(dispatcher.clone()), Some(database(dir))).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn constant_workflow() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let wf = Workflow::from_tasks([Task::constant("t1", 1)]).unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(1), "{}", dispatcher.name());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unary_chain() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let mut wf = Workflow::new();
        let t1 = wf.add_task(Task::constant("t1", 1), &[]).unwrap();
        wf.add_task(add_one("t2"), &[t1]).unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(2), "{}", dispatcher.name());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn binary_sum() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let mut wf = Workflow::new();
        let a = wf.add_task(Task::constant("a", 1), &[]).unwrap();
        let b = wf.add_task(Task::constant("b", 2), &[]).unwrap();
        wf.add_task(sum("add"), &[a, b]).unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(3), "{}", dispatcher.name());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn map_reduce_sum_of_squares() {
    const N: i64 = 10;
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let mut wf = Workflow::named("map_reduce");
        let mut squares = Vec::new();
        for i in 0..N {
            let x = wf.add_task(Task::constant(format!("x{i}"), i), &[]).unwrap();
            let sq = Task::pure(format!("square{i}"), |args| {
                let x = args[0].as_int().unwrap_or_default();
                Ok(Value::Int(x * x))
            });
            squares.push(wf.add_task(sq, &[x]).unwrap());
        }
        wf.add_task(sum("reduce"), &squares).unwrap();

        let expected: i64 = (0..N).map(|i| i * i).sum();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(expected), "{}", dispatcher.name());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn predecessor_outputs_follow_declaration_order() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let mut wf = Workflow::new();
        let a = wf.add_task(Task::constant("a", "a"), &[]).unwrap();
        let b = wf.add_task(Task::constant("b", "b"), &[]).unwrap();
        let concat = Task::pure("concat", |args| {
            Ok(Value::Text(args.iter().filter_map(Value::as_text).collect()))
        })
        .with_arg(">");
        wf.add_task(concat, &[b, a]).unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::from(">ba"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_task_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let after = Arc::new(AtomicUsize::new(0));
        let counter = after.clone();

        let mut wf = Workflow::new();
        let boom = wf
            .add_task(Task::pure("boom", |_| Err(anyhow::anyhow!("estimation crashed"))), &[])
            .unwrap();
        wf.add_task(
            Task::pure("after", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Unit)
            }),
            &[boom],
        )
        .unwrap();

        match run(wf, &dispatcher, &dir).await.unwrap_err() {
            DispatchError::TaskFailed { task, source } => {
                assert_eq!(task, "boom");
                assert_eq!(source.to_string(), "estimation crashed");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_task_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let wf = Workflow::from_tasks([Task::pure("explode", |_| panic!("bad input"))]).unwrap();
        match run(wf, &dispatcher, &dir).await.unwrap_err() {
            DispatchError::TaskPanicked { task, message } => {
                assert_eq!(task, "explode");
                assert_eq!(message, "bad input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_outputs_fail_before_any_task_runs() {
    let dir = tempfile::tempdir().unwrap();
    let executed = Arc::new(AtomicUsize::new(0));
    let mut wf = Workflow::new();
    for name in ["a", "b"] {
        let executed = executed.clone();
        wf.add_task(
            Task::pure(name, move |_| {
                executed.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Unit)
            }),
            &[],
        )
        .unwrap();
    }

    let dispatcher: Arc<dyn Dispatcher> = Arc::new(ThreadedDispatcher::new(2));
    let err = run(wf, &dispatcher, &dir).await.unwrap_err();
    assert!(matches!(err, DispatchError::Graph(GraphError::OutputCount { .. })));
    assert_eq!(executed.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn results_output_gets_a_database_reference() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(&dir);

    let wf = Workflow::from_tasks([Task::constant("results", Results::new("demo").with_field("answer", 42))]).unwrap();
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(ThreadedDispatcher::new(1));
    let value = execute_workflow(wf, Some(dispatcher), Some(db.clone())).await.unwrap();

    let results = value.into_results().unwrap();
    assert_eq!(results.tool_database(), Some(&db.to_ref()));
    let stored = crate::results::read_results(db.path().join(RESULTS_FILE)).unwrap();
    assert_eq!(stored.field("answer"), Some(&serde_json::json!(42)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn results_with_a_reference_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let db = database(&dir);
    let elsewhere = LocalDirectoryToolDatabase::create("other", dir.path().join("other"), false).unwrap();

    let mut res = Results::new("demo");
    res.set_tool_database(elsewhere.to_ref());
    let wf = Workflow::from_tasks([Task::constant("results", res.clone())]).unwrap();
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(ThreadedDispatcher::new(1));
    let value = execute_workflow(wf, Some(dispatcher), Some(db.clone())).await.unwrap();

    assert_eq!(value, Value::Results(res));
    assert!(!db.path().join(RESULTS_FILE).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scratch_directory_is_removed_after_the_run() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let wf = Workflow::from_tasks([Task::new("write", |ctx, _| {
            let task_dir = ctx.task_dir("write")?;
            std::fs::write(task_dir.join("model.mod"), "$PROBLEM")?;
            Ok(Value::Text(ctx.scratch_dir().display().to_string()))
        })])
        .unwrap();

        let scratch = run(wf, &dispatcher, &dir).await.unwrap();
        let scratch = std::path::PathBuf::from(scratch.as_text().unwrap());
        assert!(!scratch.exists());
        assert_ne!(std::env::current_dir().unwrap(), scratch);
    }
}

fn nested_sum_task(name: &str) -> Task {
    Task::new(name, |ctx, _| {
        let mut inner = Workflow::named("inner");
        let a = inner.add_task(Task::constant("a", 1), &[])?;
        let b = inner.add_task(Task::constant("b", 2), &[])?;
        inner.add_task(sum("add"), &[a, b])?;
        Ok(ctx.call_workflow(inner)?)
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn nested_call_fails_on_threaded_backend() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(ThreadedDispatcher::new(2));
    let wf = Workflow::from_tasks([nested_sum_task("outer")]).unwrap();

    match run(wf, &dispatcher, &dir).await.unwrap_err() {
        DispatchError::TaskFailed { task, source } => {
            assert_eq!(task, "outer");
            assert!(matches!(source.downcast_ref::<DispatchError>(), Some(DispatchError::NoClient)));
            assert_eq!(source.to_string(), "No global client found and no address provided");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn nested_call_on_a_single_worker_cluster() {
    let dir = tempfile::tempdir().unwrap();
    // One worker: the nested tasks can only run on the replacement worker.
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(DistributedDispatcher::new(1));
    let wf = Workflow::from_tasks([nested_sum_task("outer")]).unwrap();
    assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_worker_blocked_on_nested_runs() {
    let dir = tempfile::tempdir().unwrap();
    let cluster = LocalCluster::start(2).unwrap();
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(DistributedDispatcher::connect(cluster.clone()));

    let mut wf = Workflow::new();
    let outers: Vec<_> = (0..4)
        .map(|i| wf.add_task(nested_sum_task(&format!("outer{i}")), &[]).unwrap())
        .collect();
    wf.add_task(sum("total"), &outers).unwrap();

    assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(12));
    cluster.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shared_cluster_serves_consecutive_runs() {
    let dir = tempfile::tempdir().unwrap();
    let cluster = LocalCluster::start(2).unwrap();
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(DistributedDispatcher::connect(cluster.clone()));

    for i in 0..3 {
        let mut wf = Workflow::new();
        let x = wf.add_task(Task::constant("x", i), &[]).unwrap();
        wf.add_task(add_one("y"), &[x]).unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Int(i + 1));
    }

    cluster.shutdown();
    let wf = Workflow::from_tasks([Task::constant("x", 0)]).unwrap();
    let err = run(wf, &dispatcher, &dir).await.unwrap_err();
    assert!(matches!(err, DispatchError::BackendUnavailable { .. }));
}

// There is no timeout at the workflow layer; a slow task simply delays the
// run and a hung task would block it indefinitely.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_tasks_are_waited_for() {
    let dir = tempfile::tempdir().unwrap();
    for dispatcher in dispatchers() {
        let wf = Workflow::from_tasks([Task::pure("slow", |_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Value::Bool(true))
        })])
        .unwrap();
        assert_eq!(run(wf, &dispatcher, &dir).await.unwrap(), Value::Bool(true));
    }
}
