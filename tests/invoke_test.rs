use std::thread;
use std::time::{Duration, Instant};

use taskpool::{InvokeError, PoolError, TaskError, ThreadPool};

#[test]
fn invoke_any_returns_the_single_successful_result() {
    let pool = ThreadPool::fixed(3).unwrap();
    let result: i32 = pool
        .invoke_any((0..3).map(|i| {
            move || {
                if i == 1 {
                    Ok(7)
                } else {
                    Err(format!("task {i} failed"))
                }
            }
        }))
        .unwrap();
    assert_eq!(result, 7);
}

#[test]
fn invoke_any_aggregates_when_every_task_fails() {
    let pool = ThreadPool::fixed(2).unwrap();
    let result = pool.invoke_any::<i32, _, _, _>(
        (0..3).map(|i| move || Err::<i32, _>(format!("failure {i}"))),
    );
    match result {
        Err(InvokeError::AllFailed { count, last }) => {
            assert_eq!(count, 3);
            assert!(matches!(last, TaskError::Failed(_)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn invoke_any_counts_panics_as_failures() {
    let pool = ThreadPool::fixed(2).unwrap();
    let result = pool.invoke_any(
        (0..2).map(|_| || -> Result<i32, String> { panic!("unreliable") }),
    );
    match result {
        Err(InvokeError::AllFailed { count, last }) => {
            assert_eq!(count, 2);
            assert!(matches!(last, TaskError::Panicked(_)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn invoke_any_times_out_when_nothing_finishes() {
    let pool = ThreadPool::fixed(2).unwrap();
    let started = Instant::now();
    let result = pool.invoke_any_timeout(
        (0..2).map(|_| {
            || -> Result<i32, String> {
                thread::sleep(Duration::from_secs(10));
                Ok(0)
            }
        }),
        Duration::from_millis(300),
    );
    assert!(matches!(result, Err(InvokeError::Timeout(_))));
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[test]
fn invoke_any_rejects_an_empty_task_set() {
    let pool = ThreadPool::fixed(1).unwrap();
    let tasks: Vec<fn() -> Result<i32, String>> = Vec::new();
    assert!(matches!(pool.invoke_any(tasks), Err(InvokeError::EmptyTaskSet)));
}

#[test]
fn invoke_any_rejects_a_shut_down_pool() {
    let pool = ThreadPool::fixed(1).unwrap();
    pool.shutdown();
    let result = pool.invoke_any((0..2).map(|i| move || -> Result<i32, String> { Ok(i) }));
    assert!(matches!(result, Err(InvokeError::Pool(PoolError::ShutDown))));
}

#[test]
fn invoke_all_returns_done_handles_in_submission_order() {
    let pool = ThreadPool::fixed(4).unwrap();
    let handles = pool
        .invoke_all((0..4u64).map(|i| {
            move || {
                // Later submissions finish earlier; order must still hold.
                thread::sleep(Duration::from_millis((4 - i) * 20));
                Ok::<_, String>(i)
            }
        }))
        .unwrap();

    assert_eq!(handles.len(), 4);
    for handle in &handles {
        assert!(handle.is_done());
    }
    let values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(values, vec![0, 1, 2, 3]);
}

#[test]
fn invoke_all_keeps_failed_tasks_in_the_result() {
    let pool = ThreadPool::fixed(2).unwrap();
    let handles = pool
        .invoke_all((0..3).map(|i| {
            move || {
                if i == 1 {
                    Err(format!("task {i} broke"))
                } else {
                    Ok(i)
                }
            }
        }))
        .unwrap();

    let outcomes: Vec<Result<i32, TaskError>> =
        handles.into_iter().map(|h| h.join()).collect();
    assert_eq!(outcomes[0].as_ref().unwrap(), &0);
    assert!(matches!(outcomes[1], Err(TaskError::Failed(_))));
    assert_eq!(outcomes[2].as_ref().unwrap(), &2);
}

#[test]
fn invoke_all_timeout_returns_early_with_unfinished_handles() {
    let pool = ThreadPool::fixed(1).unwrap();
    let started = Instant::now();
    let handles = pool
        .invoke_all_timeout(
            (0..3).map(|i| {
                move || {
                    thread::sleep(Duration::from_millis(400));
                    Ok::<_, String>(i)
                }
            }),
            Duration::from_millis(150),
        )
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(400 * 3));
    assert_eq!(handles.len(), 3);
    assert!(
        handles.iter().any(|h| !h.is_done()),
        "a timeout shorter than the workload must leave handles not-done"
    );
}

#[test]
fn invoke_all_with_no_tasks_returns_an_empty_vec() {
    let pool = ThreadPool::fixed(1).unwrap();
    let tasks: Vec<fn() -> Result<i32, String>> = Vec::new();
    let handles = pool.invoke_all(tasks).unwrap();
    assert!(handles.is_empty());
}
