//! Bounded execution of blocking engine work
//!
//! The engine offers no cooperative cancellation, so a deadline can only stop
//! the *caller* from waiting. Work runs on tokio's blocking pool and races a
//! timer:
//!
//! ```text
//!   caller ──► spawn_blocking(work) ──────────────► result ─┐
//!      │                                                    │ first CAS wins
//!      └────► timeout(limit) ─────► deadline ──────────────┘
//! ```
//!
//! Whoever flips the shared state word out of `PENDING` first decides the
//! outcome. A worker that loses keeps running to completion and its result
//! is dropped where it stands.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use super::error::{OfficeError, Result};

const PENDING: u8 = 0;
const FINISHED: u8 = 1;
const ABANDONED: u8 = 2;

/// Counters shared by every bounded call against one engine
#[derive(Debug, Default)]
pub(crate) struct LoadCounters {
    started: AtomicUsize,
    completed: AtomicUsize,
    timed_out: AtomicUsize,
    in_flight: AtomicUsize,
    abandoned_running: AtomicUsize,
    abandoned_finished: AtomicUsize,
}

impl LoadCounters {
    pub(crate) fn snapshot(&self) -> LoadStats {
        LoadStats {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            abandoned_running: self.abandoned_running.load(Ordering::Relaxed),
            abandoned_finished: self.abandoned_finished.load(Ordering::Relaxed),
        }
    }
}

/// Bounded load statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    /// Bounded calls issued
    pub started: usize,
    /// Calls whose work finished before the deadline
    pub completed: usize,
    /// Calls that returned `Timeout`
    pub timed_out: usize,
    /// Workers currently executing (bounded or abandoned)
    pub in_flight: usize,
    /// Timed-out workers still executing in the background
    pub abandoned_running: usize,
    /// Timed-out workers that have since finished; their results were dropped
    pub abandoned_finished: usize,
}

/// Decrements `in_flight` even if the work panics
struct InFlight(Arc<LoadCounters>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Run `work` on the blocking pool and wait at most `limit` for it.
///
/// Returns the work's own result if it finishes first, otherwise
/// `OfficeError::Timeout(limit)`. The work is never interrupted.
pub(crate) async fn run_bounded<F, T>(
    counters: &Arc<LoadCounters>,
    limit: Duration,
    work: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::new(AtomicU8::new(PENDING));
    let worker_state = Arc::clone(&state);
    let worker_counters = Arc::clone(counters);

    counters.started.fetch_add(1, Ordering::Relaxed);
    counters.in_flight.fetch_add(1, Ordering::Relaxed);

    let mut task = tokio::task::spawn_blocking(move || {
        let _in_flight = InFlight(Arc::clone(&worker_counters));
        let outcome = work();

        if worker_state
            .compare_exchange(PENDING, FINISHED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            worker_counters.abandoned_running.fetch_sub(1, Ordering::Relaxed);
            worker_counters.abandoned_finished.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                succeeded = outcome.is_ok(),
                "Abandoned engine work finished after its deadline; result discarded"
            );
        }
        outcome
    });

    let joined = match timeout(limit, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            // Count before the CAS so the worker's decrement can never run first.
            counters.abandoned_running.fetch_add(1, Ordering::Relaxed);
            if state
                .compare_exchange(PENDING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                counters.timed_out.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(?limit, "Engine work exceeded deadline; leaving it to finish in the background");
                return Err(OfficeError::Timeout(limit));
            }
            // Worker finished between the timer firing and our CAS; its
            // result is already available.
            counters.abandoned_running.fetch_sub(1, Ordering::Relaxed);
            task.await
        }
    };

    counters.completed.fetch_add(1, Ordering::Relaxed);
    joined.map_err(|e| OfficeError::Worker(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn counters() -> Arc<LoadCounters> {
        Arc::new(LoadCounters::default())
    }

    #[tokio::test]
    async fn test_fast_work_wins() {
        let counters = counters();
        let value = run_bounded(&counters, Duration::from_secs(5), || Ok(42))
            .await
            .unwrap();

        assert_eq!(value, 42);
        let stats = counters.snapshot();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.timed_out, 0);
    }

    #[tokio::test]
    async fn test_work_error_propagates() {
        let counters = counters();
        let result: Result<()> = run_bounded(&counters, Duration::from_secs(5), || {
            Err(OfficeError::DocumentNotFound("kittens.docx".into()))
        })
        .await;

        assert!(matches!(result, Err(OfficeError::DocumentNotFound(_))));
        assert_eq!(counters.snapshot().completed, 1);
    }

    #[tokio::test]
    async fn test_slow_work_times_out_promptly() {
        let counters = counters();
        let started = Instant::now();
        let result = run_bounded(&counters, Duration::from_millis(50), || {
            std::thread::sleep(Duration::from_millis(600));
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(OfficeError::Timeout(d)) if d == Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_millis(500));

        let stats = counters.snapshot();
        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.abandoned_running, 1);
        assert_eq!(stats.in_flight, 1);
    }

    #[tokio::test]
    async fn test_abandoned_work_runs_to_completion() {
        let counters = counters();
        let (tx, rx) = tokio::sync::oneshot::channel();

        let result = run_bounded(&counters, Duration::from_millis(20), move || {
            std::thread::sleep(Duration::from_millis(150));
            let _ = tx.send(());
            Ok("late")
        })
        .await;
        assert!(matches!(result, Err(OfficeError::Timeout(_))));

        // The worker was not cancelled: it still signals when done.
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("abandoned worker never finished")
            .unwrap();

        // Counters are updated right after the send; give the worker a moment.
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let stats = counters.snapshot();
            if (stats.abandoned_finished == 1 && stats.in_flight == 0) || Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let stats = counters.snapshot();
        assert_eq!(stats.abandoned_finished, 1);
        assert_eq!(stats.abandoned_running, 0);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_panicking_work_is_a_worker_error() {
        let counters = counters();
        let result: Result<()> = run_bounded(&counters, Duration::from_secs(5), || {
            panic!("engine blew up");
        })
        .await;

        assert!(matches!(result, Err(OfficeError::Worker(_))));
        assert_eq!(counters.snapshot().in_flight, 0);
    }
}
