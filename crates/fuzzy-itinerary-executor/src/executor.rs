//! Concurrent executor implementation.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use fuzzy_itinerary::{Itinerary, ItineraryParser, LocationResolver};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::admission::{Admission, AdmissionGate, CloseOnDrop, SlotGuard};
use crate::config::ExecutionBudget;
use crate::error::{ExecutorResult, QueryExecutionError};
use crate::planner::QueryPlanner;
use crate::probe::SystemMemoryProbe;
use crate::result::{ExecutionStats, ResultSet, TaskOutcome};
use crate::task::QueryTask;
use crate::traits::{MemoryProbe, QueryCollaborator};

/// Runs query tasks on a bounded worker pool under memory admission control.
///
/// Each task moves through `queued → admitted → dispatched → completed | failed`.
/// A task is admitted once a worker is free and sampled available memory
/// exceeds the budget's `max_memory_bytes`. Failures and panics of the
/// collaborator are recorded per task and never abort the run.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use fuzzy_itinerary_executor::{ConcurrentExecutor, ExecutionBudget, SystemMemoryProbe};
///
/// let probe = Arc::new(SystemMemoryProbe::new()?);
/// let budget = ExecutionBudget::builder()
///     .with_max_workers(4)
///     .build_for(probe.as_ref());
/// let executor = ConcurrentExecutor::new(budget, probe)?;
///
/// let results = executor.search(&trip, &flight_search);
/// for row in results.into_result()? {
///     println!("{row}");
/// }
/// ```
pub struct ConcurrentExecutor {
    budget: ExecutionBudget,
    probe: Arc<dyn MemoryProbe>,
    pool: ThreadPool,
}

impl ConcurrentExecutor {
    /// Creates an executor with its own pool of `budget.max_workers` threads.
    ///
    /// Fails if the budget is invalid or the pool cannot be started.
    pub fn new(budget: ExecutionBudget, probe: Arc<dyn MemoryProbe>) -> ExecutorResult<Self> {
        budget.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(budget.max_workers)
            .thread_name(|i| format!("itinerary-query-{i}"))
            .build()?;
        Ok(Self {
            budget,
            probe,
            pool,
        })
    }

    /// Creates an executor probing `/proc/meminfo`, with one worker per CPU
    /// and a memory floor at the default fraction of what is available now.
    pub fn with_defaults() -> ExecutorResult<Self> {
        let probe = Arc::new(SystemMemoryProbe::new()?);
        let budget = ExecutionBudget::builder().build_for(probe.as_ref());
        Self::new(budget, probe)
    }

    /// Returns the execution budget.
    pub fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    /// Runs every task and returns once each has completed or failed.
    ///
    /// Outcomes are in completion order.
    pub fn run<C>(&self, tasks: Vec<QueryTask<C::Row>>, collaborator: &C) -> ResultSet<C::Row>
    where
        C: QueryCollaborator,
    {
        let started = Instant::now();
        let total = tasks.len();
        info!(
            tasks = total,
            max_workers = self.budget.max_workers,
            max_memory_bytes = self.budget.max_memory_bytes,
            "starting query run"
        );

        let gate = AdmissionGate::new(
            self.budget.max_memory_bytes,
            self.budget.max_workers,
            self.probe.available_bytes(),
        );
        let outcomes = Mutex::new(Vec::with_capacity(total));
        let counters = RunCounters::default();

        thread::scope(|s| {
            s.spawn(|| gate.run_sampler(self.probe.as_ref(), self.budget.sample_interval));

            self.pool.in_place_scope(|scope| {
                let _close = CloseOnDrop(&gate);
                let mut queue = tasks.into_iter();

                while let Some(task) = queue.next() {
                    match gate.admit(self.budget.admission_timeout) {
                        Admission::Admitted { deferred } => {
                            if deferred {
                                counters.deferred.fetch_add(1, Ordering::Relaxed);
                            }
                            let (gate, outcomes, counters) = (&gate, &outcomes, &counters);
                            scope.spawn(move |_| {
                                let _slot = SlotGuard(gate);
                                let outcome = dispatch(collaborator, task, counters);
                                outcomes.lock().push(outcome);
                            });
                        }
                        Admission::TimedOut => {
                            let timeout = self.budget.admission_timeout.unwrap_or_default();
                            let mut outcomes = outcomes.lock();
                            let before = outcomes.len();
                            outcomes.extend(std::iter::once(task).chain(queue.by_ref()).map(
                                |task| {
                                    TaskOutcome::failed(
                                        task,
                                        QueryExecutionError::AdmissionTimeout(timeout),
                                    )
                                },
                            ));
                            warn!(
                                abandoned = outcomes.len() - before,
                                ?timeout,
                                "admission timed out, failing queued tasks"
                            );
                            break;
                        }
                    }
                }
            });
        });

        let outcomes = outcomes.into_inner();
        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        let stats = ExecutionStats {
            duration: started.elapsed(),
            total,
            completed,
            failed: outcomes.len() - completed,
            deferred_admissions: counters.deferred.load(Ordering::Relaxed),
            peak_concurrency: counters.peak.load(Ordering::Relaxed),
            memory_samples: gate.samples(),
        };
        info!(
            completed = stats.completed,
            failed = stats.failed,
            deferred = stats.deferred_admissions,
            elapsed = ?stats.duration,
            "query run finished"
        );
        ResultSet::new(outcomes, stats)
    }

    /// Plans and runs every query for `itinerary`.
    pub fn search<C>(&self, itinerary: &Itinerary, collaborator: &C) -> ResultSet<C::Row>
    where
        C: QueryCollaborator,
    {
        let tasks = QueryPlanner::new(itinerary).tasks();
        self.run(tasks, collaborator)
    }

    /// Parses raw itinerary arguments, then searches.
    ///
    /// Parse errors fail the whole call before any task is planned.
    pub fn search_args<R, S, C>(
        &self,
        parser: &ItineraryParser<R>,
        args: &[S],
        collaborator: &C,
    ) -> ExecutorResult<ResultSet<C::Row>>
    where
        R: LocationResolver,
        S: AsRef<str>,
        C: QueryCollaborator,
    {
        let itinerary = parser.parse(args)?;
        Ok(self.search(&itinerary, collaborator))
    }
}

impl fmt::Debug for ConcurrentExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentExecutor")
            .field("budget", &self.budget)
            .field("threads", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RunCounters {
    running: AtomicUsize,
    peak: AtomicUsize,
    deferred: AtomicUsize,
}

fn dispatch<C: QueryCollaborator>(
    collaborator: &C,
    mut task: QueryTask<C::Row>,
    counters: &RunCounters,
) -> TaskOutcome<C::Row> {
    let running = counters.running.fetch_add(1, Ordering::SeqCst) + 1;
    counters.peak.fetch_max(running, Ordering::SeqCst);
    debug!(task = %task.id(), legs = %task, "dispatching query");

    let result = panic::catch_unwind(AssertUnwindSafe(|| collaborator.execute(&mut task)));
    counters.running.fetch_sub(1, Ordering::SeqCst);

    match result {
        Ok(Ok(())) => {
            debug!(task = %task.id(), rows = task.rows().len(), "query completed");
            TaskOutcome::completed(task)
        }
        Ok(Err(error)) => {
            warn!(task = %task.id(), legs = %task, %error, "query failed");
            TaskOutcome::failed(task, error)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(task = %task.id(), legs = %task, %message, "query panicked");
            TaskOutcome::failed(task, QueryExecutionError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
