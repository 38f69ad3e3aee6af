/*!
 * Bounded-concurrency job coordinator.
 *
 * Every descriptor of a batch becomes one tokio task gated by a semaphore
 * with one permit per worker. Results are funnelled through a channel to a
 * single collector task that keeps the completion counter and the output
 * path list, informs the observer after each job and signals the end of the
 * batch exactly once, after the last result.
 */

use log::{error, info};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, mpsc, oneshot};

use crate::errors::JobError;
use crate::job::{JobDescriptor, JobResult, run_job};
use crate::variant::TieredConverter;

/// Receives progress of a running batch
///
/// Both callbacks run on the collector task, one at a time.
pub trait BatchObserver: Send + Sync {
    /// Called once per job, with the number of jobs finished so far
    fn on_job_finished(&self, _result: &JobResult, _completed: usize, _total: usize) {}

    /// Called once, after the last job of the batch
    fn on_batch_complete(&self, _summary: &BatchSummary) {}
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Aggregated outcome of a finished batch
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Successful jobs whose variant conversion kept some original text
    pub degraded: usize,
    /// Written files, in completion order
    pub output_paths: Vec<PathBuf>,
    /// Every job's result, in completion order
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failures == 0
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Handle to a submitted batch
#[derive(Debug)]
pub struct Batch {
    total: usize,
    completed: Arc<AtomicUsize>,
    output_paths: Arc<Mutex<Vec<PathBuf>>>,
    summary_rx: oneshot::Receiver<BatchSummary>,
}

impl Batch {
    pub fn total_submitted(&self) -> usize {
        self.total
    }

    /// Jobs that have reported so far
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Output paths recorded so far
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.output_paths.lock().clone()
    }

    /// Wait for the last job and return the batch summary
    pub async fn wait(self) -> BatchSummary {
        match self.summary_rx.await {
            Ok(summary) => summary,
            Err(_) => {
                // Collector gone without a summary; rebuild what is known
                error!("Batch collector stopped before completion");
                let output_paths = self.output_paths.lock().clone();
                BatchSummary {
                    total: self.total,
                    successes: output_paths.len(),
                    failures: self.total.saturating_sub(output_paths.len()),
                    output_paths,
                    ..BatchSummary::default()
                }
            }
        }
    }
}

/// Runs batches of conversion jobs on a bounded worker pool
#[derive(Debug, Clone)]
pub struct JobCoordinator {
    converter: Arc<TieredConverter>,
    max_workers: usize,
}

impl JobCoordinator {
    /// Create a coordinator sized to the host's parallelism
    pub fn new(converter: Arc<TieredConverter>) -> Self {
        Self::with_pool_size(converter, None)
    }

    /// Create a coordinator with an explicit pool size; `None` uses the host's parallelism
    pub fn with_pool_size(converter: Arc<TieredConverter>, max_workers: Option<usize>) -> Self {
        let max_workers = max_workers
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);
        Self { converter, max_workers }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Schedule one job per descriptor and return the batch handle
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&self, descriptors: Vec<JobDescriptor>, observer: Arc<dyn BatchObserver>) -> Batch {
        let total = descriptors.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let output_paths = Arc::new(Mutex::new(Vec::new()));
        let (summary_tx, summary_rx) = oneshot::channel();

        info!("Submitting {} jobs to a pool of {} workers", total, self.max_workers);

        let batch = Batch {
            total,
            completed: completed.clone(),
            output_paths: output_paths.clone(),
            summary_rx,
        };

        if total == 0 {
            let summary = BatchSummary::default();
            observer.on_batch_complete(&summary);
            let _ = summary_tx.send(summary);
            return batch;
        }

        let (result_tx, result_rx) = mpsc::channel::<JobResult>(total);
        let semaphore = Arc::new(Semaphore::new(self.max_workers));

        for descriptor in descriptors {
            let converter = self.converter.clone();
            let semaphore = semaphore.clone();
            let result_tx = result_tx.clone();

            tokio::spawn(async move {
                let source = descriptor.source_path.clone();
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        // A panicking job must still report
                        match tokio::spawn(run_job(descriptor, converter)).await {
                            Ok(result) => result,
                            Err(e) => JobResult::error(source, &JobError::Aborted(e.to_string())),
                        }
                    }
                    Err(e) => JobResult::error(source, &JobError::Aborted(e.to_string())),
                };
                let _ = result_tx.send(result).await;
            });
        }
        drop(result_tx);

        tokio::spawn(collect_results(
            result_rx,
            total,
            completed,
            output_paths,
            observer,
            summary_tx,
        ));

        batch
    }
}

async fn collect_results(
    mut result_rx: mpsc::Receiver<JobResult>,
    total: usize,
    completed: Arc<AtomicUsize>,
    output_paths: Arc<Mutex<Vec<PathBuf>>>,
    observer: Arc<dyn BatchObserver>,
    summary_tx: oneshot::Sender<BatchSummary>,
) {
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };

    while let Some(result) = result_rx.recv().await {
        if let Some(path) = &result.output_path {
            output_paths.lock().push(path.clone());
        }
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

        if result.is_success() {
            summary.successes += 1;
            if result.degraded {
                summary.degraded += 1;
            }
        } else {
            summary.failures += 1;
        }

        observer.on_job_finished(&result, done, total);
        summary.results.push(result);

        if done == total {
            break;
        }
    }

    summary.output_paths = output_paths.lock().clone();
    info!(
        "Batch complete: {} succeeded, {} failed ({} degraded)",
        summary.successes, summary.failures, summary.degraded
    );
    observer.on_batch_complete(&summary);
    let _ = summary_tx.send(summary);
}
