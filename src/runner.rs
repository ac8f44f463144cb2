//! Batch execution of conversion jobs.
//!
//! The controller itself is single threaded: it launches one child process
//! per capture file, at most one batch's worth at a time, and joins the whole
//! batch before starting the next one.

use crate::archiver::ArchiverCommand;
use crate::config::BatchConfig;
use crate::report::{JobOutcome, RunReport};
use chrono::Utc;
use std::path::PathBuf;
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Split the capture list into consecutive chunks of at most `batch_size`
/// files. Chunk order follows the input order.
pub fn partition(files: &[PathBuf], batch_size: usize) -> Vec<Vec<PathBuf>> {
    files.chunks(batch_size).map(|c| c.to_vec()).collect()
}

enum Launched {
    Running {
        file: PathBuf,
        child: Child,
        started: Instant,
    },
    Done(JobOutcome),
}

/// Runs conversion jobs in sequential batches of bounded size.
pub struct BatchRunner {
    archiver: ArchiverCommand,
    batch_size: usize,
    stagger: Duration,
    timeout: Option<Duration>,
    stop_signal: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(archiver: ArchiverCommand, batch: &BatchConfig) -> Self {
        Self {
            archiver,
            batch_size: batch.size,
            stagger: Duration::from_secs(batch.launch_stagger_secs),
            timeout: batch.job_timeout_secs.map(Duration::from_secs),
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the stop signal for external control.
    ///
    /// Raising it skips the remaining launches and kills in-flight jobs;
    /// both are recorded as cancelled in the report.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    fn stopped(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }

    /// Convert every file, one child process per file.
    pub fn run(&self, files: Vec<PathBuf>) -> RunReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        let batches = partition(&files, self.batch_size);
        let total_batches = batches.len();
        let mut outcomes = Vec::with_capacity(files.len());

        for (index, batch) in batches.into_iter().enumerate() {
            if self.stopped() {
                warn!("Stop requested, cancelling {} remaining files", batch.len());
                outcomes.extend(batch.into_iter().map(JobOutcome::cancelled));
                continue;
            }

            info!(
                "Starting batch {}/{} ({} files)",
                index + 1,
                total_batches,
                batch.len()
            );
            outcomes.extend(self.run_batch(batch));
        }

        RunReport::new(started_at, clock.elapsed(), outcomes)
    }

    /// Launch every job in the batch with the configured stagger, then wait
    /// for all of them in launch order.
    fn run_batch(&self, batch: Vec<PathBuf>) -> Vec<JobOutcome> {
        let mut jobs = Vec::with_capacity(batch.len());
        let last = batch.len().saturating_sub(1);

        for (i, file) in batch.into_iter().enumerate() {
            if self.stopped() {
                jobs.push(Launched::Done(JobOutcome::cancelled(file)));
                continue;
            }

            match self.archiver.build(&file).spawn() {
                Ok(child) => {
                    debug!("Launched {} for {:?}", self.archiver.command, file);
                    jobs.push(Launched::Running {
                        file,
                        child,
                        started: Instant::now(),
                    });
                }
                Err(err) => {
                    warn!("Failed to launch archiver for {:?}: {}", file, err);
                    jobs.push(Launched::Done(JobOutcome::launch_failed(file, &err)));
                }
            }

            if i < last {
                std::thread::sleep(self.stagger);
            }
        }

        jobs.into_iter()
            .map(|job| match job {
                Launched::Done(outcome) => outcome,
                Launched::Running {
                    file,
                    child,
                    started,
                } => self.join(file, child, started),
            })
            .collect()
    }

    /// Wait for one child, enforcing the per-job timeout and the stop signal.
    fn join(&self, file: PathBuf, mut child: Child, started: Instant) -> JobOutcome {
        let deadline = self.timeout.map(|t| started + t);

        loop {
            if self.stopped() {
                warn!("Stop requested, killing job for {:?}", file);
                let _ = child.kill();
                let _ = child.wait();
                return JobOutcome::cancelled(file);
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        info!("Conversion completed: {:?}", file);
                    } else {
                        warn!("Conversion failed for {:?}: {}", file, status);
                    }
                    return JobOutcome::exited(file, status);
                }
                Ok(None) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        warn!("Job for {:?} exceeded timeout, killing it", file);
                        let _ = child.kill();
                        let _ = child.wait();
                        return JobOutcome::timed_out(file);
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    warn!("Failed to poll job for {:?}: {}", file, err);
                    return JobOutcome::launch_failed(file, &err);
                }
            }
        }
    }
}
