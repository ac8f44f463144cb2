//! Run reporting.
//!
//! Every conversion job produces a [`JobOutcome`]; a run collects them into a
//! [`RunReport`] so failures are visible in the summary instead of vanishing
//! with the child process.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Terminal state of a single conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// The archiver exited on its own.
    Exited { code: Option<i32>, success: bool },
    /// The child process could not be started or waited on.
    LaunchFailed { message: String },
    /// The job ran past the configured timeout and was killed.
    TimedOut,
    /// The job was cancelled before or while running.
    Cancelled,
}

/// Result of one conversion job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub file: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn exited(file: PathBuf, status: ExitStatus) -> Self {
        Self {
            file,
            status: JobStatus::Exited {
                code: status.code(),
                success: status.success(),
            },
        }
    }

    pub fn launch_failed(file: PathBuf, err: &std::io::Error) -> Self {
        Self {
            file,
            status: JobStatus::LaunchFailed {
                message: err.to_string(),
            },
        }
    }

    pub fn timed_out(file: PathBuf) -> Self {
        Self {
            file,
            status: JobStatus::TimedOut,
        }
    }

    pub fn cancelled(file: PathBuf) -> Self {
        Self {
            file,
            status: JobStatus::Cancelled,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Exited { success: true, .. })
    }
}

/// Summary of one conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub jobs: Vec<JobOutcome>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, elapsed: Duration, jobs: Vec<JobOutcome>) -> Self {
        Self {
            started_at,
            elapsed_secs: elapsed.as_secs_f64(),
            jobs,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| {
                matches!(
                    j.status,
                    JobStatus::Exited { success: false, .. } | JobStatus::LaunchFailed { .. }
                )
            })
            .count()
    }

    pub fn timed_out(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::TimedOut)
            .count()
    }

    pub fn cancelled(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Cancelled)
            .count()
    }

    /// True when every job exited cleanly (vacuously true for a no-op run).
    pub fn all_succeeded(&self) -> bool {
        self.jobs.iter().all(|j| j.is_success())
    }

    /// Print the human-readable end-of-run summary.
    pub fn print_summary(&self) {
        println!();
        println!("=================================");
        if self.jobs.is_empty() {
            println!("No capture files found, nothing converted");
        } else {
            println!(
                "Converted {} of {} files ({} failed, {} timed out, {} cancelled)",
                self.succeeded(),
                self.jobs.len(),
                self.failed(),
                self.timed_out(),
                self.cancelled()
            );
        }
        println!("Total time to convert all files: {:.1}s", self.elapsed_secs);
    }
}
