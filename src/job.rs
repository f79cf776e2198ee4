//! Background simulation jobs.
//!
//! A job owns its strategy and a handle to the price provider, runs the
//! simulation on its own thread and exposes a pollable status. Jobs share no
//! mutable state with each other. A cancel request is honoured between the
//! fetch stage and the day loop, never inside it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::domain::error::SimError;
use crate::domain::metrics::SimulationResults;
use crate::domain::simulation;
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted but not yet picked up by the worker thread.
    Saved,
    InProgress,
    Completed,
    /// The run failed; the strategy itself is untouched.
    Failed { reason: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed { .. } | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Saved => f.write_str("saved"),
            JobStatus::InProgress => f.write_str("in_progress"),
            JobStatus::Completed => f.write_str("completed"),
            JobStatus::Failed { reason } => write!(f, "failed: {}", reason),
            JobStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

type JobOutcome = Result<SimulationResults, SimError>;

pub struct SimulationJob {
    name: String,
    status: Arc<Mutex<JobStatus>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<JobOutcome>>,
}

impl SimulationJob {
    pub fn spawn(strategy: StrategyConfig, provider: Arc<dyn DataPort>) -> Self {
        let name = strategy.name.clone();
        let status = Arc::new(Mutex::new(JobStatus::Saved));
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_status = Arc::clone(&status);
        let worker_cancel = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            set_status(&worker_status, JobStatus::InProgress);
            tracing::info!(strategy = %strategy.name, "simulation job started");

            let should_cancel = || worker_cancel.load(Ordering::Relaxed);
            let outcome = simulation::run_cancellable(&strategy, provider.as_ref(), &should_cancel);
            match &outcome {
                Ok(results) => {
                    tracing::info!(
                        strategy = %strategy.name,
                        trades = results.metrics.total_trades,
                        "simulation job completed"
                    );
                    set_status(&worker_status, JobStatus::Completed);
                }
                Err(SimError::Cancelled) => {
                    tracing::info!(strategy = %strategy.name, "simulation job cancelled");
                    set_status(&worker_status, JobStatus::Cancelled);
                }
                Err(e) => {
                    tracing::warn!(strategy = %strategy.name, error = %e, "simulation job failed");
                    set_status(
                        &worker_status,
                        JobStatus::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
            outcome
        });

        SimulationJob {
            name,
            status,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> JobStatus {
        self.status.lock().clone()
    }

    /// Ask the job to stop. A run already inside the day loop finishes
    /// normally; otherwise it ends with [`JobStatus::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Block until the run finishes and take its outcome. The outcome can be
    /// taken once; later calls return [`SimError::Aborted`].
    pub fn wait(&mut self) -> JobOutcome {
        let Some(handle) = self.handle.take() else {
            return Err(SimError::Aborted {
                reason: format!("result of job '{}' was already collected", self.name),
            });
        };

        match handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                let reason = "simulation thread panicked".to_string();
                set_status(
                    &self.status,
                    JobStatus::Failed {
                        reason: reason.clone(),
                    },
                );
                Err(SimError::Aborted { reason })
            }
        }
    }
}

fn set_status(slot: &Mutex<JobStatus>, status: JobStatus) {
    *slot.lock() = status;
}
