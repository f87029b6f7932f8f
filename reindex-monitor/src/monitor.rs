//! The job monitor and its poll task.
//!
//! State lives in a `tokio::sync::watch` channel so observers can render progress
//! while the poll task runs. At most one poll task exists per monitor and at most
//! one status request is outstanding at a time: the loop awaits each response
//! before sleeping again.
//!
//! The task stops on a terminal job status, on the first failed poll, when the
//! wall-clock ceiling elapses, or when its cancellation token fires (explicit
//! [`JobMonitor::cancel`] or drop of the monitor).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rag_gateway::QaBackend;
use rag_gateway::models::{JobInfo, ReindexRequest};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::errors::{MonitorError, Result};
use crate::state::{AbandonReason, MonitorPhase, MonitorState};

struct PollTask {
    cancel: CancellationToken,
    /// `None` while the start call is still in flight.
    handle: Option<JoinHandle<()>>,
}

/// Returns a claimed monitor to `Idle` unless the start went through.
///
/// Covers a failed start call and a `start` future dropped mid-flight.
struct StartGuard<'a> {
    state: &'a watch::Sender<MonitorState>,
    armed: bool,
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|s| {
            if s.phase != MonitorPhase::Starting {
                return false;
            }
            s.phase = MonitorPhase::Idle;
            true
        });
    }
}

/// Observes one reindex job at a time.
pub struct JobMonitor {
    backend: Arc<dyn QaBackend>,
    policy: PollPolicy,
    state: watch::Sender<MonitorState>,
    task: Mutex<Option<PollTask>>,
}

impl std::fmt::Debug for JobMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobMonitor")
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl JobMonitor {
    pub fn new(backend: Arc<dyn QaBackend>, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(MonitorState::default());
        Self {
            backend,
            policy,
            state,
            task: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Starts a reindex job and begins polling it.
    ///
    /// Returns the provisional snapshot (`running`, started now).
    ///
    /// # Errors
    /// - [`MonitorError::AlreadyRunning`] if a job is starting or being polled.
    /// - [`MonitorError::Start`] if the start call fails; the monitor returns to `Idle`.
    /// - [`MonitorError::Cancelled`] if [`cancel`](Self::cancel) ran before the backend
    ///   answered; the monitor returns to `Idle`.
    ///
    /// Dropping the returned future before it completes also returns the monitor to
    /// `Idle`. Must be called within a Tokio runtime.
    pub async fn start(&self, req: ReindexRequest) -> Result<JobInfo> {
        let cancel = self.claim()?;
        let mut guard = StartGuard {
            state: &self.state,
            armed: true,
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = self.backend.reindex_start(req) => Some(r),
        };
        let resp = match outcome {
            Some(Ok(resp)) => resp,
            Some(Err(e)) => {
                warn!(error = %e, "reindex start failed");
                return Err(MonitorError::Start(e));
            }
            None => {
                info!("reindex start cancelled");
                return Err(MonitorError::Cancelled);
            }
        };
        guard.armed = false;

        let job = JobInfo::provisional(resp.job_id, Utc::now());
        let mut slot = self.lock_task();
        if cancel.is_cancelled() {
            info!(job_id = %job.job_id, "reindex accepted after cancellation, not polling");
            self.state.send_modify(|s| {
                s.phase = MonitorPhase::Abandoned(AbandonReason::Cancelled);
                s.job = Some(job.clone());
            });
            return Ok(job);
        }

        info!(job_id = %job.job_id, message = %resp.message, "reindex started, polling");
        self.state.send_modify(|s| {
            s.phase = MonitorPhase::Polling;
            s.job = Some(job.clone());
        });
        let deadline = Instant::now() + self.policy.ceiling;
        let handle = tokio::spawn(poll_loop(
            self.backend.clone(),
            self.policy,
            deadline,
            self.state.clone(),
            cancel.clone(),
        ));
        *slot = Some(PollTask {
            cancel,
            handle: Some(handle),
        });
        Ok(job)
    }

    /// Moves to `Starting` and registers the token of the new job.
    ///
    /// Runs under the task lock so [`cancel`](Self::cancel) either sees the claim or
    /// happens entirely before it.
    fn claim(&self) -> Result<CancellationToken> {
        let mut slot = self.lock_task();
        let claimed = self.state.send_if_modified(|s| {
            if s.phase.is_active() {
                return false;
            }
            *s = MonitorState {
                phase: MonitorPhase::Starting,
                job: None,
                polls: 0,
            };
            true
        });
        if !claimed {
            return Err(MonitorError::AlreadyRunning);
        }
        // A previous task, if any, has already settled.
        if let Some(old) = slot.take() {
            old.cancel.cancel();
        }
        let cancel = CancellationToken::new();
        *slot = Some(PollTask {
            cancel: cancel.clone(),
            handle: None,
        });
        Ok(cancel)
    }

    /// Waits until the current job settles and returns the final state.
    ///
    /// Returns immediately when nothing was started.
    pub async fn settled(&self) -> MonitorState {
        let mut rx = self.subscribe();
        let done = rx
            .wait_for(|s| s.phase.is_settled() || s.phase == MonitorPhase::Idle)
            .await
            .map(|s| s.clone());
        done.unwrap_or_else(|_| self.snapshot())
    }

    /// Stops observing and waits until neither a start nor a poll is in flight.
    ///
    /// A job still being polled ends `Abandoned(Cancelled)`; a start still waiting
    /// for the backend ends `Idle`; settled phases are kept.
    pub async fn cancel(&self) {
        let task = self.lock_task().take();
        if let Some(task) = task {
            task.cancel.cancel();
            if let Some(handle) = task.handle {
                if let Err(e) = handle.await {
                    warn!(error = %e, "poll task ended abnormally");
                }
            }
        }
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|s| !s.phase.is_active()).await;
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for JobMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.lock_task().take() {
            task.cancel.cancel();
        }
    }
}

async fn poll_loop(
    backend: Arc<dyn QaBackend>,
    policy: PollPolicy,
    deadline: Instant,
    state: watch::Sender<MonitorState>,
    cancel: CancellationToken,
) {
    loop {
        let wake = (Instant::now() + policy.interval).min(deadline);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return abandon(&state, AbandonReason::Cancelled),
            _ = sleep_until(wake) => {}
        }
        if Instant::now() >= deadline {
            return abandon(&state, AbandonReason::Deadline);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return abandon(&state, AbandonReason::Cancelled),
            _ = sleep_until(deadline) => return abandon(&state, AbandonReason::Deadline),
            r = backend.reindex_status() => r,
        };

        match outcome {
            Ok(resp) => {
                let mut settled = false;
                state.send_modify(|s| {
                    s.polls += 1;
                    let Some(job) = resp.job else {
                        return;
                    };
                    debug!(job_id = %job.job_id, status = ?job.status, poll = s.polls, "job snapshot");
                    if let Some(phase) = MonitorPhase::for_terminal(job.status) {
                        info!(job_id = %job.job_id, phase = phase.label(), "reindex finished");
                        s.phase = phase;
                        settled = true;
                    }
                    s.job = Some(job);
                });
                if settled {
                    return;
                }
            }
            Err(e) => {
                return abandon(
                    &state,
                    AbandonReason::Transport {
                        message: e.to_string(),
                    },
                );
            }
        }
    }
}

fn abandon(state: &watch::Sender<MonitorState>, reason: AbandonReason) {
    state.send_if_modified(|s| {
        if s.phase != MonitorPhase::Polling {
            return false;
        }
        warn!(?reason, polls = s.polls, "job polling abandoned");
        s.phase = MonitorPhase::Abandoned(reason);
        true
    });
}
