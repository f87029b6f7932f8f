use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rag_gateway::error_handler::Result;
use rag_gateway::models::{
    FeedbackRequest, FeedbackResponse, HealthResponse, JobInfo, JobResult, JobStatus,
    QueryRequest, QueryResponse, ReindexRequest, ReindexResponse, ReindexStatusResponse,
    StatusSnapshot,
};
use rag_gateway::{GatewayError, QaBackend};
use reindex_monitor::{AbandonReason, JobMonitor, MonitorError, MonitorPhase, PollPolicy};
use tokio::time::Instant;

/// Answers reindex calls from a script; other operations are unused here.
#[derive(Default)]
struct ScriptedBackend {
    fail_start: bool,
    polls: Mutex<VecDeque<Result<ReindexStatusResponse>>>,
    /// Returned once the script is exhausted.
    fallback: Option<JobInfo>,
    latency: Duration,
    start_latency: Duration,
    starts: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    fn with_polls(polls: Vec<Result<ReindexStatusResponse>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl QaBackend for ScriptedBackend {
    async fn query(&self, _req: &QueryRequest) -> Result<QueryResponse> {
        unimplemented!()
    }

    async fn feedback(&self, _req: &FeedbackRequest) -> Result<FeedbackResponse> {
        unimplemented!()
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        unimplemented!()
    }

    async fn reindex_start(&self, _req: ReindexRequest) -> Result<ReindexResponse> {
        let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.start_latency.is_zero() {
            tokio::time::sleep(self.start_latency).await;
        }
        if self.fail_start {
            return Err(unreachable_err());
        }
        Ok(ReindexResponse {
            job_id: format!("job-{n}"),
            message: "started".into(),
        })
    }

    async fn reindex_status(&self) -> Result<ReindexStatusResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.polls.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(ReindexStatusResponse {
                job: self.fallback.clone(),
            })
        })
    }

    async fn health(&self) -> Result<HealthResponse> {
        unimplemented!()
    }
}

fn unreachable_err() -> GatewayError {
    GatewayError::NetworkUnreachable {
        target_url: "http://127.0.0.1:8080/api/reindex".into(),
        reason: "connection refused".into(),
    }
}

fn job(id: &str, status: JobStatus) -> JobInfo {
    let mut job = JobInfo::provisional(id, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    job.status = status;
    if status.is_terminal() {
        job.ended_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 1, 0).unwrap());
        job.result = Some(JobResult {
            total_chunks: 10,
            successful_chunks: 10,
            ..JobResult::default()
        });
    }
    job
}

fn snapshot(job: JobInfo) -> Result<ReindexStatusResponse> {
    Ok(ReindexStatusResponse { job: Some(job) })
}

fn monitor(backend: Arc<ScriptedBackend>) -> JobMonitor {
    JobMonitor::new(backend, PollPolicy::default())
}

#[tokio::test(start_paused = true)]
async fn three_running_polls_then_completed() {
    let mut backend = ScriptedBackend::with_polls(vec![
        snapshot(job("job-1", JobStatus::Running)),
        snapshot(job("job-1", JobStatus::Running)),
        snapshot(job("job-1", JobStatus::Running)),
        snapshot(job("job-1", JobStatus::Completed)),
    ]);
    backend.latency = Duration::from_millis(700);
    let backend = Arc::new(backend);
    let monitor = monitor(backend.clone());

    let provisional = monitor.start(ReindexRequest::default()).await.unwrap();
    assert_eq!(provisional.job_id, "job-1");
    assert_eq!(provisional.status, JobStatus::Running);
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Polling);

    let done = monitor.settled().await;
    assert_eq!(done.phase, MonitorPhase::Completed);
    assert_eq!(done.polls, 4);
    let retained = done.job.unwrap();
    assert_eq!(retained.status, JobStatus::Completed);
    assert!(retained.result.is_some());

    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);

    // Stopped: no further polls.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn first_poll_waits_one_interval() {
    let backend = Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        ..ScriptedBackend::default()
    });
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_999)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    monitor.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn missing_job_in_response_keeps_polling() {
    let backend = Arc::new(ScriptedBackend::with_polls(vec![
        Ok(ReindexStatusResponse { job: None }),
        Ok(ReindexStatusResponse { job: None }),
        snapshot(job("job-1", JobStatus::Failed)),
    ]));
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();

    let done = monitor.settled().await;
    assert_eq!(done.phase, MonitorPhase::Failed);
    assert_eq!(done.polls, 3);
    assert_eq!(done.job.unwrap().status, JobStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn ceiling_abandons_and_stops_requests() {
    let backend = Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        ..ScriptedBackend::default()
    });
    let monitor = monitor(backend.clone());

    let began = Instant::now();
    monitor.start(ReindexRequest::default()).await.unwrap();
    let done = monitor.settled().await;

    assert_eq!(done.phase, MonitorPhase::Abandoned(AbandonReason::Deadline));
    assert!(began.elapsed() <= Duration::from_millis(300_000));
    assert_eq!(done.job.unwrap().status, JobStatus::Running);

    let calls = backend.calls.load(Ordering::SeqCst);
    assert_eq!(calls, 149);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_abandons_with_last_snapshot() {
    let running = job("job-1", JobStatus::Running);
    let backend = Arc::new(ScriptedBackend::with_polls(vec![
        snapshot(running.clone()),
        Err(unreachable_err()),
        snapshot(job("job-1", JobStatus::Completed)),
    ]));
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();

    let done = monitor.settled().await;
    assert!(matches!(
        done.phase,
        MonitorPhase::Abandoned(AbandonReason::Transport { .. })
    ));
    assert_eq!(done.job, Some(running));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_start_stays_idle() {
    let backend = Arc::new(ScriptedBackend {
        fail_start: true,
        ..ScriptedBackend::default()
    });
    let monitor = monitor(backend.clone());

    let err = monitor.start(ReindexRequest::default()).await.unwrap_err();
    assert!(matches!(err, MonitorError::Start(ref e) if e.is_unreachable()));

    let state = monitor.snapshot();
    assert_eq!(state.phase, MonitorPhase::Idle);
    assert!(state.job.is_none());
    assert_eq!(backend.starts.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_while_polling_is_rejected() {
    let backend = Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        ..ScriptedBackend::default()
    });
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();

    let err = monitor.start(ReindexRequest::default()).await.unwrap_err();
    assert!(matches!(err, MonitorError::AlreadyRunning));
    assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Polling);

    monitor.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn restart_after_terminal_discards_previous_snapshot() {
    let backend = Arc::new(ScriptedBackend::with_polls(vec![snapshot(job(
        "job-1",
        JobStatus::Completed,
    ))]));
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();
    assert_eq!(monitor.settled().await.phase, MonitorPhase::Completed);

    let second = monitor.start(ReindexRequest::default()).await.unwrap();
    assert_eq!(second.job_id, "job-2");
    let state = monitor.snapshot();
    assert_eq!(state.phase, MonitorPhase::Polling);
    assert_eq!(state.polls, 0);
    assert_eq!(state.job.unwrap().job_id, "job-2");

    monitor.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_the_poll_task() {
    let backend = Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        ..ScriptedBackend::default()
    });
    let monitor = monitor(backend.clone());
    monitor.start(ReindexRequest::default()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(4_500)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

    monitor.cancel().await;
    assert_eq!(
        monitor.snapshot().phase,
        MonitorPhase::Abandoned(AbandonReason::Cancelled)
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_monitor_stops_polling() {
    let backend = Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        ..ScriptedBackend::default()
    });
    {
        let monitor = monitor(backend.clone());
        monitor.start(ReindexRequest::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
    }
    let calls = backend.calls.load(Ordering::SeqCst);
    assert_eq!(calls, 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test(start_paused = true)]
async fn settled_returns_immediately_when_idle() {
    let monitor = monitor(Arc::new(ScriptedBackend::default()));
    assert_eq!(monitor.settled().await.phase, MonitorPhase::Idle);
}

fn slow_start_backend() -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend {
        fallback: Some(job("job-1", JobStatus::Running)),
        start_latency: Duration::from_secs(5),
        ..ScriptedBackend::default()
    })
}

#[tokio::test(start_paused = true)]
async fn cancel_while_starting_never_polls() {
    let backend = slow_start_backend();
    let monitor = Arc::new(monitor(backend.clone()));

    let starter = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.start(ReindexRequest::default()).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Starting);

    monitor.cancel().await;
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Idle);

    let err = starter.await.unwrap().unwrap_err();
    assert!(matches!(err, MonitorError::Cancelled));

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn dropped_start_returns_to_idle() {
    let backend = slow_start_backend();
    let monitor = monitor(backend.clone());

    let timed_out = tokio::time::timeout(
        Duration::from_secs(1),
        monitor.start(ReindexRequest::default()),
    )
    .await;
    assert!(timed_out.is_err());
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Idle);

    let settled = tokio::time::timeout(Duration::from_secs(1), monitor.settled()).await;
    assert_eq!(settled.unwrap().phase, MonitorPhase::Idle);

    let second = monitor.start(ReindexRequest::default()).await.unwrap();
    assert_eq!(second.job_id, "job-2");
    assert_eq!(monitor.snapshot().phase, MonitorPhase::Polling);

    monitor.cancel().await;
    assert_eq!(
        monitor.snapshot().phase,
        MonitorPhase::Abandoned(AbandonReason::Cancelled)
    );
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}
