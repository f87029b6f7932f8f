use rag_gateway::models::{JobInfo, JobStatus};

/// Why polling stopped before the job reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    /// A status poll failed; the snapshot is stale from here on.
    Transport { message: String },
    /// The wall-clock ceiling elapsed.
    Deadline,
    /// The observer was torn down.
    Cancelled,
}

/// Lifecycle of the observed job.
///
/// `Idle → Starting → Polling → {Completed, Failed, Abandoned}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonitorPhase {
    #[default]
    Idle,
    Starting,
    Polling,
    Completed,
    Failed,
    Abandoned(AbandonReason),
}

impl MonitorPhase {
    /// `Starting` or `Polling`: a new start must be rejected.
    pub fn is_active(&self) -> bool {
        matches!(self, MonitorPhase::Starting | MonitorPhase::Polling)
    }

    /// Terminal for the current job instance.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            MonitorPhase::Completed | MonitorPhase::Failed | MonitorPhase::Abandoned(_)
        )
    }

    pub(crate) fn for_terminal(status: JobStatus) -> Option<Self> {
        match status {
            JobStatus::Running => None,
            JobStatus::Completed => Some(MonitorPhase::Completed),
            JobStatus::Failed => Some(MonitorPhase::Failed),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MonitorPhase::Idle => "idle",
            MonitorPhase::Starting => "starting",
            MonitorPhase::Polling => "polling",
            MonitorPhase::Completed => "completed",
            MonitorPhase::Failed => "failed",
            MonitorPhase::Abandoned(_) => "abandoned",
        }
    }
}

/// What the monitor currently knows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorState {
    pub phase: MonitorPhase,
    /// Latest observed snapshot; a cache of backend state, not the source of truth.
    pub job: Option<JobInfo>,
    /// Status polls answered for the current job.
    pub polls: u32,
}
