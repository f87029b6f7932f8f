use std::sync::Arc;

use anyhow::{Context, bail};
use history_store::HistoryStore;
use history_store::config::history_dir_from_env;
use history_store::storage::file::FileStorage;
use qa_session::{AdminSession, AssumeYes, Confirm, FeedbackOutcome, QuerySession, SessionError};
use rag_gateway::ApiClient;
use rag_gateway::config::default_config::config_from_env;
use rag_gateway::models::FeedbackRating;
use reindex_monitor::PollPolicy;
use tracing::{debug, warn};

use crate::prompt::StdinConfirm;
use crate::render;

/// Everything a command needs, built once from the environment.
pub struct App {
    backend: Arc<ApiClient>,
    history: Arc<HistoryStore>,
    policy: PollPolicy,
}

impl App {
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = config_from_env().context("invalid gateway configuration")?;
        let policy = PollPolicy::from_env().context("invalid poll configuration")?;
        let dir = history_dir_from_env();
        debug!(base = %cfg.effective_base(), history = %dir.display(), "configured");

        Ok(Self {
            backend: Arc::new(ApiClient::new(cfg)?),
            history: Arc::new(HistoryStore::open(Arc::new(FileStorage::new(dir)))),
            policy,
        })
    }

    fn query_session(&self) -> QuerySession {
        QuerySession::new(self.backend.clone(), self.history.clone())
    }

    fn admin_session(&self) -> AdminSession {
        let endpoint = self.backend.config().url("/health");
        AdminSession::new(self.backend.clone(), self.policy, endpoint)
    }
}

pub async fn ask(
    app: &App,
    question: &str,
    top_k: Option<u32>,
    rate: Option<FeedbackRating>,
    comment: Option<String>,
) -> anyhow::Result<()> {
    let mut session = app.query_session();
    match session.ask(question, top_k).await {
        Ok(exchange) => render::exchange(exchange),
        Err(e) => {
            render::failure(&e);
            bail!("query failed");
        }
    }
    if let Some(err) = app.history.last_persist_error() {
        render::note(&format!("answer not saved to history: {err}"));
    }

    let Some(rating) = rate else {
        return Ok(());
    };
    match session.submit_feedback(rating, comment).await? {
        FeedbackOutcome::Recorded { id } => render::note(&format!("feedback recorded ({id})")),
        FeedbackOutcome::Declined { id } => {
            render::note(&format!("feedback not accepted by backend ({id})"))
        }
        FeedbackOutcome::Failed(e) => render::note(&format!("feedback failed: {e}")),
    }
    Ok(())
}

pub fn history_list(app: &App) -> anyhow::Result<()> {
    render::history_list(&app.history.list());
    Ok(())
}

pub fn history_show(app: &App, id: &str) -> anyhow::Result<()> {
    match app.history.get(id) {
        Some(item) => {
            render::history_item(&item);
            Ok(())
        }
        None => bail!("no history item with id {id}"),
    }
}

pub fn history_remove(app: &App, id: &str) -> anyhow::Result<()> {
    if app.history.remove(id) {
        render::note(&format!("removed {id}"));
    } else {
        render::note(&format!("{id} not found, nothing removed"));
    }
    Ok(())
}

pub fn history_clear(app: &App, yes: bool) -> anyhow::Result<()> {
    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };
    match app.query_session().clear_history(confirm) {
        Ok(()) => render::note("history cleared"),
        Err(SessionError::NotConfirmed) => render::note("cancelled"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn status(app: &App) -> anyhow::Result<()> {
    let admin = app.admin_session();
    let snapshot = admin.refresh_status().await?;
    render::status(&snapshot);
    Ok(())
}

pub async fn health(app: &App) -> anyhow::Result<()> {
    let report = app.admin_session().probe().await;
    render::health(&report);
    if !report.ok {
        bail!("backend unhealthy");
    }
    Ok(())
}

pub async fn job(app: &App) -> anyhow::Result<()> {
    match app.admin_session().load_current_job().await {
        Some(job) => render::job(&job),
        None => render::note("no reindex job known to the backend"),
    }
    Ok(())
}

pub async fn reindex(app: &App, incremental: bool, yes: bool, watch: bool) -> anyhow::Result<()> {
    let admin = app.admin_session();
    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };

    let job = match admin.trigger_reindex(confirm, incremental).await {
        Ok(job) => job,
        Err(SessionError::NotConfirmed) => {
            render::note("cancelled");
            return Ok(());
        }
        Err(e) => {
            if let SessionError::Monitor(m) = &e {
                if m.is_backend_conflict() {
                    render::note("a reindex job is already running on the backend; see `ragc job`");
                }
            }
            render::failure(&e);
            bail!("reindex not started");
        }
    };
    render::note(&format!("reindex job started: {}", job.job_id));
    if !watch {
        admin.teardown().await;
        return Ok(());
    }

    let mut rx = admin.monitor().subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        let state = rx.borrow_and_update().clone();
        render::progress(&state);
        if state.phase.is_settled() {
            break;
        }
        tokio::select! {
            _ = &mut ctrl_c => {
                warn!("interrupted, no longer watching the job");
                admin.teardown().await;
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    let settlement = admin.settle().await;
    render::settlement(&settlement);
    Ok(())
}
