//! Terminal rendering. Results go to stdout, diagnostics to the tracing layer.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use history_store::HistoryItem;
use qa_session::{Exchange, HealthReport, SessionError, Settlement};
use rag_gateway::models::{JobInfo, JobStatus, StatusSnapshot, UpstreamHealth};
use reindex_monitor::{AbandonReason, MonitorPhase, MonitorState};

pub fn note(msg: &str) {
    println!("{} {msg}", "›".dimmed());
}

pub fn failure(err: &SessionError) {
    if err.is_unreachable() {
        eprintln!("{} {err}", "unreachable:".red().bold());
        eprintln!("  is the backend running? check RAG_API_BASE_URL / APP_PORT");
    } else {
        eprintln!("{} {err}", "error:".red().bold());
    }
}

pub fn exchange(ex: &Exchange) {
    let resp = &ex.response;
    if resp.degraded {
        let reason = resp
            .error_code_kind()
            .map(|c| format!("{c}: {}", c.description()))
            .unwrap_or_else(|| "fallback answer".to_string());
        println!("{} {reason}", "degraded".yellow().bold());
    }
    println!("{}\n", resp.answer);

    if !resp.sources.is_empty() {
        println!("{}", "Sources".bold());
        for (i, src) in resp.sources.iter().enumerate() {
            println!(
                "  [{}] {} {} {}",
                i + 1,
                src.title.bold(),
                src.path.dimmed(),
                format!("{}%", src.relevance_percent()).cyan()
            );
            if !src.snippet.is_empty() {
                println!("      {}", src.snippet.dimmed());
            }
        }
    }
    println!(
        "{}",
        format!("trace {} · saved as {}", resp.trace_id, ex.item.id).dimmed()
    );
}

fn local_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn local_time(t: &DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn one_line(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

pub fn history_list(items: &[HistoryItem]) {
    if items.is_empty() {
        note("no history yet");
        return;
    }
    for item in items {
        let flag = if item.degraded {
            "degraded".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {}  {} {}",
            item.id.dimmed(),
            local_millis(item.timestamp),
            one_line(&item.question, 60),
            flag
        );
    }
}

pub fn history_item(item: &HistoryItem) {
    println!("{} {}", "Q:".bold(), item.question);
    println!("{} {}", "A:".bold(), item.answer);
    let mut meta = format!("{} · {}", item.id, local_millis(item.timestamp));
    if item.degraded {
        meta.push_str(" · degraded");
    }
    println!("{}", meta.dimmed());
}

fn health_badge(h: UpstreamHealth) -> colored::ColoredString {
    match h {
        UpstreamHealth::Ok => "ok".green().bold(),
        UpstreamHealth::Degraded => "degraded".yellow().bold(),
        UpstreamHealth::Unavailable => "unavailable".red().bold(),
        UpstreamHealth::Unknown => "unknown".dimmed(),
    }
}

pub fn status(s: &StatusSnapshot) {
    println!("{:<16}{} / {}", "provider", s.provider, s.model);
    println!("{:<16}{}", "upstream", health_badge(s.upstream_health));
    println!(
        "{:<16}{}",
        "vector store",
        if s.qdrant_connected {
            "connected".green()
        } else {
            "disconnected".red()
        }
    );
    println!("{:<16}{} chunks", "index size", s.index_size);
    println!(
        "{:<16}{}",
        "last indexed",
        s.last_index_time
            .as_ref()
            .map(local_time)
            .unwrap_or_else(|| "never".to_string())
    );
    let rl = &s.rate_limit_state;
    let usage = rl
        .utilization()
        .map(|u| format!(" ({:.0}%)", u * 100.0))
        .unwrap_or_default();
    println!("{:<16}{}/{} rpm{usage}", "rate limit", rl.current_rpm, rl.rpm_limit);
}

pub fn health(r: &HealthReport) {
    let badge = if r.ok { "healthy".green().bold() } else { "unhealthy".red().bold() };
    println!("{badge} {} ({} ms)", r.endpoint, r.latency_ms);
    println!("  {}", r.message.dimmed());
}

fn status_badge(s: JobStatus) -> colored::ColoredString {
    match s {
        JobStatus::Running => "running".blue().bold(),
        JobStatus::Completed => "completed".green().bold(),
        JobStatus::Failed => "failed".red().bold(),
    }
}

pub fn job(job: &JobInfo) {
    println!("{:<12}{}", "job", job.job_id);
    println!("{:<12}{}", "status", status_badge(job.status));
    println!("{:<12}{}", "started", local_time(&job.started_at));
    if let Some(ended) = &job.ended_at {
        println!("{:<12}{}", "ended", local_time(ended));
    }
    if let Some(r) = &job.result {
        println!(
            "{:<12}{} indexed, {} skipped, {} failed of {} files",
            "files", r.indexed_files, r.skipped_files, r.failed_files, r.total_files
        );
        let ratio = r
            .chunk_success_ratio()
            .map(|x| format!(" ({:.1}%)", x * 100.0))
            .unwrap_or_default();
        println!(
            "{:<12}{}/{} embedded{ratio}, {} deleted",
            "chunks", r.successful_chunks, r.total_chunks, r.deleted_chunks
        );
        println!("{:<12}{:.1}s", "duration", r.duration_ms as f64 / 1000.0);
    }
    if let Some(err) = &job.error {
        println!("{:<12}{}", "error", err.red());
    }
}

pub fn progress(state: &MonitorState) {
    let Some(job) = &state.job else {
        return;
    };
    if state.phase == MonitorPhase::Polling {
        println!(
            "{} {} {}",
            "…".dimmed(),
            job.job_id,
            format!("{} (poll {})", job.status.as_str(), state.polls).dimmed()
        );
    }
}

pub fn settlement(s: &Settlement) {
    if let MonitorPhase::Abandoned(reason) = &s.state.phase {
        let why = match reason {
            AbandonReason::Transport { message } => format!("status unavailable: {message}"),
            AbandonReason::Deadline => "watch time limit reached".to_string(),
            AbandonReason::Cancelled => "stopped watching".to_string(),
        };
        println!("{} {why}", "abandoned".yellow().bold());
        note("the job may still be running; check with `ragc job`");
    }
    if let Some(job) = &s.state.job {
        job_view(job, &s.state.phase);
    }
    if let Some(status) = &s.status {
        println!();
        self::status(status);
    }
}

fn job_view(j: &JobInfo, phase: &MonitorPhase) {
    if phase.is_settled() && !matches!(phase, MonitorPhase::Abandoned(_)) {
        job(j);
    } else {
        println!("last seen: {} {}", j.job_id, status_badge(j.status));
    }
}
