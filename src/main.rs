//! # RAG console (`ragc`)
//!
//! Terminal client for the retrieval-augmented question answering backend.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragc ask "<question>"` | Ask a question, optionally rate the answer |
//! | `ragc history list` | Show recorded exchanges, newest first |
//! | `ragc status` | Backend provider, index and rate-limit summary |
//! | `ragc health` | Liveness probe with latency |
//! | `ragc reindex` | Rebuild the index and watch the job |
//! | `ragc job` | Show the backend's current reindex job |
//!
//! Configuration comes from the environment (a `.env` file is loaded when present):
//! `RAG_API_BASE_URL`, `RAG_API_ORIGIN`, `APP_PORT`, `RAG_API_TIMEOUT_SECS`,
//! `RAG_HISTORY_DIR`, `RAG_POLL_INTERVAL_MS`, `RAG_POLL_CEILING_MS`.

mod commands;
mod prompt;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use rag_gateway::models::FeedbackRating;
use rag_gateway::telemetry;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ragc", version, about = "Ask questions and manage the knowledge base index")]
struct Cli {
    /// Debug logging for this workspace's crates.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and record the answer in history.
    Ask {
        question: String,

        /// Number of passages to retrieve.
        #[arg(long)]
        top_k: Option<u32>,

        /// Rate the answer right away.
        #[arg(long, value_enum)]
        rate: Option<Rating>,

        /// Comment attached to the rating.
        #[arg(long, requires = "rate")]
        comment: Option<String>,
    },

    /// Inspect or edit the local history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show the backend status summary.
    Status,

    /// Probe backend liveness.
    Health,

    /// Start a reindex job and watch it until it finishes.
    Reindex {
        /// Only re-embed changed files.
        #[arg(long)]
        incremental: bool,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,

        /// Return right after the job is accepted.
        #[arg(long)]
        no_watch: bool,
    },

    /// Show the backend's current reindex job.
    Job,
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Show { id: String },
    Remove { id: String },
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Rating {
    Useful,
    Useless,
}

impl From<Rating> for FeedbackRating {
    fn from(r: Rating) -> Self {
        match r {
            Rating::Useful => FeedbackRating::Useful,
            Rating::Useless => FeedbackRating::Useless,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; everything has defaults.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let cli = Cli::parse();

    let level = cli.verbose.then_some(Level::DEBUG);
    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", level))
        .with(telemetry::layer())
        .init();

    let app = commands::App::from_env()?;

    match cli.command {
        Commands::Ask {
            question,
            top_k,
            rate,
            comment,
        } => commands::ask(&app, &question, top_k, rate.map(Into::into), comment).await,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history_list(&app),
            HistoryAction::Show { id } => commands::history_show(&app, &id),
            HistoryAction::Remove { id } => commands::history_remove(&app, &id),
            HistoryAction::Clear { yes } => commands::history_clear(&app, yes),
        },
        Commands::Status => commands::status(&app).await,
        Commands::Health => commands::health(&app).await,
        Commands::Reindex {
            incremental,
            yes,
            no_watch,
        } => commands::reindex(&app, incremental, yes, !no_watch).await,
        Commands::Job => commands::job(&app).await,
    }
}
