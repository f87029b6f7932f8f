use std::path::PathBuf;

use rag_gateway::error_handler::env_opt;

/// Directory used when `RAG_HISTORY_DIR` is unset.
pub const DEFAULT_HISTORY_DIR: &str = "./.rag-console";

/// Resolves the history directory from `RAG_HISTORY_DIR`.
pub fn history_dir_from_env() -> PathBuf {
    env_opt("RAG_HISTORY_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_DIR))
}
