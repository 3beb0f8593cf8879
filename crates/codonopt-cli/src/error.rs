use codonopt::core::io::records::RecordError;
use codonopt::engine::error::EngineError;
use codonopt::workflows::verify::VerifyError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("Record error: {0}")]
    Records(#[from] RecordError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} designs failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Verification found {0} violation(s)")]
    Violations(usize),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
