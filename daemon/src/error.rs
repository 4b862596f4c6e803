use ballot_election::ElectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("step {step} rejected: {source}")]
    StepRejected {
        step: usize,
        #[source]
        source: ElectionError,
    },

    #[error("election error: {0}")]
    Election(#[from] ElectionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
