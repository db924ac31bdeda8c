use crate::core::domain::{RunResult, RunSpec};

/// Failures of the judging infrastructure itself. Anything the submission
/// does (crash, wrong output, timeout) is reported through [`RunResult`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error("failed to launch interpreter {interpreter}: {msg}")]
    Launch { interpreter: String, msg: String },
    #[error("failed to supervise child process: {msg}")]
    Supervise { msg: String },
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait Runner: std::fmt::Debug + Send + Sync {
    async fn run(&self, spec: &RunSpec) -> Result<RunResult, RunError>;
}
