//! Execution and grading on top of the materializer and a [`Runner`].
//!
//! An [`Engine`] is built once at startup and shared by every request
//! handler. It holds no mutable state: each request materializes its own
//! source file and releases it before returning, whatever the outcome.

use std::sync::Arc;

use crate::{
    constants::{DEFAULT_GRADE_CONCURRENCY, DEFAULT_MAX_TIMEOUT_SECS},
    core::{
        domain::TimeLimit,
        traits::runner::{RunError, Runner},
    },
    native::materializer::{MaterializeError, SourceMaterializer},
};

mod execution;
mod grading;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Run(#[from] RunError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineLimits {
    /// Upper bound for any requested time limit.
    pub max_timeout: TimeLimit,
    /// How many grading cases may run at once.
    pub grade_concurrency: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_timeout: TimeLimit::from_secs(DEFAULT_MAX_TIMEOUT_SECS)
                .unwrap_or_else(TimeLimit::default_run),
            grade_concurrency: DEFAULT_GRADE_CONCURRENCY,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    materializer: SourceMaterializer,
    runner: Arc<dyn Runner>,
    limits: EngineLimits,
}

impl Engine {
    pub fn new(
        materializer: SourceMaterializer,
        runner: Arc<dyn Runner>,
        limits: EngineLimits,
    ) -> Self {
        Self {
            materializer,
            runner,
            limits,
        }
    }
}
