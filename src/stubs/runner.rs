use std::time::Duration;

use crate::core::{
    domain::{RunResult, RunSpec},
    traits::runner::{RunError, Runner},
};

/// Answers every run with a fixed result after a fixed delay.
#[derive(Debug, Clone)]
pub struct RunnerStub {
    result: Result<RunResult, RunError>,
    delay: Duration,
}

impl RunnerStub {
    pub fn new(result: Result<RunResult, RunError>, delay: Duration) -> Self {
        Self { result, delay }
    }
}

#[async_trait::async_trait]
impl Runner for RunnerStub {
    #[tracing::instrument]
    async fn run(&self, spec: &RunSpec) -> Result<RunResult, RunError> {
        tracing::debug!("Start execution: spec={:?}", spec);
        tokio::time::sleep(self.delay).await;
        tracing::debug!("Execution result: {:?}", self.result);

        self.result.clone()
    }
}
