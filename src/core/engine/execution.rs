use crate::core::domain::{RunRequest, RunResult, RunSpec, TimeLimit};

use super::{Engine, EngineError};

impl Engine {
    /// Runs a submission once. Timeouts and runtime errors come back as a
    /// normal [`RunResult`]; only infrastructure failures are errors.
    #[tracing::instrument(skip_all, fields(code_len = request.code.len()))]
    pub async fn execute(&self, request: RunRequest) -> Result<RunResult, EngineError> {
        let time_limit = TimeLimit::resolve(
            request.timeout,
            TimeLimit::default_run(),
            self.limits.max_timeout,
        );

        let source = self.materializer.materialize(&request.code).await?;
        let spec = RunSpec::new(
            source.path(),
            request.stdin.as_deref().unwrap_or(""),
            time_limit,
        );
        let result = self.runner.run(&spec).await;
        source.release();

        let result = result?;
        tracing::info!(
            returncode = result.returncode(),
            timed_out = result.is_timed_out(),
            "run finished"
        );
        Ok(result)
    }
}
