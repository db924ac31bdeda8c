use std::path::Path;

use futures::{StreamExt, TryStreamExt, stream};

use crate::core::{
    domain::{CaseReport, GradeReport, GradeRequest, OutputPolicy, RunSpec, TestCase, TimeLimit},
    traits::runner::RunError,
};

use super::{Engine, EngineError};

impl Engine {
    /// Runs every case against one materialized copy of the submission.
    ///
    /// Cases are independent: a timeout or crash in one is recorded and the
    /// batch moves on. Up to `grade_concurrency` cases run at once, and the
    /// report always follows the order of `request.cases`.
    #[tracing::instrument(skip_all, fields(code_len = request.code.len(), cases = request.cases.len()))]
    pub async fn grade(&self, request: GradeRequest) -> Result<GradeReport, EngineError> {
        let policy = OutputPolicy::from_strip_flag(request.strip_output);
        let default_limit = TimeLimit::resolve(
            request.default_timeout,
            TimeLimit::default_case(),
            self.limits.max_timeout,
        );

        let source = self.materializer.materialize(&request.code).await?;
        let path = source.path();
        let pending: Vec<_> = request
            .cases
            .iter()
            .enumerate()
            .map(|(idx, case)| self.grade_case(path, idx + 1, case, policy, default_limit))
            .collect();
        let results = stream::iter(pending)
            .buffered(self.limits.grade_concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await;
        source.release();

        let report = GradeReport::from_results(results?);
        tracing::info!(score = %report.score(), "grading finished");
        Ok(report)
    }

    async fn grade_case(
        &self,
        path: &Path,
        case_no: usize,
        case: &TestCase,
        policy: OutputPolicy,
        default_limit: TimeLimit,
    ) -> Result<CaseReport, RunError> {
        let time_limit = TimeLimit::resolve(case.timeout, default_limit, self.limits.max_timeout);
        let spec = RunSpec::new(path, &case.input, time_limit);

        let result = self.runner.run(&spec).await?;
        let ok = policy.accepts(&result, &case.expected);
        tracing::debug!(
            case = case_no,
            ok,
            returncode = result.returncode(),
            timed_out = result.is_timed_out(),
            "case graded"
        );

        Ok(CaseReport::new(case_no, case, time_limit, result, ok))
    }
}
