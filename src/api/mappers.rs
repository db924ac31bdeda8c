use crate::api::models;
use crate::core::domain;

impl From<models::RunRequest> for domain::RunRequest {
    fn from(req: models::RunRequest) -> Self {
        Self {
            code: req.code,
            stdin: req.stdin,
            timeout: req.timeout,
        }
    }
}

impl From<models::TestCase> for domain::TestCase {
    fn from(case: models::TestCase) -> Self {
        Self {
            input: case.input,
            expected: case.expected,
            timeout: case.timeout,
        }
    }
}

impl From<models::GradeRequest> for domain::GradeRequest {
    fn from(req: models::GradeRequest) -> Self {
        Self {
            code: req.code,
            cases: req.cases.into_iter().map(Into::into).collect(),
            strip_output: req.strip_output,
            default_timeout: req.default_timeout,
        }
    }
}

impl From<domain::RunResult> for models::RunResponse {
    fn from(result: domain::RunResult) -> Self {
        Self {
            returncode: result.returncode(),
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }
}

impl From<domain::CaseReport> for models::CaseResponse {
    fn from(report: domain::CaseReport) -> Self {
        Self {
            case: report.case,
            input: report.input,
            expected: report.expected,
            stdout: report.stdout,
            stderr: report.stderr,
            returncode: report.returncode,
            timeout_used: report.timeout_used,
            ok: report.ok,
        }
    }
}

impl From<domain::GradeReport> for models::GradeResponse {
    fn from(report: domain::GradeReport) -> Self {
        Self {
            score: report.score(),
            passed: report.passed,
            total: report.total,
            results: report.results.into_iter().map(Into::into).collect(),
        }
    }
}
