use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::constants::{DEFAULT_CASE_TIMEOUT_SECS, DEFAULT_RUN_TIMEOUT_SECS, TIMEOUT_RETURNCODE};

/// Wall-clock limit for a single interpreter launch, in seconds.
///
/// Always positive and representable as a [`Duration`]. Values coming from
/// callers go through [`TimeLimit::resolve`], which substitutes a default for anything unusable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeLimit {
    secs: f64,
}

impl TimeLimit {
    pub fn from_secs(secs: f64) -> Option<Self> {
        if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
            return None;
        }
        Some(Self { secs })
    }

    /// Picks `requested` when it is a valid limit, `default` otherwise,
    /// and clamps the result to `max`.
    pub fn resolve(requested: Option<f64>, default: TimeLimit, max: TimeLimit) -> Self {
        let limit = requested.and_then(Self::from_secs).unwrap_or(default);
        if limit.secs > max.secs { max } else { limit }
    }

    pub fn default_run() -> Self {
        Self {
            secs: DEFAULT_RUN_TIMEOUT_SECS,
        }
    }

    pub fn default_case() -> Self {
        Self {
            secs: DEFAULT_CASE_TIMEOUT_SECS,
        }
    }

    pub fn as_secs(&self) -> f64 {
        self.secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.secs)
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secs.fract() == 0.0 {
            write!(f, "{:.1}", self.secs)
        } else {
            write!(f, "{}", self.secs)
        }
    }
}

/// Everything needed for one interpreter launch.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSpec {
    pub path: PathBuf,
    pub stdin: String,
    pub time_limit: TimeLimit,
}

impl RunSpec {
    pub fn new(path: &Path, stdin: &str, time_limit: TimeLimit) -> Self {
        Self {
            path: path.to_path_buf(),
            stdin: stdin.to_string(),
            time_limit,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The process finished on its own. Killed-by-signal is reported as the
    /// negated signal number.
    Exited { code: i32 },
    TimedOut { limit: TimeLimit },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub outcome: RunOutcome,
}

impl RunResult {
    pub fn exited(code: i32, stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            outcome: RunOutcome::Exited { code },
        }
    }

    pub fn timed_out(limit: TimeLimit) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("Error: Timeout ({}s)", limit),
            outcome: RunOutcome::TimedOut { limit },
        }
    }

    pub fn returncode(&self) -> i32 {
        match self.outcome {
            RunOutcome::Exited { code } => code,
            RunOutcome::TimedOut { .. } => TIMEOUT_RETURNCODE,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self.outcome, RunOutcome::TimedOut { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunRequest {
    pub code: String,
    pub stdin: Option<String>,
    pub timeout: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
    pub timeout: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct GradeRequest {
    pub code: String,
    pub cases: Vec<TestCase>,
    pub strip_output: Option<bool>,
    pub default_timeout: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Ignore leading and trailing whitespace on both sides.
    Strip,
    Exact,
}

impl OutputPolicy {
    pub fn from_strip_flag(strip_output: Option<bool>) -> Self {
        if strip_output.unwrap_or(true) {
            OutputPolicy::Strip
        } else {
            OutputPolicy::Exact
        }
    }

    /// A case passes only when the submission exited cleanly and its output
    /// matches. Timeouts carry the sentinel return code and never pass.
    pub fn accepts(&self, result: &RunResult, expected: &str) -> bool {
        if result.returncode() != 0 || result.is_timed_out() {
            return false;
        }
        match self {
            OutputPolicy::Strip => result.stdout.trim() == expected.trim(),
            OutputPolicy::Exact => result.stdout == expected,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseReport {
    /// 1-based position in the submitted sequence.
    pub case: usize,
    pub input: String,
    pub expected: String,
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    pub timeout_used: f64,
    pub ok: bool,
}

impl CaseReport {
    pub fn new(
        case: usize,
        test: &TestCase,
        time_limit: TimeLimit,
        result: RunResult,
        ok: bool,
    ) -> Self {
        let returncode = result.returncode();
        Self {
            case,
            input: test.input.clone(),
            expected: test.expected.clone(),
            stdout: result.stdout,
            stderr: result.stderr,
            returncode,
            timeout_used: time_limit.as_secs(),
            ok,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradeReport {
    pub results: Vec<CaseReport>,
    pub passed: usize,
    pub total: usize,
}

impl GradeReport {
    pub fn from_results(results: Vec<CaseReport>) -> Self {
        let passed = results.iter().filter(|r| r.ok).count();
        let total = results.len();
        Self {
            results,
            passed,
            total,
        }
    }

    pub fn score(&self) -> String {
        format!("{}/{}", self.passed, self.total)
    }
}
