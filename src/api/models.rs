//! Wire format: one JSON object per line in each direction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    /// Opaque correlation id, echoed back untouched.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Run(RunRequest),
    Grade(GradeRequest),
    Ping,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
    #[serde(default)]
    pub stdin: Option<String>,
    #[serde(default)]
    pub timeout: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub code: String,
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub strip_output: Option<bool>,
    #[serde(default)]
    pub default_timeout: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
    #[serde(default)]
    pub timeout: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub response: Response,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Run(RunResponse),
    Grade(GradeResponse),
    Greeting { message: String },
    Error { error: String },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RunResponse {
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GradeResponse {
    pub score: String,
    pub passed: usize,
    pub total: usize,
    pub results: Vec<CaseResponse>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CaseResponse {
    pub case: usize,
    pub input: String,
    pub expected: String,
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    pub timeout_used: f64,
    pub ok: bool,
}
