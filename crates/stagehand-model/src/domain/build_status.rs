use std::fmt;

use serde::{Deserialize, Serialize};

/// Final verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    Success,
    Failure,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure taxonomy, derived from the category of the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    SetupFailure,
    DeployFailure,
    StartFailure,
    TestFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::SetupFailure => "SetupFailure",
            FailureKind::DeployFailure => "DeployFailure",
            FailureKind::StartFailure => "StartFailure",
            FailureKind::TestFailure => "TestFailure",
        };
        f.write_str(s)
    }
}

/// Outcome of a single stage within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageStatus {
    /// Script exited with code 0.
    Succeeded,
    /// Script failed and aborted the run.
    Failed,
    /// Script failed but its policy let the run continue.
    Tolerated,
    /// Not executed because an earlier stage aborted the run.
    Skipped,
}
