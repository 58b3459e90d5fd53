use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{FailureKind, StageEnv};

/// Which part of the delivery flow a stage belongs to.
///
/// Determines the [`FailureKind`] reported when the stage fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageCategory {
    /// Dependency and environment preparation.
    #[default]
    Setup,
    /// Installing artifacts such as the unit file.
    Deploy,
    /// Starting or reloading the supervised service.
    Start,
    /// Verifying the running service.
    Test,
}

impl StageCategory {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            StageCategory::Setup => FailureKind::SetupFailure,
            StageCategory::Deploy => FailureKind::DeployFailure,
            StageCategory::Start => FailureKind::StartFailure,
            StageCategory::Test => FailureKind::TestFailure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageCategory::Setup => "setup",
            StageCategory::Deploy => "deploy",
            StageCategory::Start => "start",
            StageCategory::Test => "test",
        }
    }
}

/// What a failing stage does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Mark the run failed and skip every remaining stage.
    #[default]
    Abort,
    /// Record the failure and carry on with the next stage.
    Tolerate,
}

/// One named unit of pipeline work: a shell script with a single pass/fail outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    /// Script handed to the platform shell (`sh -c` / `cmd /C`).
    pub script: String,
    #[serde(default)]
    pub category: StageCategory,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Working directory; inherits the runner's when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "StageEnv::is_empty")]
    pub env: StageEnv,
}

impl Stage {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            category: StageCategory::default(),
            on_failure: FailurePolicy::default(),
            cwd: None,
            env: StageEnv::new(),
        }
    }

    pub fn with_category(mut self, category: StageCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(key, value);
        self
    }

    #[inline]
    pub fn is_tolerated(&self) -> bool {
        self.on_failure == FailurePolicy::Tolerate
    }
}
