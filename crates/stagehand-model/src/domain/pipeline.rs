use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{ModelError, Stage};

/// Ordered list of stages plus the channel that receives the run notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDef {
    pub name: String,
    /// Notification channel identifier (e.g. `#deployments`).
    #[serde(default)]
    pub channel: String,
    pub stages: Vec<Stage>,
}

impl PipelineDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: String::new(),
            stages: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Parse and validate a JSON definition.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let def: PipelineDef = serde_json::from_str(raw)?;
        def.validate()?;
        Ok(def)
    }

    /// Read, parse and validate a JSON definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.stages.is_empty() {
            return Err(ModelError::EmptyPipeline);
        }

        let mut seen = HashSet::with_capacity(self.stages.len());
        for (idx, stage) in self.stages.iter().enumerate() {
            if stage.name.trim().is_empty() {
                return Err(ModelError::EmptyStageName(idx));
            }
            if stage.script.trim().is_empty() {
                return Err(ModelError::EmptyScript(stage.name.clone()));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(ModelError::DuplicateStage(stage.name.clone()));
            }
        }
        Ok(())
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailurePolicy, StageCategory};

    const DEFINITION: &str = r##"{
        "name": "stagehand",
        "channel": "#deployments",
        "stages": [
            {"name": "Setup", "script": "cargo build --release", "category": "setup"},
            {"name": "Deploy", "script": "cp unit /etc/systemd/system/", "category": "deploy"},
            {"name": "Status", "script": "systemctl status app", "category": "start", "onFailure": "tolerate"},
            {"name": "Test", "script": "stagehand-verify", "category": "test"}
        ]
    }"##;

    #[test]
    fn parses_full_definition() {
        let def = PipelineDef::from_json(DEFINITION).unwrap();
        assert_eq!(def.channel, "#deployments");
        assert_eq!(
            def.stage_names().collect::<Vec<_>>(),
            ["Setup", "Deploy", "Status", "Test"]
        );
        assert_eq!(def.stages[2].on_failure, FailurePolicy::Tolerate);
        assert_eq!(def.stages[3].category, StageCategory::Test);
    }

    #[test]
    fn rejects_empty_pipeline() {
        let err = PipelineDef::new("empty").validate().unwrap_err();
        assert!(matches!(err, ModelError::EmptyPipeline));
    }

    #[test]
    fn rejects_duplicate_names() {
        let def = PipelineDef::new("dup")
            .with_stage(Stage::new("Build", "true"))
            .with_stage(Stage::new("Build", "true"));
        assert!(matches!(def.validate(), Err(ModelError::DuplicateStage(n)) if n == "Build"));
    }

    #[test]
    fn rejects_blank_name_and_script() {
        let def = PipelineDef::new("p").with_stage(Stage::new("  ", "true"));
        assert!(matches!(def.validate(), Err(ModelError::EmptyStageName(0))));

        let def = PipelineDef::new("p").with_stage(Stage::new("Build", " "));
        assert!(matches!(def.validate(), Err(ModelError::EmptyScript(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            PipelineDef::from_json("{\"name\":"),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn shipped_definition_is_valid() {
        let def = PipelineDef::from_json(include_str!("../../../../deploy/pipeline.json")).unwrap();
        let categories: Vec<_> = def.stages.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            [
                StageCategory::Setup,
                StageCategory::Deploy,
                StageCategory::Start,
                StageCategory::Test
            ]
        );
        let tolerated: Vec<_> = def
            .stages
            .iter()
            .filter(|s| s.is_tolerated())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(tolerated, ["Start"]);
    }

    #[test]
    fn shipped_definition_builds_without_lockfile_and_uses_port() {
        let def = PipelineDef::from_json(include_str!("../../../../deploy/pipeline.json")).unwrap();
        let script = |category: StageCategory| {
            def.stages
                .iter()
                .find(|s| s.category == category)
                .map(|s| s.script.as_str())
                .unwrap()
        };

        assert!(!script(StageCategory::Setup).contains("--locked"));
        assert!(script(StageCategory::Deploy).contains("Environment=STAGEHAND_PORT=%s"));
        assert!(script(StageCategory::Deploy).contains("\"$STAGEHAND_PORT\""));
        assert!(script(StageCategory::Test).contains("${STAGEHAND_PORT}"));
        assert!(!script(StageCategory::Test).contains(":5000"));
    }
}
