use std::{net::SocketAddr, path::PathBuf, time::Duration};

use stagehand_model::StageEnv;

use crate::{error::CoreError, trigger::DEFAULT_POLL_INTERVAL};

pub const ENV_APP_DIR: &str = "STAGEHAND_APP_DIR";
pub const ENV_UNIT_PATH: &str = "STAGEHAND_UNIT_PATH";
pub const ENV_PORT: &str = "STAGEHAND_PORT";
pub const ENV_PIPELINE: &str = "STAGEHAND_PIPELINE";
pub const ENV_WEBHOOK_URL: &str = "STAGEHAND_WEBHOOK_URL";
pub const ENV_POLL_SECS: &str = "STAGEHAND_POLL_SECS";
pub const ENV_HOOK_ADDR: &str = "STAGEHAND_HOOK_ADDR";
pub const ENV_REVISION_PROBE: &str = "STAGEHAND_REVISION_PROBE";

pub const DEFAULT_PORT: u16 = 5000;

/// Pipeline runner settings.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Application checkout; exported to stages and used as the probe's working directory.
    pub app_dir: PathBuf,
    /// Where the deploy stage installs the unit file.
    pub unit_path: PathBuf,
    /// Port the deployed service binds to.
    pub port: u16,
    /// JSON pipeline definition.
    pub pipeline_path: PathBuf,
    /// Chat webhook; log-only notifications when `None`.
    pub webhook_url: Option<String>,
    pub poll_interval: Duration,
    /// Listen address for `POST /hooks/scm`; disabled when `None`.
    pub hook_addr: Option<SocketAddr>,
    /// Shell command printing the current revision; every tick builds when `None`.
    pub revision_probe: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("/opt/stagehand"),
            unit_path: PathBuf::from("/etc/systemd/system/stagehand-service.service"),
            port: DEFAULT_PORT,
            pipeline_path: PathBuf::from("deploy/pipeline.json"),
            webhook_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            hook_addr: None,
            revision_probe: Some("git rev-parse HEAD".to_string()),
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `STAGEHAND_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(dir) = lookup(ENV_APP_DIR) {
            cfg.app_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_UNIT_PATH) {
            cfg.unit_path = PathBuf::from(path);
        }
        if let Some(port) = lookup(ENV_PORT) {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|e| CoreError::Config(format!("{ENV_PORT}={port}: {e}")))?;
        }
        if let Some(path) = lookup(ENV_PIPELINE) {
            cfg.pipeline_path = PathBuf::from(path);
        }
        cfg.webhook_url = lookup(ENV_WEBHOOK_URL).filter(|u| !u.trim().is_empty());

        if let Some(secs) = lookup(ENV_POLL_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| CoreError::Config(format!("{ENV_POLL_SECS}={secs}: {e}")))?;
            if secs == 0 {
                return Err(CoreError::Config(format!("{ENV_POLL_SECS} must be positive")));
            }
            cfg.poll_interval = Duration::from_secs(secs);
        }
        if let Some(addr) = lookup(ENV_HOOK_ADDR).filter(|a| !a.trim().is_empty()) {
            cfg.hook_addr = Some(
                addr.trim()
                    .parse()
                    .map_err(|e| CoreError::Config(format!("{ENV_HOOK_ADDR}={addr}: {e}")))?,
            );
        }
        if let Some(probe) = lookup(ENV_REVISION_PROBE) {
            cfg.revision_probe = Some(probe).filter(|p| !p.trim().is_empty());
        }

        Ok(cfg)
    }

    /// Environment inputs exported to every stage.
    pub fn stage_env(&self) -> StageEnv {
        StageEnv::new()
            .with(ENV_APP_DIR, self.app_dir.to_string_lossy())
            .with(ENV_UNIT_PATH, self.unit_path.to_string_lossy())
            .with(ENV_PORT, self.port.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = RunnerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.poll_interval, Duration::from_secs(300));
        assert!(cfg.webhook_url.is_none());
        assert!(cfg.hook_addr.is_none());
        assert_eq!(cfg.revision_probe.as_deref(), Some("git rev-parse HEAD"));
    }

    #[test]
    fn overrides_from_env() {
        let cfg = RunnerConfig::from_lookup(lookup(&[
            (ENV_APP_DIR, "/srv/app"),
            (ENV_PORT, "8080"),
            (ENV_POLL_SECS, "60"),
            (ENV_WEBHOOK_URL, "http://hooks.local/x"),
            (ENV_HOOK_ADDR, "127.0.0.1:9000"),
            (ENV_REVISION_PROBE, ""),
        ]))
        .unwrap();

        assert_eq!(cfg.app_dir, PathBuf::from("/srv/app"));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.poll_interval, Duration::from_secs(60));
        assert_eq!(cfg.webhook_url.as_deref(), Some("http://hooks.local/x"));
        assert_eq!(cfg.hook_addr, Some("127.0.0.1:9000".parse().unwrap()));
        assert!(cfg.revision_probe.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[(ENV_PORT, "http")])),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[(ENV_POLL_SECS, "0")])),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            RunnerConfig::from_lookup(lookup(&[(ENV_HOOK_ADDR, "nowhere")])),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn stage_env_exports_inputs() {
        let env = RunnerConfig::default().stage_env();
        assert_eq!(env.get(ENV_PORT), Some("5000"));
        assert_eq!(env.get(ENV_APP_DIR), Some("/opt/stagehand"));
        assert_eq!(
            env.get(ENV_UNIT_PATH),
            Some("/etc/systemd/system/stagehand-service.service")
        );
    }
}
