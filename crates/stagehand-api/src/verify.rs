use std::{fmt, time::Duration};

use reqwest::Client;
use stagehand_model::RouteTable;
use tracing::{debug, info, warn};

use crate::error::ApiError;

pub const ENV_BASE_URL: &str = "STAGEHAND_BASE_URL";
pub const ENV_EXPECT_NAME: &str = "STAGEHAND_DEVELOPER_NAME";
pub const ENV_EXPECT_VERSION: &str = "STAGEHAND_VERSION";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const EXPECTED_STATUS: u16 = 200;

/// Target and expectations for one verification pass.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub base_url: String,
    pub expected: RouteTable,
    pub timeout: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            expected: RouteTable::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl VerifyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            cfg.base_url = url.trim().to_string();
        }
        if let Some(name) = lookup(ENV_EXPECT_NAME) {
            cfg.expected.developer_name = name;
        }
        if let Some(version) = lookup(ENV_EXPECT_VERSION) {
            cfg.expected.version = version;
        }
        cfg
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Outcome of a single `GET` against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub path: &'static str,
    pub expected_status: u16,
    pub expected_body: String,
    pub status: Option<u16>,
    pub body: Option<String>,
    /// Transport error, if the request never produced a response.
    pub error: Option<String>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self.status == Some(self.expected_status)
            && self.body.as_deref() == Some(self.expected_body.as_str())
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "PASS" } else { "FAIL" };
        write!(f, "{verdict} GET {}", self.path)?;
        if let Some(err) = &self.error {
            return write!(f, ": {err}");
        }
        write!(
            f,
            ": expected {} {:?}, got {} {:?}",
            self.expected_status,
            self.expected_body,
            self.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
            self.body.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub base_url: String,
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// HTTP client asserting exact-match responses from the demo service.
pub struct Verifier {
    client: Client,
    cfg: VerifyConfig,
}

impl Verifier {
    pub fn new(cfg: VerifyConfig) -> Result<Self, ApiError> {
        let base = cfg.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ApiError::InvalidConfig(format!(
                "{ENV_BASE_URL} must be an http(s) URL, got {:?}",
                cfg.base_url
            )));
        }
        let client = Client::builder().timeout(cfg.timeout).build()?;
        let cfg = VerifyConfig {
            base_url: base.to_string(),
            ..cfg
        };
        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.cfg
    }

    /// Check every route; all checks run even after one fails.
    pub async fn run(&self) -> VerifyReport {
        let mut checks = Vec::new();
        for (path, body) in self.cfg.expected.entries() {
            let check = self.check(path, body).await;
            if check.passed() {
                info!(target: "stagehand.api.verify", path, "check passed");
            } else {
                warn!(target: "stagehand.api.verify", path, check = %check, "check failed");
            }
            checks.push(check);
        }
        VerifyReport {
            base_url: self.cfg.base_url.clone(),
            checks,
        }
    }

    pub async fn check(&self, path: &'static str, expected_body: &str) -> Check {
        let url = format!("{}{path}", self.cfg.base_url);
        debug!(target: "stagehand.api.verify", %url, "GET");

        let mut check = Check {
            path,
            expected_status: EXPECTED_STATUS,
            expected_body: expected_body.to_string(),
            status: None,
            body: None,
            error: None,
        };

        match self.client.get(&url).send().await {
            Ok(res) => {
                check.status = Some(res.status().as_u16());
                match res.text().await {
                    Ok(body) => check.body = Some(body),
                    Err(e) => check.error = Some(e.to_string()),
                }
            }
            Err(e) => check.error = Some(e.to_string()),
        }
        check
    }
}
