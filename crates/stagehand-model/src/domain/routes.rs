use serde::{Deserialize, Serialize};

pub const NAME_PATH: &str = "/name";
pub const VERSION_PATH: &str = "/version";

pub const DEFAULT_DEVELOPER_NAME: &str = "Devops Bharat";
pub const DEFAULT_VERSION: &str = "v1.0.0.0";

/// Fixed path-to-body mapping served by the demo service and expected by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub developer_name: String,
    pub version: String,
}

impl RouteTable {
    pub fn new(developer_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            developer_name: developer_name.into(),
            version: version.into(),
        }
    }

    /// `(path, body)` pairs in a stable order.
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [
            (NAME_PATH, self.developer_name.as_str()),
            (VERSION_PATH, self.version.as_str()),
        ]
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(DEFAULT_DEVELOPER_NAME, DEFAULT_VERSION)
    }
}
