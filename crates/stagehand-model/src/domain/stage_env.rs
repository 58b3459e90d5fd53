use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Extra environment variables for a stage process.
///
/// Serialized as a plain array of `{key, value}` objects. Later entries shadow earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageEnv(Vec<KeyValue>);

impl StageEnv {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Value of the last entry with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.push(key, value);
        self
    }

    /// Concatenate `self` and `overlay`; entries from `overlay` win on lookup.
    pub fn overlaid(&self, overlay: &StageEnv) -> StageEnv {
        let mut out = self.0.clone();
        out.extend(overlay.0.iter().cloned());
        StageEnv(out)
    }

    /// Effective key/value pairs with shadowed duplicates removed, in first-seen key order.
    pub fn resolved(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::with_capacity(self.0.len());
        for kv in &self.0 {
            match out.iter_mut().find(|(k, _)| *k == kv.key()) {
                Some(slot) => slot.1 = kv.value(),
                None => out.push((kv.key(), kv.value())),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::StageEnv;

    #[test]
    fn lookup_returns_last_write() {
        let env = StageEnv::new()
            .with("STAGEHAND_PORT", "5000")
            .with("STAGEHAND_APP_DIR", "/opt/app")
            .with("STAGEHAND_PORT", "8080");

        assert_eq!(env.get("STAGEHAND_PORT"), Some("8080"));
        assert_eq!(env.get("STAGEHAND_APP_DIR"), Some("/opt/app"));
        assert!(env.get("MISSING").is_none());
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn overlay_shadows_base() {
        let base = StageEnv::new().with("A", "base").with("B", "b");
        let stage = StageEnv::new().with("A", "stage");

        let merged = base.overlaid(&stage);
        assert_eq!(merged.get("A"), Some("stage"));
        assert_eq!(merged.get("B"), Some("b"));
        assert_eq!(base.get("A"), Some("base"));
    }

    #[test]
    fn resolved_drops_shadowed_entries() {
        let env = StageEnv::new().with("A", "1").with("B", "2").with("A", "3");
        assert_eq!(env.resolved(), vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn deserializes_from_array() {
        let env: StageEnv =
            serde_json::from_str(r#"[{"key":"FOO","value":"bar"}]"#).unwrap();
        assert_eq!(env.get("FOO"), Some("bar"));
    }
}
