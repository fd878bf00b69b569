//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the session was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Commit the recording was made from.
    pub commit: String,
    /// Interactions in recording order.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Sequence number within the cassette.
    pub seq: u64,
    /// Port name, e.g. `"image_generator"`.
    pub port: String,
    /// Method name, e.g. `"generate"`.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized result, `{"Ok": ...}` or `{"Err": "..."}`.
    pub output: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hand_written_yaml() {
        let yaml = r#"
name: heart
recorded_at: "2026-02-01T00:00:00Z"
commit: test
interactions:
  - seq: 0
    port: image_generator
    method: generate
    input: {}
    output:
      Err: "API error (400): billing_hard_limit_reached"
"#;
        let cassette: Cassette = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cassette.name, "heart");
        assert_eq!(cassette.interactions.len(), 1);
        assert!(cassette.interactions[0].output.get("Err").is_some());
    }
}
