//! Evaluation policy.
//!
//! Two independent switches control which side of the rule fires. Both
//! default to on; settings only ever switch checks off. Config parsing is
//! fail-soft per key: an unreadable value falls back to that key's default
//! and the rest of the settings still apply.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Settings key for the unnecessary-omit check on value-shaped fields.
pub const KEY_UNNECESSARY: &str = "unnecessary";

/// Settings key for the missing-omit check on nullable-shaped fields.
pub const KEY_MISSING: &str = "missing";

/// Which checks the evaluator performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Report value-shaped fields that carry the omit marker.
    pub unnecessary: bool,
    /// Report nullable-shaped fields that lack the omit marker.
    pub missing: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            unnecessary: true,
            missing: true,
        }
    }
}

impl Policy {
    /// Reads a policy out of plugin settings, one key at a time.
    ///
    /// Missing keys keep their defaults. A key bound to anything other than
    /// a JSON boolean is ignored with a debug event, as is a settings value
    /// that is not an object. Unknown keys are ignored without comment so
    /// configs can be shared across rule versions.
    pub fn from_config(settings: Option<&Value>) -> Policy {
        let mut policy = Policy::default();
        let map = match settings {
            None | Some(Value::Null) => return policy,
            Some(Value::Object(map)) => map,
            Some(other) => {
                debug!(
                    settings = %other,
                    "ignoring non-object rule settings, using default policy"
                );
                return policy;
            }
        };
        policy.unnecessary = read_flag(map, KEY_UNNECESSARY, policy.unnecessary);
        policy.missing = read_flag(map, KEY_MISSING, policy.missing);
        policy
    }
}

fn read_flag(map: &serde_json::Map<String, Value>, key: &str, default: bool) -> bool {
    match map.get(key) {
        None => default,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            debug!(key, value = %other, "ignoring non-boolean policy setting");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_enables_both_checks() {
        let policy = Policy::default();
        assert!(policy.unnecessary);
        assert!(policy.missing);
    }

    #[test]
    fn test_from_config_reads_both_keys() {
        let settings = json!({ "unnecessary": false, "missing": false });
        let policy = Policy::from_config(Some(&settings));
        assert!(!policy.unnecessary);
        assert!(!policy.missing);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let settings = json!({ "missing": false });
        let policy = Policy::from_config(Some(&settings));
        assert!(policy.unnecessary);
        assert!(!policy.missing);
    }

    #[test]
    fn test_no_settings_means_defaults() {
        assert_eq!(Policy::from_config(None), Policy::default());
        assert_eq!(Policy::from_config(Some(&Value::Null)), Policy::default());
    }

    #[test]
    fn test_non_boolean_value_falls_back_per_key() {
        // One bad key must not poison the other.
        let settings = json!({ "unnecessary": "yes", "missing": false });
        let policy = Policy::from_config(Some(&settings));
        assert!(policy.unnecessary);
        assert!(!policy.missing);
    }

    #[test]
    fn test_non_object_settings_fall_back_entirely() {
        let settings = json!(["unnecessary", "missing"]);
        assert_eq!(Policy::from_config(Some(&settings)), Policy::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings = json!({ "futureKnob": true, "unnecessary": false });
        let policy = Policy::from_config(Some(&settings));
        assert!(!policy.unnecessary);
        assert!(policy.missing);
    }

    #[test]
    fn test_serde_round_trip_uses_config_key_names() {
        let policy = Policy {
            unnecessary: false,
            missing: true,
        };
        let encoded = serde_json::to_value(policy).unwrap();
        assert_eq!(encoded, json!({ "unnecessary": false, "missing": true }));
        let decoded: Policy = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, policy);
    }

    #[test]
    fn test_deserializing_empty_object_yields_defaults() {
        let decoded: Policy = serde_json::from_value(json!({})).unwrap();
        assert_eq!(decoded, Policy::default());
    }
}
