//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize, de};
use validator::Validate;

/// Accept a JSON string or number, normalizing to a string.
///
/// Clients historically sent `uid` and `platform` as bare numbers; the
/// service has always keyed on their string form.
fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Body of `POST /uid`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertUidRequest {
    /// Caller-supplied identifier.
    #[serde(default, deserialize_with = "string_from_scalar")]
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    /// Optional partition tag.
    #[serde(default)]
    pub region: String,
    /// Opaque external account reference.
    #[serde(default)]
    pub openid: String,
    /// Opaque credential blob.
    #[serde(default)]
    pub access_token: String,
    /// Client platform tag.
    #[serde(default, deserialize_with = "string_from_scalar")]
    pub platform: String,
}

/// Body of `POST /uid/{uid}/adddays`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddDaysRequest {
    /// Days to grant; must be positive.
    #[validate(range(min = 1, message = "days must be greater than 0"))]
    pub days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_accepts_number_or_string() {
        let req: UpsertUidRequest = serde_json::from_str(r#"{"uid": 12345}"#).unwrap();
        assert_eq!(req.uid, "12345");

        let req: UpsertUidRequest = serde_json::from_str(r#"{"uid": "abc"}"#).unwrap();
        assert_eq!(req.uid, "abc");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: UpsertUidRequest = serde_json::from_str(r#"{"uid": "1"}"#).unwrap();
        assert_eq!(req.region, "");
        assert_eq!(req.openid, "");
        assert_eq!(req.platform, "");
    }

    #[test]
    fn test_empty_uid_fails_validation() {
        let req: UpsertUidRequest = serde_json::from_str(r#"{"uid": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_days_range() {
        let req: AddDaysRequest = serde_json::from_str(r#"{"days": 0}"#).unwrap();
        assert!(req.validate().is_err());
        let req: AddDaysRequest = serde_json::from_str(r#"{"days": 7}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
