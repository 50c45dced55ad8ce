//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uidhub_entity::EntitlementRecord;
use uidhub_service::AccessStatus;

/// Response of `POST /uid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUidResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The upserted identifier.
    pub uid: String,
    /// Total records after the write.
    pub total_uids: u64,
}

/// Response of `GET /uids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUidsResponse {
    /// Number of records returned.
    pub total: u64,
    /// Every record in the store.
    pub uids: Vec<EntitlementRecord>,
}

/// Response of `GET /uid/{uid}/check`.
///
/// The inactive shape carries only `message`; the active shape carries
/// `days_left` and `expire_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAccessResponse {
    /// Whether an entitlement window is open.
    pub active: bool,
    /// The checked identifier.
    pub uid: String,
    /// Whole days until expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
    /// The expiration instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    /// Guidance when inactive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AccessStatus> for CheckAccessResponse {
    fn from(status: AccessStatus) -> Self {
        Self {
            active: status.active,
            uid: status.uid,
            days_left: status.days_left,
            expire_date: status.expire_date,
            message: status.message,
        }
    }
}

/// Response of `POST /uid/{uid}/adddays`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDaysResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The granted identifier.
    pub uid: String,
    /// Days applied by this grant.
    pub days_added: i64,
    /// The new expiration instant.
    pub expire_date: DateTime<Utc>,
}

/// Response of `DELETE /uid/{uid}/remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveUidResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status string.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Store reachability: `"available"` or `"unavailable"`.
    pub store: String,
}
