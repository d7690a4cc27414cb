use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded HTTP request. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    pub id: Uuid,
    /// Post the request was attributed to, if any.
    pub post_id: Option<Uuid>,
    pub url: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub timestamp: DateTime<Utc>,
}
