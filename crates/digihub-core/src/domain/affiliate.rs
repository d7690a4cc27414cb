//! Affiliate programs, tracked outbound links and their click log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateProgram {
    pub id: Uuid,
    pub name: String,
    pub company: String,
    /// Commission in percent, when the program publishes one.
    pub commission_rate: Option<f64>,
    pub is_active: bool,
}

/// Outbound URL whose clicks are counted before redirecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub id: Uuid,
    pub program_id: Uuid,
    pub url: String,
    pub title: String,
    pub category: String,
    pub is_active: bool,
    /// Denormalized count of `LinkClick` rows for this link.
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

/// Caller details captured for a tracked request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickContext {
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
}

/// One followed affiliate link. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkClick {
    pub id: Uuid,
    pub link_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub clicked_at: DateTime<Utc>,
}

impl LinkClick {
    pub fn new(link_id: Uuid, context: ClickContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            link_id,
            ip_address: context.ip_address,
            user_agent: context.user_agent,
            referrer: context.referrer,
            clicked_at: Utc::now(),
        }
    }
}
