use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newsletter subscription, optionally narrowed to categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: Uuid,
    pub email: String,
    pub category_ids: Vec<Uuid>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}

impl NewsletterSubscription {
    pub fn new(email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            category_ids: Vec::new(),
            is_active: true,
            subscribed_at: Utc::now(),
        }
    }
}
