use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::slugify;

/// Category entity - the single section a post belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Icon name used by the front end, without any prefix.
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            slug: String::new(),
            description: None,
            icon: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fill in the slug from the name when it is still empty.
    pub fn prepare_for_save(&mut self, now: DateTime<Utc>) {
        if self.slug.is_empty() {
            self.slug = slugify(&self.name);
        }
        self.updated_at = now;
    }
}
