use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::slugify;

/// Tag entity - free-form label shared by many posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            slug: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Fill in the slug from the name when it is still empty.
    pub fn prepare_for_save(&mut self) {
        if self.slug.is_empty() {
            self.slug = slugify(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_derived_once() {
        let mut tag = Tag::new("Content Marketing".to_string());
        tag.prepare_for_save();
        assert_eq!(tag.slug, "content-marketing");

        tag.name = "Renamed".to_string();
        tag.prepare_for_save();
        assert_eq!(tag.slug, "content-marketing");
    }
}
