use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::text::{derive_excerpt, slugify};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(DomainError::Validation(format!(
                "Unknown post status '{}'",
                other
            ))),
        }
    }
}

/// Post entity - represents a blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    /// Path of the featured image, relative to the media root.
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub is_featured: bool,
    pub views: i64,
    pub meta_description: String,
    pub meta_keywords: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new draft post.
    pub fn new(author_id: Uuid, category_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            title,
            slug: String::new(),
            excerpt: String::new(),
            content,
            featured_image: None,
            status: PostStatus::Draft,
            is_featured: false,
            views: 0,
            meta_description: String::new(),
            meta_keywords: String::new(),
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Derive the fields a post must carry before it is persisted.
    ///
    /// Only empty fields are filled: an existing slug, publish timestamp or
    /// excerpt is never replaced.
    pub fn prepare_for_save(&mut self, now: DateTime<Utc>) {
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
        if self.is_published() && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        if self.excerpt.is_empty() && !self.content.is_empty() {
            self.excerpt = derive_excerpt(&self.content);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str, content: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            title.to_string(),
            content.to_string(),
        )
    }

    #[test]
    fn test_slug_assigned_from_title() {
        let mut post = draft("Ten SEO Tips", "body");
        post.prepare_for_save(Utc::now());
        assert_eq!(post.slug, "ten-seo-tips");
    }

    #[test]
    fn test_slug_not_changed_by_second_save() {
        let mut post = draft("Original Title", "body");
        post.prepare_for_save(Utc::now());

        post.title = "A Completely Different Title".to_string();
        post.prepare_for_save(Utc::now());

        assert_eq!(post.slug, "original-title");
    }

    #[test]
    fn test_explicit_slug_is_kept() {
        let mut post = draft("Title", "body");
        post.slug = "custom".to_string();
        post.prepare_for_save(Utc::now());
        assert_eq!(post.slug, "custom");
    }

    #[test]
    fn test_draft_has_no_publish_timestamp() {
        let mut post = draft("Title", "body");
        post.prepare_for_save(Utc::now());
        assert!(post.published_at.is_none());
    }

    #[test]
    fn test_publish_timestamp_set_once() {
        let mut post = draft("Title", "body");
        post.prepare_for_save(Utc::now());

        let first = Utc::now();
        post.status = PostStatus::Published;
        post.prepare_for_save(first);
        assert_eq!(post.published_at, Some(first));

        post.prepare_for_save(first + Duration::hours(2));
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn test_excerpt_derived_from_content() {
        let mut post = draft("Title", "<p>Hello <b>World</b></p>");
        post.prepare_for_save(Utc::now());
        assert_eq!(post.excerpt, "Hello World");
    }

    #[test]
    fn test_explicit_excerpt_is_kept() {
        let mut post = draft("Title", "<p>Body</p>");
        post.excerpt = "Hand written".to_string();
        post.prepare_for_save(Utc::now());
        assert_eq!(post.excerpt, "Hand written");
    }

    #[test]
    fn test_empty_content_leaves_excerpt_empty() {
        let mut post = draft("Title", "");
        post.prepare_for_save(Utc::now());
        assert!(post.excerpt.is_empty());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert!("deleted".parse::<PostStatus>().is_err());
    }
}
