use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::DomainError;
use crate::ports::BaseRepository;

use super::Repositories;

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u64,
}

/// Comments, likes and bookmarks.
pub struct EngagementService {
    repos: Repositories,
}

impl EngagementService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Comment on the published post with `slug`.
    ///
    /// Returns the post alongside the comment so callers can link back to it.
    pub async fn add_comment(
        &self,
        slug: &str,
        author_id: Uuid,
        content: &str,
    ) -> Result<(Post, Comment), DomainError> {
        let post = self
            .repos
            .posts
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation(
                "Comment cannot be empty.".to_string(),
            ));
        }

        let comment = self
            .repos
            .comments
            .insert(Comment::new(post.id, author_id, content.to_string()))
            .await?;

        tracing::debug!(post_id = %post.id, comment_id = %comment.id, "Comment posted");
        Ok((post, comment))
    }

    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeState, DomainError> {
        self.require_post(post_id).await?;

        let liked = self.repos.engagement.toggle_like(post_id, user_id).await?;
        let likes_count = self.repos.engagement.like_count(post_id).await?;
        Ok(LikeState { liked, likes_count })
    }

    /// Returns whether the post is bookmarked afterwards.
    pub async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        self.require_post(post_id).await?;
        Ok(self.repos.engagement.toggle_bookmark(post_id, user_id).await?)
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }
}
