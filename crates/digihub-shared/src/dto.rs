//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// `draft`, `published` or `archived`; published when omitted.
    #[serde(default)]
    pub status: Option<String>,
    /// Path relative to the media root of an already uploaded image.
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Option<String>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
    /// Slug of a category to follow.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Post as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub category_slug: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub is_featured: bool,
    pub views: i64,
    pub author_id: Uuid,
    /// Publish time, or creation time for posts never published.
    pub published_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Full post page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub status: String,
    pub featured_image: Option<String>,
    pub views: i64,
    pub meta_description: String,
    pub meta_keywords: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: CategoryResponse,
    pub tags: Vec<TagResponse>,
    pub like_count: u64,
    pub comment_count: usize,
    pub comments: Vec<CommentResponse>,
    pub related_posts: Vec<PostSummary>,
    pub popular_posts: Vec<PostSummary>,
}

/// Landing page: newest posts and a handful of categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeResponse {
    pub latest_posts: crate::Paginated<PostSummary>,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub posts: crate::Paginated<PostSummary>,
    pub total_articles: u64,
    pub total_views: i64,
    pub related_categories: Vec<CategoryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPostsResponse {
    pub tag: TagResponse,
    pub posts: crate::Paginated<PostSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: u64,
    pub posts: crate::Paginated<PostSummary>,
}

/// Popular-posts payload: `{ "success": true, "posts": [...], "count": n }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularPostsResponse {
    pub success: bool,
    pub posts: Vec<PostSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkResponse {
    pub success: bool,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateLinkResponse {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub click_count: i64,
    /// Tracked redirect path; following it counts the click.
    pub redirect_url: String,
}
