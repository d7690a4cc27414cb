use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AffiliateLink, Category, Comment, LinkClick, NewsletterSubscription, PageView, Post, Tag, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// One page of a larger result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// Page number clamped to `1..=last page`. An empty result set has one
/// (empty) page.
pub fn clamp_page(page: u64, total: u64, per_page: u64) -> u64 {
    let last = total.div_ceil(per_page.max(1)).max(1);
    page.clamp(1, last)
}

impl<T> Page<T> {
    pub fn empty(page: u64, per_page: u64) -> Self {
        Self {
            items: Vec::new(),
            page,
            per_page,
            total: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Ordering for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Newest publish date first.
    #[default]
    Latest,
    Oldest,
    Title,
    /// Most viewed first, newest first among equals.
    Popular,
}

impl PostSort {
    /// Parse a query-string value; unknown values fall back to `Latest`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "oldest" => PostSort::Oldest,
            "title" => PostSort::Title,
            "popular" => PostSort::Popular,
            _ => PostSort::Latest,
        }
    }
}

/// Filter for listings of published posts.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub category_id: Option<Uuid>,
    pub tag_slug: Option<String>,
    /// Case-insensitive match on title, excerpt or content.
    pub search: Option<String>,
    pub sort: PostSort,
    pub page: u64,
    pub per_page: u64,
}

/// Aggregates over the published posts of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub articles: u64,
    pub views: i64,
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Find a post by slug regardless of status.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;

    /// Published posts whose title, content, excerpt or tag names contain `term`.
    async fn search(&self, term: &str, page: u64, per_page: u64)
    -> Result<Page<Post>, RepoError>;

    /// Published posts ordered by views, then publish date.
    async fn popular(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Other published posts of the same category, newest first.
    async fn related(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn category_totals(&self, category_id: Uuid) -> Result<CategoryTotals, RepoError>;

    /// Add one to the view counter in a single statement.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;

    /// Replace the tag set of a post.
    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;

    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Approved comments of a post, newest first.
    async fn approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Likes and bookmarks.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Add the like when absent, remove it when present. Returns whether the
    /// post is liked afterwards.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn like_count(&self, post_id: Uuid) -> Result<u64, RepoError>;

    /// Same contract as [`EngagementRepository::toggle_like`].
    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait NewsletterRepository: BaseRepository<NewsletterSubscription, Uuid> {
    async fn find_by_email(&self, email: &str)
    -> Result<Option<NewsletterSubscription>, RepoError>;

    /// Attach a category; attaching one twice is a no-op.
    async fn add_category(&self, subscription_id: Uuid, category_id: Uuid)
    -> Result<(), RepoError>;
}

/// Append-only page-view log.
#[async_trait]
pub trait PageViewRepository: Send + Sync {
    async fn record(&self, view: PageView) -> Result<PageView, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait AffiliateRepository: Send + Sync {
    async fn find_active_link(&self, id: Uuid) -> Result<Option<AffiliateLink>, RepoError>;

    async fn list_active_links(&self) -> Result<Vec<AffiliateLink>, RepoError>;

    /// Append the click and bump the link's counter and last-click time as
    /// one unit.
    async fn record_click(&self, click: LinkClick) -> Result<(), RepoError>;

    async fn click_count(&self, link_id: Uuid) -> Result<u64, RepoError>;
}
