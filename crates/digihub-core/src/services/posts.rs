//! Post persistence pipeline and read models.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, PostStatus, Tag};
use crate::error::DomainError;
use crate::ports::{
    BaseRepository, CategoryTotals, FEATURED_IMAGE_BOUNDS, ImageResizer, Page, PostQuery,
    PostSort, ResizeOutcome,
};

use super::Repositories;

/// Page size of every post listing.
pub const POSTS_PER_PAGE: u64 = 6;

const RELATED_POSTS: u64 = 3;
const POPULAR_ON_DETAIL: u64 = 5;
const RELATED_CATEGORIES: usize = 5;
const MIN_SEARCH_LEN: usize = 2;

/// Author-supplied fields of a new post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    /// Defaults to published.
    pub status: Option<PostStatus>,
    pub featured_image: Option<String>,
    pub is_featured: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

/// Query-string filters of a category listing.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: PostSort,
    pub page: u64,
}

/// Everything shown on a post page.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub category: Category,
    pub tags: Vec<Tag>,
    pub related: Vec<Post>,
    pub popular: Vec<Post>,
    pub comments: Vec<Comment>,
    pub like_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub posts: Page<Post>,
    pub totals: CategoryTotals,
    pub related_categories: Vec<Category>,
}

pub struct PostService {
    repos: Repositories,
    images: Arc<dyn ImageResizer>,
}

impl PostService {
    pub fn new(repos: Repositories, images: Arc<dyn ImageResizer>) -> Self {
        Self { repos, images }
    }

    /// Persist a post, deriving slug, excerpt and publish time first.
    ///
    /// A derived slug that is already taken gets a numeric suffix; an
    /// explicit slug that is taken is rejected. After the write, an attached
    /// featured image is shrunk to fit 800x600. Resize failures are logged
    /// and do not fail the save.
    pub async fn save(&self, mut post: Post) -> Result<Post, DomainError> {
        let derive_slug = post.slug.is_empty();
        post.prepare_for_save(Utc::now());

        if post.slug.is_empty() {
            return Err(DomainError::Validation(
                "Post title must contain a letter or digit".to_string(),
            ));
        }

        if derive_slug {
            post.slug = self.unique_slug(&post.slug, post.id).await?;
        } else if let Some(other) = self.repos.posts.find_by_slug(&post.slug).await? {
            if other.id != post.id {
                return Err(DomainError::Duplicate(format!(
                    "Post slug '{}' already exists",
                    post.slug
                )));
            }
        }

        let saved = match self.repos.posts.find_by_id(post.id).await? {
            Some(_) => self.repos.posts.update(post).await?,
            None => self.repos.posts.insert(post).await?,
        };

        if let Some(path) = saved.featured_image.as_deref() {
            self.resize_featured_image(saved.id, path).await;
        }

        Ok(saved)
    }

    /// Create a post for `author_id` and attach its tags.
    pub async fn create(&self, author_id: Uuid, input: NewPost) -> Result<Post, DomainError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(DomainError::Validation("Content is required".to_string()));
        }
        if self
            .repos
            .categories
            .find_by_id(input.category_id)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found("category", input.category_id));
        }

        let mut tag_ids = input.tag_ids;
        let mut seen = HashSet::new();
        tag_ids.retain(|id| seen.insert(*id));

        let tags = self.repos.tags.find_by_ids(&tag_ids).await?;
        if tags.len() != tag_ids.len() {
            return Err(DomainError::Validation(
                "One or more tags do not exist".to_string(),
            ));
        }

        let mut post = Post::new(author_id, input.category_id, title, input.content);
        post.slug = input.slug.unwrap_or_default().trim().to_string();
        post.excerpt = input.excerpt.unwrap_or_default().trim().to_string();
        post.status = input.status.unwrap_or(PostStatus::Published);
        post.featured_image = input.featured_image.filter(|p| !p.is_empty());
        post.is_featured = input.is_featured;
        post.meta_description = input.meta_description.unwrap_or_default();
        post.meta_keywords = input.meta_keywords.unwrap_or_default();

        let saved = self.save(post).await?;
        if !tag_ids.is_empty() {
            self.repos.posts.set_tags(saved.id, &tag_ids).await?;
        }

        tracing::debug!(post_id = %saved.id, slug = %saved.slug, status = %saved.status, "Post created");
        Ok(saved)
    }

    /// Load a published post page and count the view.
    pub async fn detail(&self, category_slug: &str, slug: &str) -> Result<PostDetail, DomainError> {
        let not_found = || DomainError::not_found("post", format!("{}/{}", category_slug, slug));

        let category = self
            .repos
            .categories
            .find_by_slug(category_slug)
            .await?
            .ok_or_else(not_found)?;
        let mut post = self
            .repos
            .posts
            .find_published_by_slug(slug)
            .await?
            .filter(|p| p.category_id == category.id)
            .ok_or_else(not_found)?;

        self.repos.posts.increment_views(post.id).await?;
        post.views += 1;

        let tag_ids = self.repos.posts.tag_ids(post.id).await?;
        let tags = self.repos.tags.find_by_ids(&tag_ids).await?;
        let related = self.repos.posts.related(&post, RELATED_POSTS).await?;
        let popular = self.repos.posts.popular(POPULAR_ON_DETAIL).await?;
        let comments = self.repos.comments.approved_for_post(post.id).await?;
        let like_count = self.repos.engagement.like_count(post.id).await?;

        Ok(PostDetail {
            post,
            category,
            tags,
            related,
            popular,
            comments,
            like_count,
        })
    }

    /// Newest published posts.
    pub async fn latest(&self, page: u64) -> Result<Page<Post>, DomainError> {
        let query = PostQuery {
            page: page.max(1),
            per_page: POSTS_PER_PAGE,
            ..Default::default()
        };
        Ok(self.repos.posts.list_published(&query).await?)
    }

    pub async fn by_category(
        &self,
        slug: &str,
        filter: ListingFilter,
    ) -> Result<CategoryListing, DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let query = PostQuery {
            category_id: Some(category.id),
            tag_slug: filter.tag.filter(|t| !t.trim().is_empty()),
            search: filter.search.filter(|s| !s.trim().is_empty()),
            sort: filter.sort,
            page: filter.page.max(1),
            per_page: POSTS_PER_PAGE,
        };
        let posts = self.repos.posts.list_published(&query).await?;
        let totals = self.repos.posts.category_totals(category.id).await?;
        let related_categories = self
            .repos
            .categories
            .list()
            .await?
            .into_iter()
            .filter(|c| c.slug != category.slug)
            .take(RELATED_CATEGORIES)
            .collect();

        Ok(CategoryListing {
            category,
            posts,
            totals,
            related_categories,
        })
    }

    pub async fn by_tag(&self, slug: &str, page: u64) -> Result<(Tag, Page<Post>), DomainError> {
        let tag = self
            .repos
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("tag", slug))?;

        let query = PostQuery {
            tag_slug: Some(tag.slug.clone()),
            page: page.max(1),
            per_page: POSTS_PER_PAGE,
            ..Default::default()
        };
        let posts = self.repos.posts.list_published(&query).await?;
        Ok((tag, posts))
    }

    /// Full-text-ish search. Terms shorter than two characters match nothing.
    pub async fn search(&self, term: &str, page: u64) -> Result<Page<Post>, DomainError> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            return Ok(Page::empty(1, POSTS_PER_PAGE));
        }
        Ok(self.repos.posts.search(term, page, POSTS_PER_PAGE).await?)
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<Post>, DomainError> {
        Ok(self.repos.posts.popular(limit).await?)
    }

    async fn unique_slug(&self, base: &str, post_id: Uuid) -> Result<String, DomainError> {
        let mut candidate = base.to_string();
        let mut suffix = 2;

        while let Some(other) = self.repos.posts.find_by_slug(&candidate).await? {
            if other.id == post_id {
                break;
            }
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        Ok(candidate)
    }

    async fn resize_featured_image(&self, post_id: Uuid, path: &str) {
        match self.images.fit_within(path, FEATURED_IMAGE_BOUNDS).await {
            Ok(ResizeOutcome::Resized { width, height }) => {
                tracing::debug!(post_id = %post_id, width, height, "Featured image resized");
            }
            Ok(ResizeOutcome::Unchanged) => {}
            Err(e) => {
                tracing::warn!(post_id = %post_id, path = %path, error = %e, "Featured image resize skipped");
            }
        }
    }
}
