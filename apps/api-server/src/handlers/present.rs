//! Domain to wire conversions.

use std::collections::HashMap;

use digihub_core::domain::{AffiliateLink, Category, Comment, Post, Tag};
use digihub_core::ports::Page;
use digihub_shared::Paginated;
use digihub_shared::dto::{
    AffiliateLinkResponse, CategoryResponse, CommentResponse, PostSummary, TagResponse,
};
use uuid::Uuid;

/// Category slugs by id, for building post URLs.
pub struct CategorySlugs(HashMap<Uuid, String>);

impl CategorySlugs {
    pub fn new(categories: &[Category]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.id, c.slug.clone()))
                .collect(),
        )
    }

    pub fn get(&self, id: Uuid) -> &str {
        self.0.get(&id).map(String::as_str).unwrap_or_default()
    }
}

pub fn post_url(category_slug: &str, slug: &str) -> String {
    format!("/post/{}/{}/", category_slug, slug)
}

pub fn affiliate_redirect_url(link_id: Uuid) -> String {
    format!("/affiliate/go/{}/", link_id)
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        description: category.description.clone(),
        icon: category.icon.clone(),
    }
}

pub fn tag(tag: &Tag) -> TagResponse {
    TagResponse {
        id: tag.id,
        name: tag.name.clone(),
        slug: tag.slug.clone(),
    }
}

pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        author_id: comment.author_id,
        content: comment.content.clone(),
        created_at: comment.created_at,
    }
}

pub fn post_summary(post: &Post, category_slug: &str) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        category_slug: category_slug.to_string(),
        excerpt: post.excerpt.clone(),
        featured_image: post.featured_image.clone(),
        is_featured: post.is_featured,
        views: post.views,
        author_id: post.author_id,
        published_at: post.published_at.unwrap_or(post.created_at),
        url: post_url(category_slug, &post.slug),
    }
}

pub fn summaries(posts: &[Post], slugs: &CategorySlugs) -> Vec<PostSummary> {
    posts
        .iter()
        .map(|p| post_summary(p, slugs.get(p.category_id)))
        .collect()
}

pub fn paginated(page: Page<Post>, slugs: &CategorySlugs) -> Paginated<PostSummary> {
    let total_pages = page.total_pages();
    Paginated {
        items: summaries(&page.items, slugs),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages,
    }
}

pub fn affiliate_link(link: &AffiliateLink) -> AffiliateLinkResponse {
    AffiliateLinkResponse {
        id: link.id,
        title: link.title.clone(),
        category: link.category.clone(),
        click_count: link.click_count,
        redirect_url: affiliate_redirect_url(link.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_links_to_category_scoped_url() {
        let category = Category::new("Web Hosting".to_string());
        let mut post = Post::new(
            Uuid::new_v4(),
            category.id,
            "Best Hosts".to_string(),
            "Body".to_string(),
        );
        post.slug = "best-hosts".to_string();

        let slugs = CategorySlugs::new(&[Category {
            slug: "web-hosting".to_string(),
            ..category
        }]);
        let summary = post_summary(&post, slugs.get(post.category_id));

        assert_eq!(summary.url, "/post/web-hosting/best-hosts/");
        assert_eq!(summary.published_at, post.created_at);
    }

    #[test]
    fn test_unknown_category_has_empty_slug() {
        let slugs = CategorySlugs::new(&[]);
        assert_eq!(slugs.get(Uuid::new_v4()), "");
    }
}
