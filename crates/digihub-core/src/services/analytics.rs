//! Page-view attribution.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{ClickContext, PageView};
use crate::error::RepoError;
use crate::ports::{PageViewRepository, PostRepository};

/// Paths under these prefixes are never recorded.
pub const EXCLUDED_PREFIXES: [&str; 4] = ["/admin/", "/static/", "/media/", "/summernote/"];

/// Route namespace whose `slug` parameter names a post.
pub const BLOG_NAMESPACE: &str = "blog";

/// Whether a request path is recorded at all.
pub fn is_tracked(path: &str) -> bool {
    !EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// The route a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub namespace: String,
    pub slug: Option<String>,
}

impl RouteMatch {
    /// Build from a route name of the form `namespace:name`.
    ///
    /// Names without a `:` have an empty namespace.
    pub fn from_route_name(name: &str, slug: Option<String>) -> Self {
        let namespace = name
            .split_once(':')
            .map(|(namespace, _)| namespace)
            .unwrap_or_default();
        Self {
            namespace: namespace.to_string(),
            slug,
        }
    }

    /// Slug to look a post up by, when this route is a blog route carrying one.
    pub fn post_slug(&self) -> Option<&str> {
        if self.namespace != BLOG_NAMESPACE {
            return None;
        }
        self.slug.as_deref().filter(|slug| !slug.is_empty())
    }
}

/// Everything the recorder needs to know about one request.
#[derive(Debug, Clone)]
pub struct PageHit {
    pub path: String,
    pub url: String,
    pub route: Option<RouteMatch>,
    pub caller: ClickContext,
}

/// Appends one page view per tracked request.
pub struct PageViewRecorder {
    posts: Arc<dyn PostRepository>,
    views: Arc<dyn PageViewRepository>,
}

impl PageViewRecorder {
    pub fn new(posts: Arc<dyn PostRepository>, views: Arc<dyn PageViewRepository>) -> Self {
        Self { posts, views }
    }

    /// Record `hit` unless its path is excluded.
    ///
    /// Returns the stored view, or `None` for excluded paths. A failed post
    /// lookup only costs the attribution; the view is still stored.
    pub async fn record(&self, hit: PageHit) -> Result<Option<PageView>, RepoError> {
        if !is_tracked(&hit.path) {
            return Ok(None);
        }

        let post_id = match self.attribute(hit.route.as_ref()).await {
            Ok(post_id) => post_id,
            Err(e) => {
                tracing::warn!(
                    path = %hit.path,
                    error = %e,
                    "Post lookup failed; view left unattributed"
                );
                None
            }
        };

        let view = PageView {
            id: Uuid::new_v4(),
            post_id,
            url: hit.url,
            ip_address: hit.caller.ip_address,
            user_agent: hit.caller.user_agent,
            referrer: hit.caller.referrer,
            timestamp: Utc::now(),
        };

        self.views.record(view).await.map(Some)
    }

    async fn attribute(&self, route: Option<&RouteMatch>) -> Result<Option<Uuid>, RepoError> {
        let Some(slug) = route.and_then(RouteMatch::post_slug) else {
            return Ok(None);
        };

        let post = self.posts.find_published_by_slug(slug).await?;
        Ok(post.map(|p| p.id))
    }
}
