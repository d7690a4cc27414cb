use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AffiliateLink, ClickContext, LinkClick};
use crate::error::DomainError;
use crate::ports::AffiliateRepository;

/// Counts affiliate clicks and hands back the redirect target.
pub struct AffiliateService {
    links: Arc<dyn AffiliateRepository>,
}

impl AffiliateService {
    pub fn new(links: Arc<dyn AffiliateRepository>) -> Self {
        Self { links }
    }

    /// Resolve an active link and log the click.
    ///
    /// Unknown and inactive links are `NotFound` and leave no click behind.
    /// A failure to log the click is reported in the logs only: the caller
    /// still gets the link so the visitor is redirected.
    pub async fn follow(
        &self,
        link_id: Uuid,
        context: ClickContext,
    ) -> Result<AffiliateLink, DomainError> {
        let link = self
            .links
            .find_active_link(link_id)
            .await?
            .ok_or_else(|| DomainError::not_found("affiliate link", link_id))?;

        if let Err(e) = self.links.record_click(LinkClick::new(link.id, context)).await {
            tracing::error!(link_id = %link.id, error = %e, "Failed to record affiliate click");
        }

        Ok(link)
    }

    pub async fn active_links(&self) -> Result<Vec<AffiliateLink>, DomainError> {
        Ok(self.links.list_active_links().await?)
    }
}
