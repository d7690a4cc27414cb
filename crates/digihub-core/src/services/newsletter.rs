use std::sync::Arc;

use crate::domain::NewsletterSubscription;
use crate::error::DomainError;
use crate::ports::{BaseRepository, CategoryRepository, NewsletterRepository};

/// What a subscribe request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Reactivated,
    AlreadyActive,
}

impl SubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Created => "Successfully subscribed to our newsletter!",
            SubscribeOutcome::Reactivated => "Welcome back! Your subscription has been reactivated.",
            SubscribeOutcome::AlreadyActive => "This email is already subscribed to our newsletter.",
        }
    }
}

pub struct NewsletterService {
    subscriptions: Arc<dyn NewsletterRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl NewsletterService {
    pub fn new(
        subscriptions: Arc<dyn NewsletterRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            subscriptions,
            categories,
        }
    }

    /// Subscribe `email`, reactivating a lapsed subscription.
    ///
    /// An unknown `category_slug` is logged and otherwise ignored.
    pub async fn subscribe(
        &self,
        email: &str,
        category_slug: Option<&str>,
    ) -> Result<SubscribeOutcome, DomainError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DomainError::Validation("Email is required.".to_string()));
        }
        if !is_valid_email(email) {
            return Err(DomainError::Validation(
                "Please enter a valid email address.".to_string(),
            ));
        }

        let (subscription, outcome) = match self.subscriptions.find_by_email(email).await? {
            None => {
                let created = self
                    .subscriptions
                    .insert(NewsletterSubscription::new(email.to_string()))
                    .await?;
                (created, SubscribeOutcome::Created)
            }
            Some(mut existing) if !existing.is_active => {
                existing.is_active = true;
                let updated = self.subscriptions.update(existing).await?;
                (updated, SubscribeOutcome::Reactivated)
            }
            Some(existing) => (existing, SubscribeOutcome::AlreadyActive),
        };

        if let Some(slug) = category_slug.map(str::trim).filter(|s| !s.is_empty()) {
            match self.categories.find_by_slug(slug).await? {
                Some(category) => {
                    self.subscriptions
                        .add_category(subscription.id, category.id)
                        .await?
                }
                None => tracing::warn!(
                    category = %slug,
                    "Category not found for newsletter subscription"
                ),
            }
        }

        Ok(outcome)
    }
}

/// Loose shape check: one `@`, a non-empty local part, a dotted domain and
/// no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
