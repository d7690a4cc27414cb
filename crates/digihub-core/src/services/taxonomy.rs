use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Category, Tag};
use crate::error::DomainError;
use crate::ports::{BaseRepository, CategoryRepository, TagRepository};

/// Input for a new category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Creates categories and tags. Slugs are fixed at creation.
pub struct TaxonomyService {
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
}

impl TaxonomyService {
    pub fn new(categories: Arc<dyn CategoryRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { categories, tags }
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Category name is required".to_string()));
        }

        let mut category = Category::new(name.to_string());
        category.slug = input.slug.unwrap_or_default().trim().to_string();
        category.description = input.description.filter(|d| !d.trim().is_empty());
        category.icon = input.icon.unwrap_or_default();
        category.prepare_for_save(Utc::now());

        if category.slug.is_empty() {
            return Err(DomainError::Validation(
                "Category name must contain a letter or digit".to_string(),
            ));
        }
        if self.categories.find_by_slug(&category.slug).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "Category slug '{}' already exists",
                category.slug
            )));
        }

        Ok(self.categories.insert(category).await?)
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Tag name is required".to_string()));
        }

        let mut tag = Tag::new(name.to_string());
        tag.prepare_for_save();

        if tag.slug.is_empty() {
            return Err(DomainError::Validation(
                "Tag name must contain a letter or digit".to_string(),
            ));
        }
        if self.tags.find_by_slug(&tag.slug).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "Tag slug '{}' already exists",
                tag.slug
            )));
        }

        Ok(self.tags.insert(tag).await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list().await?)
    }
}
