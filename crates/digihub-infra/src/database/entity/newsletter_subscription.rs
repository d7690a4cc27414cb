//! Newsletter subscription entity for SeaORM.
//!
//! Followed categories live in `newsletter_subscription_categories`; the
//! domain conversion leaves `category_ids` empty and the repository fills it.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletter_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::newsletter_category::Entity")]
    Categories,
}

impl Related<super::newsletter_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for digihub_core::domain::NewsletterSubscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            category_ids: Vec::new(),
            is_active: model.is_active,
            subscribed_at: model.subscribed_at.into(),
        }
    }
}

impl From<digihub_core::domain::NewsletterSubscription> for ActiveModel {
    fn from(sub: digihub_core::domain::NewsletterSubscription) -> Self {
        Self {
            id: Set(sub.id),
            email: Set(sub.email),
            is_active: Set(sub.is_active),
            subscribed_at: Set(sub.subscribed_at.into()),
        }
    }
}
