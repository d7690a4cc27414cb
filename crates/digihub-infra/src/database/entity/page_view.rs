//! Page view entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "page_views")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub user_agent: String,
    #[sea_orm(column_type = "Text")]
    pub referrer: String,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "SetNull"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for digihub_core::domain::PageView {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            url: model.url,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            referrer: model.referrer,
            timestamp: model.timestamp.into(),
        }
    }
}

impl From<digihub_core::domain::PageView> for ActiveModel {
    fn from(view: digihub_core::domain::PageView) -> Self {
        Self {
            id: Set(view.id),
            post_id: Set(view.post_id),
            url: Set(view.url),
            ip_address: Set(view.ip_address),
            user_agent: Set(view.user_agent),
            referrer: Set(view.referrer),
            timestamp: Set(view.timestamp.into()),
        }
    }
}
