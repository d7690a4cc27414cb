//! One followed affiliate redirect.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "link_clicks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub link_id: Uuid,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub user_agent: String,
    #[sea_orm(column_type = "Text")]
    pub referrer: String,
    pub clicked_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::affiliate_link::Entity",
        from = "Column::LinkId",
        to = "super::affiliate_link::Column::Id",
        on_delete = "Cascade"
    )]
    Link,
}

impl Related<super::affiliate_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Link.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<digihub_core::domain::LinkClick> for ActiveModel {
    fn from(click: digihub_core::domain::LinkClick) -> Self {
        Self {
            id: Set(click.id),
            link_id: Set(click.link_id),
            ip_address: Set(click.ip_address),
            user_agent: Set(click.user_agent),
            referrer: Set(click.referrer),
            clicked_at: Set(click.clicked_at.into()),
        }
    }
}
