//! Affiliate link entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "affiliate_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub program_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub title: String,
    pub category: String,
    pub is_active: bool,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::affiliate_program::Entity",
        from = "Column::ProgramId",
        to = "super::affiliate_program::Column::Id",
        on_delete = "Cascade"
    )]
    Program,
    #[sea_orm(has_many = "super::link_click::Entity")]
    Click,
}

impl Related<super::affiliate_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::link_click::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Click.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for digihub_core::domain::AffiliateLink {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            program_id: model.program_id,
            url: model.url,
            title: model.title,
            category: model.category,
            is_active: model.is_active,
            click_count: model.click_count,
            last_clicked_at: model.last_clicked_at.map(Into::into),
        }
    }
}
