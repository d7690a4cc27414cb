//! Affiliate program entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "affiliate_programs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub company: String,
    pub commission_rate: Option<f64>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::affiliate_link::Entity")]
    Link,
}

impl Related<super::affiliate_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Link.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for digihub_core::domain::AffiliateProgram {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            company: model.company,
            commission_rate: model.commission_rate,
            is_active: model.is_active,
        }
    }
}
