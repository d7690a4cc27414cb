use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Page views (append-only; survive post deletion)
        manager
            .create_table(
                Table::create()
                    .table(PageViews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PageViews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PageViews::PostId).uuid().null())
                    .col(ColumnDef::new(PageViews::Url).text().not_null())
                    .col(ColumnDef::new(PageViews::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(PageViews::UserAgent).text().not_null().default(""))
                    .col(ColumnDef::new(PageViews::Referrer).text().not_null().default(""))
                    .col(
                        ColumnDef::new(PageViews::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_page_views_post_id")
                            .from(PageViews::Table, PageViews::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_page_views_timestamp")
                    .table(PageViews::Table)
                    .col(PageViews::Timestamp)
                    .to_owned(),
            )
            .await?;

        // 2. Affiliate programs
        manager
            .create_table(
                Table::create()
                    .table(AffiliatePrograms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AffiliatePrograms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AffiliatePrograms::Name).string_len(100).not_null())
                    .col(ColumnDef::new(AffiliatePrograms::Company).string_len(100).not_null())
                    .col(ColumnDef::new(AffiliatePrograms::CommissionRate).double().null())
                    .col(
                        ColumnDef::new(AffiliatePrograms::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Affiliate links
        manager
            .create_table(
                Table::create()
                    .table(AffiliateLinks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AffiliateLinks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AffiliateLinks::ProgramId).uuid().not_null())
                    .col(ColumnDef::new(AffiliateLinks::Url).text().not_null())
                    .col(ColumnDef::new(AffiliateLinks::Title).string_len(200).not_null())
                    .col(ColumnDef::new(AffiliateLinks::Category).string_len(50).not_null())
                    .col(ColumnDef::new(AffiliateLinks::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(AffiliateLinks::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AffiliateLinks::LastClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_links_program_id")
                            .from(AffiliateLinks::Table, AffiliateLinks::ProgramId)
                            .to(AffiliatePrograms::Table, AffiliatePrograms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 4. Click log
        manager
            .create_table(
                Table::create()
                    .table(LinkClicks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LinkClicks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LinkClicks::LinkId).uuid().not_null())
                    .col(ColumnDef::new(LinkClicks::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(LinkClicks::UserAgent).text().not_null().default(""))
                    .col(ColumnDef::new(LinkClicks::Referrer).text().not_null().default(""))
                    .col(
                        ColumnDef::new(LinkClicks::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_clicks_link_id")
                            .from(LinkClicks::Table, LinkClicks::LinkId)
                            .to(AffiliateLinks::Table, AffiliateLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LinkClicks::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AffiliateLinks::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AffiliatePrograms::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(PageViews::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
enum PageViews {
    Table,
    Id,
    PostId,
    Url,
    IpAddress,
    UserAgent,
    Referrer,
    Timestamp,
}

#[derive(Iden)]
enum AffiliatePrograms {
    Table,
    Id,
    Name,
    Company,
    CommissionRate,
    IsActive,
}

#[derive(Iden)]
enum AffiliateLinks {
    Table,
    Id,
    ProgramId,
    Url,
    Title,
    Category,
    IsActive,
    ClickCount,
    LastClickedAt,
}

#[derive(Iden)]
enum LinkClicks {
    Table,
    Id,
    LinkId,
    IpAddress,
    UserAgent,
    Referrer,
    ClickedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
}
