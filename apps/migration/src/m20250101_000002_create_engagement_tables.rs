use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Likes and bookmarks: one row per (post, user)
        for table in [Reactions::PostLikes, Reactions::Bookmarks] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reactions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Reactions::PostId).uuid().not_null())
                        .col(ColumnDef::new(Reactions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_post_id", table.to_string()))
                                .from(table, Reactions::PostId)
                                .to(Posts::Table, Posts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_user_id", table.to_string()))
                                .from(table, Reactions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("uq_{}_post_user", table.to_string()))
                        .table(table)
                        .col(Reactions::PostId)
                        .col(Reactions::UserId)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // 2. Newsletter subscriptions
        manager
            .create_table(
                Table::create()
                    .table(NewsletterSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsletterSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscriptions::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscriptions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscriptions::SubscribedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. Categories a subscriber follows
        manager
            .create_table(
                Table::create()
                    .table(NewsletterSubscriptionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsletterSubscriptionCategories::SubscriptionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscriptionCategories::CategoryId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(NewsletterSubscriptionCategories::SubscriptionId)
                            .col(NewsletterSubscriptionCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_newsletter_categories_subscription_id")
                            .from(
                                NewsletterSubscriptionCategories::Table,
                                NewsletterSubscriptionCategories::SubscriptionId,
                            )
                            .to(NewsletterSubscriptions::Table, NewsletterSubscriptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_newsletter_categories_category_id")
                            .from(
                                NewsletterSubscriptionCategories::Table,
                                NewsletterSubscriptionCategories::CategoryId,
                            )
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsletterSubscriptionCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NewsletterSubscriptions::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Reactions::Bookmarks).to_owned()).await?;
        manager.drop_table(Table::drop().table(Reactions::PostLikes).to_owned()).await?;
        Ok(())
    }
}

/// Columns shared by `post_likes` and `bookmarks`.
#[derive(Iden, Clone, Copy)]
enum Reactions {
    PostLikes,
    Bookmarks,
    Id,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum NewsletterSubscriptions {
    Table,
    Id,
    Email,
    IsActive,
    SubscribedAt,
}

#[derive(Iden)]
enum NewsletterSubscriptionCategories {
    Table,
    SubscriptionId,
    CategoryId,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}
