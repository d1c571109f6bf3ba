//! Indexes backing the period summary query.
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_subscriptions::Subscriptions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_user_start")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .col(Subscriptions::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_service_name")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::ServiceName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_subscriptions_service_name").table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscriptions_user_start").table(Subscriptions::Table).to_owned())
            .await
    }
}
