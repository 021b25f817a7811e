use model::entities::{prelude::User, user};
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::entity_iden::EntityIden;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        info!("Creating USERS table if it does not exist");
        manager
            .create_table(
                Table::create()
                    .table(User::table())
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::column(user::Column::Username))
                            .string_len(user::USERNAME_MAX_LEN)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(User::column(user::Column::Password))
                            .string_len(user::PASSWORD_MAX_LEN)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::table()).to_owned())
            .await
    }
}
