// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(date_time(Users::CreatedAt))
                    .col(date_time(Users::UpdatedAt))
                    .col(string_len_null(Users::Name, 255))
                    .col(string_len_null(Users::Email, 255))
                    .col(string_len_uniq(Users::Login, 255))
                    .col(string_len_null(Users::Image, 255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(pk_auto(Organizations::Id))
                    // Unique but nullable: only provider sourced organizations carry it
                    .col(big_integer_null(Organizations::GithubId).unique_key())
                    .col(date_time(Organizations::CreatedAt))
                    .col(date_time(Organizations::UpdatedAt))
                    .col(string_len_uniq(Organizations::Name, 255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserOrganizations::Table)
                    .if_not_exists()
                    .col(integer(UserOrganizations::UserId))
                    .col(integer(UserOrganizations::OrganizationId))
                    .col(string_len(UserOrganizations::Role, 64).default("admin"))
                    .primary_key(
                        Index::create()
                            .col(UserOrganizations::UserId)
                            .col(UserOrganizations::OrganizationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-organizations-user")
                            .from(UserOrganizations::Table, UserOrganizations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-organizations-organization")
                            .from(UserOrganizations::Table, UserOrganizations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserOrganizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Name,
    Email,
    Login,
    Image,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    GithubId,
    CreatedAt,
    UpdatedAt,
    Name,
}

#[derive(DeriveIden)]
enum UserOrganizations {
    Table,
    UserId,
    OrganizationId,
    Role,
}
