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

//! User table of the downstream CI system. The table is owned and migrated by
//! the downstream system, only the columns written here are mapped.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Default)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "user_id")]
    pub id: i32,
    #[sea_orm(unique, column_name = "user_login")]
    pub login: String,
    #[sea_orm(column_name = "user_token")]
    pub token: String,
    #[sea_orm(column_name = "user_secret")]
    pub secret: String,
    #[sea_orm(column_name = "user_expiry")]
    pub expiry: i64,
    #[sea_orm(column_name = "user_email")]
    pub email: String,
    #[sea_orm(column_name = "user_avatar")]
    pub avatar: String,
    #[sea_orm(column_name = "user_active")]
    pub active: bool,
    #[sea_orm(column_name = "user_admin")]
    pub admin: bool,
    #[sea_orm(column_name = "user_hash")]
    pub hash: String,
    #[sea_orm(column_name = "user_synced")]
    pub synced: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
