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

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::super::types::*;
use crate::config::Config;
use crate::identity::IdentityProviderError;

mod user;

#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    pub config: Config,
}

impl SqlBackend {}

#[async_trait]
impl IdentityBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Get single user by ID
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn get_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<User>, IdentityProviderError> {
        Ok(user::get(&self.config, db, user_id).await?)
    }

    /// Get single user by login
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<User>, IdentityProviderError> {
        Ok(user::get_by_login(&self.config, db, login).await?)
    }

    /// Create user with the personal organization
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn create_user(
        &self,
        db: &DatabaseConnection,
        user: UserCreate,
    ) -> Result<ProvisionedUser, IdentityProviderError> {
        Ok(user::create(&self.config, db, &user).await?)
    }

    /// Refresh user profile
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn update_profile(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        profile: UserProfile,
    ) -> Result<User, IdentityProviderError> {
        Ok(user::update_profile(&self.config, db, user_id, profile).await?)
    }
}
