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

//! Users of the primary store.

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

pub mod backends;
pub mod error;
pub mod types;

use crate::config::Config;
use crate::identity::backends::sql::SqlBackend;
pub use crate::identity::error::IdentityProviderError;
use crate::identity::types::*;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct IdentityProvider {
    backend_driver: Box<dyn IdentityBackend>,
}

#[async_trait]
pub trait IdentityApi: Send + Sync + Clone {
    async fn get_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<User>, IdentityProviderError>;

    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<User>, IdentityProviderError>;

    async fn get_user_login(&self, db: &DatabaseConnection, user_id: i32) -> Option<String>;

    async fn create_user(
        &self,
        db: &DatabaseConnection,
        user: UserCreate,
    ) -> Result<ProvisionedUser, IdentityProviderError>;

    async fn update_profile(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        profile: UserProfile,
    ) -> Result<User, IdentityProviderError>;
}

#[cfg(test)]
mock! {
    pub IdentityProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, IdentityProviderError>;
    }

    #[async_trait]
    impl IdentityApi for IdentityProvider {
        async fn get_user(
            &self,
            db: &DatabaseConnection,
            user_id: i32,
        ) -> Result<Option<User>, IdentityProviderError>;

        async fn get_user_by_login<'a>(
            &self,
            db: &DatabaseConnection,
            login: &'a str,
        ) -> Result<Option<User>, IdentityProviderError>;

        async fn get_user_login(&self, db: &DatabaseConnection, user_id: i32) -> Option<String>;

        async fn create_user(
            &self,
            db: &DatabaseConnection,
            user: UserCreate,
        ) -> Result<ProvisionedUser, IdentityProviderError>;

        async fn update_profile(
            &self,
            db: &DatabaseConnection,
            user_id: i32,
            profile: UserProfile,
        ) -> Result<User, IdentityProviderError>;
    }

    impl Clone for IdentityProvider {
        fn clone(&self) -> Self;
    }
}

impl IdentityProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, IdentityProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_identity_backend(config.identity.driver.clone())
        {
            driver.clone()
        } else {
            match config.identity.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()),
                _ => {
                    return Err(IdentityProviderError::UnsupportedDriver(
                        config.identity.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self { backend_driver })
    }
}

#[async_trait]
impl IdentityApi for IdentityProvider {
    /// Get single user
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn get_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<User>, IdentityProviderError> {
        self.backend_driver.get_user(db, user_id).await
    }

    /// Get single user by the login handle
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<User>, IdentityProviderError> {
        self.backend_driver.get_user_by_login(db, login).await
    }

    /// Login handle of the user, `None` when it can not be resolved
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn get_user_login(&self, db: &DatabaseConnection, user_id: i32) -> Option<String> {
        info!("looking up login of user {user_id}");
        match self.backend_driver.get_user(db, user_id).await {
            Ok(user) => user.map(|x| x.login),
            Err(err) => {
                warn!("error during getting the user login: {err}");
                None
            }
        }
    }

    /// Register user with the personal organization
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn create_user(
        &self,
        db: &DatabaseConnection,
        user: UserCreate,
    ) -> Result<ProvisionedUser, IdentityProviderError> {
        self.backend_driver.create_user(db, user).await
    }

    /// Refresh the denormalized profile fields
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn update_profile(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        profile: UserProfile,
    ) -> Result<User, IdentityProviderError> {
        self.backend_driver
            .update_profile(db, user_id, profile)
            .await
    }
}
