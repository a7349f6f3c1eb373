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

//! Organizations of the primary store and the import of the identity provider
//! organizations.

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use sea_orm::DatabaseConnection;

pub mod backends;
pub mod error;
pub mod types;

use crate::config::Config;
use crate::external::types::ExternalOrganization;
use crate::organization::backends::sql::SqlBackend;
pub use crate::organization::error::OrganizationProviderError;
use crate::organization::types::*;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct OrganizationProvider {
    backend_driver: Box<dyn OrganizationBackend>,
}

#[async_trait]
pub trait OrganizationApi: Send + Sync + Clone {
    async fn sync_organizations<'a>(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        organizations: &'a [ExternalOrganization],
    ) -> Result<Vec<i32>, OrganizationProviderError>;

    async fn get_organization(
        &self,
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<Organization>, OrganizationProviderError>;

    async fn list_user_organizations(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrganizationMembership>, OrganizationProviderError>;
}

#[cfg(test)]
mock! {
    pub OrganizationProvider {
        pub fn new(cfg: &Config, plugin_manager: &PluginManager) -> Result<Self, OrganizationProviderError>;
    }

    #[async_trait]
    impl OrganizationApi for OrganizationProvider {
        async fn sync_organizations<'a>(
            &self,
            db: &DatabaseConnection,
            user_id: i32,
            organizations: &'a [ExternalOrganization],
        ) -> Result<Vec<i32>, OrganizationProviderError>;

        async fn get_organization(
            &self,
            db: &DatabaseConnection,
            id: i32,
        ) -> Result<Option<Organization>, OrganizationProviderError>;

        async fn list_user_organizations(
            &self,
            db: &DatabaseConnection,
            user_id: i32,
        ) -> Result<Vec<OrganizationMembership>, OrganizationProviderError>;
    }

    impl Clone for OrganizationProvider {
        fn clone(&self) -> Self;
    }
}

impl OrganizationProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, OrganizationProviderError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_organization_backend(config.organization.driver.clone())
        {
            driver.clone()
        } else {
            match config.organization.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()),
                _ => {
                    return Err(OrganizationProviderError::UnsupportedDriver(
                        config.organization.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self { backend_driver })
    }
}

#[async_trait]
impl OrganizationApi for OrganizationProvider {
    /// Find or create the external organizations and record the user role in
    /// each of them, atomically. Safe to re-run for the same user.
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn sync_organizations<'a>(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        organizations: &'a [ExternalOrganization],
    ) -> Result<Vec<i32>, OrganizationProviderError> {
        self.backend_driver
            .sync_organizations(db, user_id, organizations)
            .await
    }

    /// Get single organization
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn get_organization(
        &self,
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<Organization>, OrganizationProviderError> {
        self.backend_driver.get_organization(db, id).await
    }

    /// List organizations of the user together with the user role
    #[tracing::instrument(level = "info", skip(self, db))]
    async fn list_user_organizations(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrganizationMembership>, OrganizationProviderError> {
        self.backend_driver.list_user_organizations(db, user_id).await
    }
}
