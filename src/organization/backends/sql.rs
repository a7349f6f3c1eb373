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
use crate::external::types::ExternalOrganization;
use crate::organization::OrganizationProviderError;

mod organization;
mod sync;

#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    pub config: Config,
}

impl SqlBackend {}

#[async_trait]
impl OrganizationBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Mirror external organizations of the user
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn sync_organizations<'a>(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        organizations: &'a [ExternalOrganization],
    ) -> Result<Vec<i32>, OrganizationProviderError> {
        Ok(sync::sync(&self.config, db, user_id, organizations).await?)
    }

    /// Get single organization by ID
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn get_organization(
        &self,
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<Organization>, OrganizationProviderError> {
        Ok(organization::get(&self.config, db, id).await?)
    }

    /// List organizations of the user
    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn list_user_organizations(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrganizationMembership>, OrganizationProviderError> {
        Ok(organization::list_for_user(&self.config, db, user_id).await?)
    }
}
