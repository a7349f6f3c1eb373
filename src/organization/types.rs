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
use derive_builder::Builder;
use dyn_clone::DynClone;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::external::types::ExternalOrganization;
use crate::organization::error::OrganizationProviderError;

/// Longest role value accepted for a membership.
pub const MAX_ROLE_LENGTH: usize = 64;

/// Tenant boundary of the platform.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[builder(setter(strip_option, into))]
pub struct Organization {
    /// Organization ID
    pub id: i32,

    /// Identity of the organization at the identity provider. Unset for
    /// organizations that only exist on the platform (personal ones).
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<i64>,

    /// Unique name
    pub name: String,
}

impl Organization {
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Whether the organization was imported from the identity provider.
    pub fn is_external(&self) -> bool {
        self.external_id.is_some()
    }
}

/// Organization together with the role the user holds in it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OrganizationMembership {
    pub organization: Organization,
    pub role: String,
}

/// A role is stored as given by the provider, it only needs to be a
/// non-empty, bounded value.
pub fn is_valid_role<R: AsRef<str>>(role: R) -> bool {
    let role = role.as_ref();
    !role.trim().is_empty() && role.len() <= MAX_ROLE_LENGTH
}

/// Order memberships with the personal organization(s) first and the rest by
/// ID.
pub(crate) fn sort_memberships(memberships: &mut [OrganizationMembership]) {
    memberships.sort_by_key(|m| (m.organization.is_external(), m.organization.id));
}

#[async_trait]
pub trait OrganizationBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config
    fn set_config(&mut self, config: Config);

    /// Find or create the organizations, attach the user and set its role in
    /// every one of them as a single transaction.
    async fn sync_organizations<'a>(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        organizations: &'a [ExternalOrganization],
    ) -> Result<Vec<i32>, OrganizationProviderError>;

    /// Get single organization by ID
    async fn get_organization(
        &self,
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<Organization>, OrganizationProviderError>;

    /// List organizations of the user with the user role
    async fn list_user_organizations(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<OrganizationMembership>, OrganizationProviderError>;
}

dyn_clone::clone_trait_object!(OrganizationBackend);
