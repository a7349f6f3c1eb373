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
use crate::identity::IdentityProviderError;
use crate::organization::types::{Organization, OrganizationMembership};

/// Platform user.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[builder(setter(strip_option, into))]
pub struct User {
    /// User ID
    pub id: i32,

    /// Login handle at the identity provider
    pub login: String,

    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar URL
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Organizations the user is member of with the user role in each
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<OrganizationMembership>,
}

impl User {
    /// Primary key in the string form used by the session layer
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Role of the user in the organization
    pub fn role_in(&self, organization_id: i32) -> Option<&str> {
        self.organizations
            .iter()
            .find(|m| m.organization.id == organization_id)
            .map(|m| m.role.as_str())
    }
}

/// New user together with its personal organization.
#[derive(Builder, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[builder(setter(strip_option, into))]
pub struct UserCreate {
    pub login: String,

    #[builder(default)]
    pub name: Option<String>,

    #[builder(default)]
    pub email: Option<String>,

    #[builder(default)]
    pub image: Option<String>,

    /// Role of the user in its personal organization
    #[builder(default = "String::from(\"admin\")")]
    pub personal_organization_role: String,
}

/// Denormalized profile fields refreshed on every login.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl From<&UserCreate> for UserProfile {
    fn from(value: &UserCreate) -> Self {
        Self {
            name: value.name.clone(),
            email: value.email.clone(),
            image: value.image.clone(),
        }
    }
}

/// Result of the user registration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionedUser {
    pub user: User,
    pub personal_organization: Organization,
}

#[async_trait]
pub trait IdentityBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config
    fn set_config(&mut self, config: Config);

    /// Get single user by ID
    async fn get_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<User>, IdentityProviderError>;

    /// Get single user by the login handle
    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<User>, IdentityProviderError>;

    /// Create user, its personal organization and the membership in a single
    /// write
    async fn create_user(
        &self,
        db: &DatabaseConnection,
        user: UserCreate,
    ) -> Result<ProvisionedUser, IdentityProviderError>;

    /// Refresh the profile fields of the user
    async fn update_profile(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        profile: UserProfile,
    ) -> Result<User, IdentityProviderError>;
}

dyn_clone::clone_trait_object!(IdentityBackend);
