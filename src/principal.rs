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

//! Authenticated principal passed explicitly through the call chain.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

use crate::identity::types::User;
use crate::organization::types::OrganizationMembership;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("user {user_id} is not a member of the organization {organization_id}")]
    NotMember { user_id: i32, organization_id: i32 },
}

/// Request metadata of the login handed over by the session layer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoginContext {
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
}

/// Logged in user with the organization it currently acts in.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Principal {
    user: User,
    current_organization: Option<i32>,
}

impl Principal {
    pub fn new(user: User) -> Self {
        Self {
            user,
            current_organization: None,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> i32 {
        self.user.id
    }

    /// Act within the organization. The user must be a member of it.
    pub fn with_organization(mut self, organization_id: i32) -> Result<Self, PrincipalError> {
        if self.user.role_in(organization_id).is_none() {
            return Err(PrincipalError::NotMember {
                user_id: self.user.id,
                organization_id,
            });
        }
        self.current_organization = Some(organization_id);
        Ok(self)
    }

    /// Organization the principal currently acts in, with the user role
    pub fn current_organization(&self) -> Option<&OrganizationMembership> {
        self.current_organization.and_then(|id| {
            self.user
                .organizations
                .iter()
                .find(|m| m.organization.id == id)
        })
    }

    /// Role in the current organization
    pub fn role(&self) -> Option<&str> {
        self.current_organization().map(|m| m.role.as_str())
    }
}

impl From<User> for Principal {
    fn from(value: User) -> Self {
        Self::new(value)
    }
}
