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
use chrono::Utc;
use dyn_clone::DynClone;
use openidconnect::AccessToken;
use sea_orm::DatabaseConnection;
use std::fmt;

use crate::config::Config;
use crate::downstream::DownstreamError;
use crate::identity::types::UserCreate;

/// User record duplicated into the downstream store, keyed by the login
/// handle.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MirrorRecord {
    pub login: String,
    pub email: String,
    /// Avatar URL
    pub avatar: String,
    /// OAuth token the downstream system uses to call the identity provider
    /// on behalf of the user
    pub token: String,
    /// Secret the downstream system validates user credentials with
    pub hash: String,
    pub active: bool,
    pub admin: bool,
    /// Last sync (Unix timestamp)
    pub synced: i64,
}

impl MirrorRecord {
    pub fn new(user: &UserCreate, token: &AccessToken, hash: &str) -> Self {
        Self {
            login: user.login.clone(),
            email: user.email.clone().unwrap_or_default(),
            avatar: user.image.clone().unwrap_or_default(),
            token: token.secret().clone(),
            hash: hash.to_string(),
            active: true,
            admin: true,
            synced: Utc::now().timestamp(),
        }
    }
}

impl fmt::Debug for MirrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorRecord")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("avatar", &self.avatar)
            .field("token", &"[redacted]")
            .field("hash", &"[redacted]")
            .field("active", &self.active)
            .field("admin", &self.admin)
            .field("synced", &self.synced)
            .finish()
    }
}

#[async_trait]
pub trait MirrorBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Set config
    fn set_config(&mut self, config: Config);

    /// Update or insert the record of the login. Returns the downstream
    /// record ID.
    async fn upsert_user(
        &self,
        db: &DatabaseConnection,
        record: &MirrorRecord,
    ) -> Result<i32, DownstreamError>;

    /// Get the mirrored record of the login
    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<MirrorRecord>, DownstreamError>;
}

dyn_clone::clone_trait_object!(MirrorBackend);
