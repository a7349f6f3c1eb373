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

use crate::config::Config;
use crate::downstream::DownstreamError;
use crate::downstream::types::*;

mod user;

#[derive(Clone, Debug, Default)]
pub struct SqlBackend {
    pub config: Config,
}

#[async_trait]
impl MirrorBackend for SqlBackend {
    /// Set config
    fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn upsert_user(
        &self,
        db: &DatabaseConnection,
        record: &MirrorRecord,
    ) -> Result<i32, DownstreamError> {
        Ok(user::upsert(db, record).await?)
    }

    #[tracing::instrument(level = "debug", skip(self, db))]
    async fn get_user_by_login<'a>(
        &self,
        db: &DatabaseConnection,
        login: &'a str,
    ) -> Result<Option<MirrorRecord>, DownstreamError> {
        Ok(user::get_by_login(db, login)
            .await?
            .map(Into::into))
    }
}
