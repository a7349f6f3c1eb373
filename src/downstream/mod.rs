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

//! Downstream CI system: the user mirror in its store and its API.
//!
//! Both are advisory. Failures are reported to the caller which decides to
//! log them or to queue the mirror write for reconciliation.

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use openidconnect::AccessToken;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

pub mod api;
pub mod backends;
pub mod error;
pub mod reconcile;
pub mod types;

use crate::config::Config;
use crate::downstream::api::DroneClient;
use crate::downstream::backends::sql::SqlBackend;
pub use crate::downstream::error::DownstreamError;
use crate::downstream::reconcile::MirrorQueue;
use crate::downstream::types::*;
use crate::identity::types::UserCreate;
use crate::plugin_manager::PluginManager;

#[derive(Clone, Debug)]
pub struct DownstreamProvider {
    backend_driver: Box<dyn MirrorBackend>,
    /// Downstream store
    db: Arc<DatabaseConnection>,
    api: DroneClient,
    queue: MirrorQueue,
    signing_key: String,
}

#[async_trait]
pub trait DownstreamApi: Send + Sync + Clone {
    /// Mirror the user into the downstream store.
    async fn mirror_user(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError>;

    /// Write the prepared mirror record.
    async fn upsert_record(&self, record: &MirrorRecord) -> Result<(), DownstreamError>;

    async fn get_mirrored_user<'a>(
        &self,
        login: &'a str,
    ) -> Result<Option<MirrorRecord>, DownstreamError>;

    /// Hand the mirror write of the user over to the reconciler.
    fn schedule_mirror(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError>;

    /// Refresh the repository list of the user in the downstream system in
    /// the background. Failures are logged only.
    fn prewarm_repos(&self, login: &str);

    /// Refresh the repository list of the user and wait for the outcome.
    async fn refresh_repos<'a>(&self, login: &'a str) -> Result<(), DownstreamError>;
}

#[cfg(test)]
mock! {
    pub DownstreamProvider {
        pub fn new(
            cfg: &Config,
            plugin_manager: &PluginManager,
            db: Arc<DatabaseConnection>,
            queue: MirrorQueue,
        ) -> Result<Self, DownstreamError>;
    }

    #[async_trait]
    impl DownstreamApi for DownstreamProvider {
        async fn mirror_user(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError>;

        async fn upsert_record(&self, record: &MirrorRecord) -> Result<(), DownstreamError>;

        async fn get_mirrored_user<'a>(
            &self,
            login: &'a str,
        ) -> Result<Option<MirrorRecord>, DownstreamError>;

        fn schedule_mirror(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError>;

        fn prewarm_repos(&self, login: &str);

        async fn refresh_repos<'a>(&self, login: &'a str) -> Result<(), DownstreamError>;
    }

    impl Clone for DownstreamProvider {
        fn clone(&self) -> Self;
    }
}

impl DownstreamProvider {
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
        db: Arc<DatabaseConnection>,
        queue: MirrorQueue,
    ) -> Result<Self, DownstreamError> {
        let mut backend_driver = if let Some(driver) =
            plugin_manager.get_mirror_backend(config.downstream.driver.clone())
        {
            driver.clone()
        } else {
            match config.downstream.driver.as_str() {
                "sql" => Box::new(SqlBackend::default()),
                _ => {
                    return Err(DownstreamError::UnsupportedDriver(
                        config.downstream.driver.clone(),
                    ));
                }
            }
        };
        backend_driver.set_config(config.clone());
        Ok(Self {
            backend_driver,
            db,
            api: DroneClient::new(config)?,
            queue,
            signing_key: config.downstream.signing_key.clone(),
        })
    }
}

#[async_trait]
impl DownstreamApi for DownstreamProvider {
    #[tracing::instrument(level = "info", skip(self, user, token), fields(login = %user.login))]
    async fn mirror_user(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError> {
        self.upsert_record(&MirrorRecord::new(user, token, &self.signing_key))
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn upsert_record(&self, record: &MirrorRecord) -> Result<(), DownstreamError> {
        let id = self.backend_driver.upsert_user(self.db.as_ref(), record).await?;
        debug!("user {} mirrored as {id}", record.login);
        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn get_mirrored_user<'a>(
        &self,
        login: &'a str,
    ) -> Result<Option<MirrorRecord>, DownstreamError> {
        self.backend_driver.get_user_by_login(self.db.as_ref(), login).await
    }

    #[tracing::instrument(level = "info", skip(self, user, token), fields(login = %user.login))]
    fn schedule_mirror(&self, user: &UserCreate, token: &AccessToken) -> Result<(), DownstreamError> {
        self.queue
            .push(MirrorRecord::new(user, token, &self.signing_key))
    }

    fn prewarm_repos(&self, login: &str) {
        if !self.api.is_configured() {
            debug!("downstream url is not configured, skipping repository refresh");
            return;
        }
        let api = self.api.clone();
        let login = login.to_string();
        let span = info_span!("prewarm_repos", login = %login);
        tokio::spawn(
            async move {
                if let Err(err) = api.refresh_repos(&login).await {
                    warn!("downstream repository refresh failed: {err}");
                }
            }
            .instrument(span),
        );
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn refresh_repos<'a>(&self, login: &'a str) -> Result<(), DownstreamError> {
        self.api.refresh_repos(login).await
    }
}
