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

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::downstream::reconcile::{MirrorQueue, MirrorReconciler};
use crate::error::PipelineAuthError;
use crate::events::EventSink;
use crate::plugin_manager::PluginManager;
use crate::provider::Provider;

/// State shared by the login handlers of the session layer.
pub struct Service {
    pub config: Config,
    pub provider: Provider,
    /// Primary store
    pub db: DatabaseConnection,
}

pub type ServiceState = Arc<Service>;

impl Service {
    pub fn new(cfg: Config, db: DatabaseConnection, provider: Provider) -> Self {
        Self {
            config: cfg,
            provider,
            db,
        }
    }

    /// Connect both stores configured in `cfg` and start the service.
    pub async fn connect(
        cfg: Config,
        plugin_manager: PluginManager,
        events: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Result<(ServiceState, JoinHandle<()>), PipelineAuthError> {
        info!("connecting to the primary store");
        let db = Database::connect(ConnectOptions::new(cfg.database.get_connection())).await?;
        info!("connecting to the downstream store");
        let mirror_db =
            Database::connect(ConnectOptions::new(cfg.downstream.get_connection())).await?;
        let mirror_db = Arc::new(mirror_db);
        Self::start(cfg, plugin_manager, db, mirror_db, events, cancel)
    }

    /// Assemble the service on top of established connections and spawn the
    /// downstream mirror reconciler. The reconciler runs until `cancel` is
    /// triggered.
    pub fn start(
        cfg: Config,
        plugin_manager: PluginManager,
        db: DatabaseConnection,
        mirror_db: Arc<DatabaseConnection>,
        events: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Result<(ServiceState, JoinHandle<()>), PipelineAuthError> {
        let (queue, jobs) = MirrorQueue::from_config(&cfg);
        let provider = Provider::new(cfg.clone(), plugin_manager, mirror_db, queue, events)?;
        let reconciler = tokio::spawn(
            MirrorReconciler::new(
                &cfg,
                provider.get_downstream_provider().clone(),
                jobs,
                cancel,
            )
            .run(),
        );

        Ok((Arc::new(Self::new(cfg, db, provider)), reconciler))
    }

    pub async fn terminate(&self) -> Result<(), PipelineAuthError> {
        info!("terminating the identity federation service");
        Ok(())
    }
}
