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

//! Bundle of the components the login flow works with.

use derive_builder::Builder;
use mockall_double::double;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
#[double]
use crate::downstream::DownstreamProvider;
use crate::downstream::reconcile::MirrorQueue;
use crate::error::PipelineAuthError;
use crate::events::EventSink;
use crate::external::ExternalProviders;
#[double]
use crate::identity::IdentityProvider;
#[double]
use crate::organization::OrganizationProvider;
use crate::plugin_manager::PluginManager;

#[derive(Builder, Clone)]
#[builder(pattern = "owned")]
pub struct Provider {
    pub config: Config,
    downstream: DownstreamProvider,
    events: Arc<dyn EventSink>,
    external: ExternalProviders,
    identity: IdentityProvider,
    organization: OrganizationProvider,
}

impl Provider {
    pub fn new(
        cfg: Config,
        plugin_manager: PluginManager,
        mirror_db: Arc<DatabaseConnection>,
        mirror_queue: MirrorQueue,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, PipelineAuthError> {
        let downstream = DownstreamProvider::new(&cfg, &plugin_manager, mirror_db, mirror_queue)?;
        let external = ExternalProviders::new(&cfg, &plugin_manager)?;
        let identity = IdentityProvider::new(&cfg, &plugin_manager)?;
        let organization = OrganizationProvider::new(&cfg, &plugin_manager)?;

        Ok(Self {
            config: cfg,
            downstream,
            events,
            external,
            identity,
            organization,
        })
    }

    pub fn builder() -> ProviderBuilder {
        ProviderBuilder::default()
    }

    /// Builder pre-populated with mocks without expectations
    #[cfg(test)]
    pub fn mocked_builder() -> ProviderBuilder {
        ProviderBuilder::default()
            .config(Config::default())
            .downstream(DownstreamProvider::default())
            .events(Arc::new(crate::events::MockEventSink::new()))
            .external(ExternalProviders::default())
            .identity(IdentityProvider::default())
            .organization(OrganizationProvider::default())
    }

    pub fn get_downstream_provider(&self) -> &DownstreamProvider {
        &self.downstream
    }

    pub fn get_event_sink(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    pub fn get_external_providers(&self) -> &ExternalProviders {
        &self.external
    }

    pub fn get_identity_provider(&self) -> &IdentityProvider {
        &self.identity
    }

    pub fn get_organization_provider(&self) -> &OrganizationProvider {
        &self.organization
    }
}
