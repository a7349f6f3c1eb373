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

//! External identity providers.
//!
//! The session layer hands over the identity asserted by the provider the user
//! logged in with. The provider is selected by the tag of the identity payload
//! and is responsible for extracting the login handle and for listing the
//! organizations of the user together with the user role in each of them.

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use openidconnect::AccessToken;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub mod error;
pub mod github;
pub mod types;

use crate::config::Config;
pub use crate::external::error::ExternalProviderError;
use crate::external::github::GithubProvider;
use crate::external::types::*;
use crate::plugin_manager::PluginManager;

#[async_trait]
pub trait ExternalIdentityProvider: Send + Sync + Debug {
    /// Name the provider is registered under
    fn name(&self) -> &str;

    /// Extract the login handle from the identity payload.
    fn login(&self, payload: &ProviderPayload) -> Result<String, ExternalProviderError>;

    /// List organizations the token owner is member of.
    async fn list_organizations(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ExternalOrganization>, ExternalProviderError>;
}

#[cfg(test)]
mock! {
    #[derive(Debug)]
    pub Idp {}

    #[async_trait]
    impl ExternalIdentityProvider for Idp {
        fn name(&self) -> &str;

        fn login(&self, payload: &ProviderPayload) -> Result<String, ExternalProviderError>;

        async fn list_organizations(
            &self,
            token: &AccessToken,
        ) -> Result<Vec<ExternalOrganization>, ExternalProviderError>;
    }
}

/// Registry of the identity providers keyed by the provider name.
#[derive(Clone, Debug, Default)]
pub struct ExternalProviders {
    providers: HashMap<String, Arc<dyn ExternalIdentityProvider>>,
}

impl ExternalProviders {
    /// Registry with the built-in GitHub provider and the providers passed
    /// through the plugin manager. Plugins take precedence over the built-in
    /// provider of the same name.
    pub fn new(
        config: &Config,
        plugin_manager: &PluginManager,
    ) -> Result<Self, ExternalProviderError> {
        let mut registry = Self::default();
        let github = GithubProvider::from_config(config)?;
        registry.register(github.name().to_string(), Arc::new(github));
        for (name, provider) in plugin_manager.get_external_providers() {
            registry.register(name, provider.clone());
        }
        Ok(registry)
    }

    pub fn register<S: Into<String>>(
        &mut self,
        name: S,
        provider: Arc<dyn ExternalIdentityProvider>,
    ) {
        self.providers.insert(name.into(), provider);
    }

    /// Provider responsible for the identity payload
    pub fn resolve(
        &self,
        payload: &ProviderPayload,
    ) -> Result<Arc<dyn ExternalIdentityProvider>, ExternalProviderError> {
        self.providers
            .get(payload.provider())
            .cloned()
            .ok_or_else(|| ExternalProviderError::UnsupportedProvider(payload.provider().into()))
    }
}
