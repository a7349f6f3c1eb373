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

use std::collections::HashMap;
use std::sync::Arc;

use crate::downstream::types::MirrorBackend;
use crate::external::ExternalIdentityProvider;
use crate::identity::types::IdentityBackend;
use crate::organization::types::OrganizationBackend;

/// Plugin manager allowing to pass custom backend plugins and identity
/// providers implementing required trait during the service start
#[derive(Clone, Debug, Default)]
pub struct PluginManager {
    /// Identity backend plugins
    identity_backends: HashMap<String, Box<dyn IdentityBackend>>,
    /// Organization backend plugins
    organization_backends: HashMap<String, Box<dyn OrganizationBackend>>,
    /// Downstream mirror backend plugins
    mirror_backends: HashMap<String, Box<dyn MirrorBackend>>,
    /// Additional identity providers
    external_providers: HashMap<String, Arc<dyn ExternalIdentityProvider>>,
}

impl PluginManager {
    /// Register identity backend
    pub fn register_identity_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn IdentityBackend>,
    ) {
        self.identity_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered identity backend
    #[allow(clippy::borrowed_box)]
    pub fn get_identity_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn IdentityBackend>> {
        self.identity_backends.get(name.as_ref())
    }

    /// Register organization backend
    pub fn register_organization_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn OrganizationBackend>,
    ) {
        self.organization_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered organization backend
    #[allow(clippy::borrowed_box)]
    pub fn get_organization_backend<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Option<&Box<dyn OrganizationBackend>> {
        self.organization_backends.get(name.as_ref())
    }

    /// Register downstream mirror backend
    pub fn register_mirror_backend<S: AsRef<str>>(
        &mut self,
        name: S,
        plugin: Box<dyn MirrorBackend>,
    ) {
        self.mirror_backends
            .insert(name.as_ref().to_string(), plugin);
    }

    /// Get registered downstream mirror backend
    #[allow(clippy::borrowed_box)]
    pub fn get_mirror_backend<S: AsRef<str>>(&self, name: S) -> Option<&Box<dyn MirrorBackend>> {
        self.mirror_backends.get(name.as_ref())
    }

    /// Register identity provider. The name must match the provider tag of
    /// the identity payloads it handles.
    pub fn register_external_provider<S: AsRef<str>>(
        &mut self,
        name: S,
        provider: Arc<dyn ExternalIdentityProvider>,
    ) {
        self.external_providers
            .insert(name.as_ref().to_string(), provider);
    }

    /// Iterate over registered identity providers
    pub fn get_external_providers(
        &self,
    ) -> impl Iterator<Item = (&String, &Arc<dyn ExternalIdentityProvider>)> {
        self.external_providers.iter()
    }
}
