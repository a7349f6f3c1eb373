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

use thiserror::Error;

use crate::external::ExternalProviderError;
use crate::identity::IdentityProviderError;
use crate::organization::OrganizationProviderError;

/// Failures aborting the login. Everything else is absorbed by the flow.
#[derive(Error, Debug)]
pub enum FederationError {
    /// The identity payload can not be handled by any identity provider.
    #[error("unusable external identity")]
    IdentityShape {
        #[from]
        source: ExternalProviderError,
    },

    /// The user or its personal organization can not be persisted.
    #[error("storing the user failed")]
    PrimaryStoreWrite {
        #[source]
        source: IdentityProviderError,
    },

    /// The user exists but its organizations could not be synchronized. A
    /// later login retries the synchronization.
    #[error("synchronizing the user organizations failed")]
    OrgSync {
        #[source]
        source: OrganizationProviderError,
    },
}
