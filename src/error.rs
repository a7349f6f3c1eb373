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

use sea_orm::DbErr;
use thiserror::Error;

use crate::downstream::DownstreamError;
use crate::external::ExternalProviderError;
use crate::identity::IdentityProviderError;
use crate::organization::OrganizationProviderError;
use crate::provider::ProviderBuilderError;

/// Errors raised while assembling the service.
#[derive(Error, Debug)]
pub enum PipelineAuthError {
    #[error(transparent)]
    Identity {
        #[from]
        source: IdentityProviderError,
    },

    #[error(transparent)]
    Organization {
        #[from]
        source: OrganizationProviderError,
    },

    #[error(transparent)]
    Downstream {
        #[from]
        source: DownstreamError,
    },

    #[error(transparent)]
    External {
        #[from]
        source: ExternalProviderError,
    },

    #[error("database connection")]
    Database {
        #[from]
        source: DbErr,
    },

    #[error(transparent)]
    ProviderBuilder {
        #[from]
        source: ProviderBuilderError,
    },
}
