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

use crate::organization::backends::error::*;
use crate::organization::types::OrganizationBuilderError;

#[derive(Error, Debug)]
pub enum OrganizationProviderError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    #[error("organization {0} not found")]
    OrganizationNotFound(String),

    /// Conflict
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid role `{0}`")]
    InvalidRole(String),

    /// Organization database error
    #[error(transparent)]
    OrganizationDatabase { source: OrganizationDatabaseError },

    #[error("building organization data")]
    OrganizationBuilder {
        #[from]
        source: OrganizationBuilderError,
    },
}

impl From<OrganizationDatabaseError> for OrganizationProviderError {
    fn from(source: OrganizationDatabaseError) -> Self {
        match source {
            OrganizationDatabaseError::OrganizationNotFound(x) => Self::OrganizationNotFound(x),
            OrganizationDatabaseError::Conflict(x) => Self::Conflict(x),
            OrganizationDatabaseError::InvalidRole(x) => Self::InvalidRole(x),
            _ => Self::OrganizationDatabase { source },
        }
    }
}
