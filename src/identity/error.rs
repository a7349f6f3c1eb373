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

use crate::identity::backends::error::*;
use crate::identity::types::{UserBuilderError, UserCreateBuilderError};

#[derive(Error, Debug)]
pub enum IdentityProviderError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    #[error("user {0} not found")]
    UserNotFound(String),

    /// Conflict
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid role `{0}`")]
    InvalidRole(String),

    /// Identity database error
    #[error(transparent)]
    IdentityDatabase { source: IdentityDatabaseError },

    #[error("building user data")]
    UserBuilder {
        #[from]
        source: UserBuilderError,
    },

    #[error("building user create data")]
    UserCreateBuilder {
        #[from]
        source: UserCreateBuilderError,
    },
}

impl From<IdentityDatabaseError> for IdentityProviderError {
    fn from(source: IdentityDatabaseError) -> Self {
        match source {
            IdentityDatabaseError::UserNotFound(x) => Self::UserNotFound(x),
            IdentityDatabaseError::Conflict(x) => Self::Conflict(x),
            IdentityDatabaseError::InvalidRole(x) => Self::InvalidRole(x),
            _ => Self::IdentityDatabase { source },
        }
    }
}
