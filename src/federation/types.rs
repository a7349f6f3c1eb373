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

use serde::{Deserialize, Serialize};

use crate::identity::types::User;
use crate::principal::Principal;

/// Outcome of a completed login handed back to the session layer.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProvisionedLogin {
    /// Canonical user including its organizations and roles
    pub user: User,

    /// Primary key of the user in the string form
    pub user_id: String,

    /// Whether the user was registered by this login
    pub created: bool,
}

impl ProvisionedLogin {
    pub fn principal(&self) -> Principal {
        Principal::new(self.user.clone())
    }
}
