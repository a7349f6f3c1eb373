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
use serde_json::Value;

/// Identity asserted by the session layer once the OAuth login completed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ExternalIdentity {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Avatar URL
    #[serde(default)]
    pub image: Option<String>,

    /// Provider specific part of the identity
    pub payload: ProviderPayload,
}

/// Raw identity payload tagged with the provider that issued it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPayload {
    Github(GithubIdentity),
    /// Payload of a provider without built-in support. It is handled by the
    /// provider registered under the same name.
    Unknown { provider: String, claims: Value },
}

impl ProviderPayload {
    /// Name of the provider the payload originates from
    pub fn provider(&self) -> &str {
        match self {
            Self::Github(_) => GITHUB_PROVIDER,
            Self::Unknown { provider, .. } => provider,
        }
    }
}

pub const GITHUB_PROVIDER: &str = "github";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GithubIdentity {
    pub login: String,

    #[serde(default)]
    pub id: Option<i64>,
}

/// Organization the user belongs to at the identity provider, with the user
/// role in it as reported by the provider.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExternalOrganization {
    pub external_id: i64,
    pub name: String,
    pub role: String,
}
