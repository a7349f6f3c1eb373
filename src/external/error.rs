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

#[derive(Error, Debug)]
pub enum ExternalProviderError {
    /// No provider is registered for the identity payload
    #[error("unsupported identity provider {0}")]
    UnsupportedProvider(String),

    /// Payload is not of the shape the provider expects
    #[error("malformed {provider} identity: {reason}")]
    IdentityShape { provider: String, reason: String },

    /// Provider API can not be used
    #[error("identity provider is unavailable")]
    Unavailable {
        #[from]
        source: reqwest::Error,
    },

    #[error("invalid provider url {0}")]
    Url(String),
}
