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

//! Client of the downstream system API.

use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::credential::{self, DRONE_USER_TOKEN_TYPE};
use crate::downstream::DownstreamError;

#[derive(Clone)]
pub struct DroneClient {
    client: reqwest::Client,
    url: Option<Url>,
    signing_key: String,
    credential_ttl: Duration,
}

impl fmt::Debug for DroneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DroneClient")
            .field("url", &self.url)
            .field("credential_ttl", &self.credential_ttl)
            .finish_non_exhaustive()
    }
}

impl DroneClient {
    pub fn new(config: &Config) -> Result<Self, DownstreamError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(config.downstream.timeout())
                .build()?,
            url: config.downstream.url.clone(),
            signing_key: config.downstream.signing_key.clone(),
            credential_ttl: config.downstream.credential_ttl(),
        })
    }

    /// Whether the downstream API location is known
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    fn repos_url(&self) -> Result<Url, DownstreamError> {
        let mut url = self
            .url
            .clone()
            .ok_or(DownstreamError::NotConfigured("url"))?;
        url.path_segments_mut()
            .map_err(|_| DownstreamError::NotConfigured("url"))?
            .pop_if_empty()
            .extend(["api", "user", "repos"]);
        url.query_pairs_mut()
            .append_pair("all", "true")
            .append_pair("flush", "true");
        Ok(url)
    }

    /// Ask the downstream system to refresh the repository list of the user.
    /// The response body is discarded.
    pub async fn refresh_repos(&self, login: &str) -> Result<(), DownstreamError> {
        let url = self.repos_url()?;
        let token = credential::mint(
            DRONE_USER_TOKEN_TYPE,
            login,
            &self.signing_key,
            self.credential_ttl,
        )?;
        let rsp = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;
        debug!("downstream repositories refreshed with status {}", rsp.status());
        Ok(())
    }
}
