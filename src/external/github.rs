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

//! GitHub identity provider.

use async_trait::async_trait;
use openidconnect::AccessToken;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::external::ExternalIdentityProvider;
use crate::external::error::ExternalProviderError;
use crate::external::types::*;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const MEMBERSHIPS_PAGE_SIZE: &str = "100";

#[derive(Clone, Debug)]
pub struct GithubProvider {
    client: reqwest::Client,
    api_url: Url,
}

#[derive(Debug, Deserialize)]
struct GithubMembership {
    role: String,
    organization: GithubOrganization,
}

#[derive(Debug, Deserialize)]
struct GithubOrganization {
    id: i64,
    login: String,
}

impl From<GithubMembership> for ExternalOrganization {
    fn from(value: GithubMembership) -> Self {
        Self {
            external_id: value.organization.id,
            name: value.organization.login,
            role: value.role,
        }
    }
}

impl GithubProvider {
    pub fn new(api_url: Url, timeout: Duration) -> Result<Self, ExternalProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(env!("CARGO_PKG_NAME"))
            .build()?;
        Ok(Self { client, api_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ExternalProviderError> {
        Self::new(config.github.api_url.clone(), config.github.timeout())
    }

    fn memberships_url(&self) -> Result<Url, ExternalProviderError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ExternalProviderError::Url(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(["user", "memberships", "orgs"]);
        url.query_pairs_mut()
            .append_pair("state", "active")
            .append_pair("per_page", MEMBERSHIPS_PAGE_SIZE);
        Ok(url)
    }
}

#[async_trait]
impl ExternalIdentityProvider for GithubProvider {
    fn name(&self) -> &str {
        GITHUB_PROVIDER
    }

    fn login(&self, payload: &ProviderPayload) -> Result<String, ExternalProviderError> {
        match payload {
            ProviderPayload::Github(identity) if !identity.login.trim().is_empty() => {
                Ok(identity.login.clone())
            }
            ProviderPayload::Github(_) => Err(ExternalProviderError::IdentityShape {
                provider: GITHUB_PROVIDER.into(),
                reason: "login is empty".into(),
            }),
            other => Err(ExternalProviderError::IdentityShape {
                provider: GITHUB_PROVIDER.into(),
                reason: format!("payload issued by {}", other.provider()),
            }),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, token))]
    async fn list_organizations(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ExternalOrganization>, ExternalProviderError> {
        let memberships: Vec<GithubMembership> = self
            .client
            .get(self.memberships_url()?)
            .bearer_auth(token.secret())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, env!("CARGO_PKG_NAME"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("user is member of {} GitHub organizations", memberships.len());

        Ok(memberships.into_iter().map(Into::into).collect())
    }
}
