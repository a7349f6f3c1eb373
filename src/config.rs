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

use config::{File, FileFormat};
use eyre::Report;
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static DRIVER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?<type>\w+)\+(\w+)://").unwrap()
});

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Primary store configuration
    #[serde(default)]
    pub database: DatabaseSection,

    /// Primary store user backend
    #[serde(default)]
    pub identity: DriverSection,

    /// Primary store organization backend
    #[serde(default)]
    pub organization: DriverSection,

    /// Downstream CI system (store and API)
    #[serde(default)]
    pub downstream: DownstreamSection,

    /// GitHub identity provider
    #[serde(default)]
    pub github: GithubSection,

    /// Login flow options
    #[serde(default)]
    pub federation: FederationSection,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct DatabaseSection {
    pub connection: String,
}

impl DatabaseSection {
    pub fn get_connection(&self) -> String {
        strip_driver(&self.connection)
    }
}

/// Strip the python style `+driver` suffix from the connection scheme.
fn strip_driver(connection: &str) -> String {
    if connection.contains("+") {
        return DRIVER_SUFFIX.replace(connection, "${type}://").to_string();
    }
    connection.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriverSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownstreamSection {
    #[serde(default = "default_sql_driver")]
    pub driver: String,

    /// Connection string of the downstream store
    #[serde(default)]
    pub connection: String,

    /// Base URL of the downstream API
    pub url: Option<Url>,

    /// Secret shared with the downstream system. Also stored as the user hash
    /// of the mirrored record.
    #[serde(default)]
    pub signing_key: String,

    /// Lifetime of the minted credentials in seconds
    #[serde(default = "default_credential_ttl")]
    pub credential_ttl: u64,

    /// Timeout of the downstream API calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_mirror_retry_attempts")]
    pub mirror_retry_attempts: u32,

    #[serde(default = "default_mirror_retry_backoff_ms")]
    pub mirror_retry_backoff_ms: u64,

    #[serde(default = "default_mirror_retry_max_backoff_ms")]
    pub mirror_retry_max_backoff_ms: u64,

    /// Mirror jobs waiting for reconciliation. Jobs above the limit are
    /// dropped until the next login of the user.
    #[serde(default = "default_mirror_queue_capacity")]
    pub mirror_queue_capacity: usize,
}

impl Default for DownstreamSection {
    fn default() -> Self {
        Self {
            driver: default_sql_driver(),
            connection: String::new(),
            url: None,
            signing_key: String::new(),
            credential_ttl: default_credential_ttl(),
            timeout: default_timeout(),
            mirror_retry_attempts: default_mirror_retry_attempts(),
            mirror_retry_backoff_ms: default_mirror_retry_backoff_ms(),
            mirror_retry_max_backoff_ms: default_mirror_retry_max_backoff_ms(),
            mirror_queue_capacity: default_mirror_queue_capacity(),
        }
    }
}

impl DownstreamSection {
    pub fn get_connection(&self) -> String {
        strip_driver(&self.connection)
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubSection {
    #[serde(default = "default_github_api_url")]
    pub api_url: Url,

    /// Timeout of the GitHub API calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            timeout: default_timeout(),
        }
    }
}

impl GithubSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FederationSection {
    /// Role given to the user in the personal organization
    #[serde(default = "default_personal_organization_role")]
    pub personal_organization_role: String,
}

impl Default for FederationSection {
    fn default() -> Self {
        Self {
            personal_organization_role: default_personal_organization_role(),
        }
    }
}

fn default_sql_driver() -> String {
    "sql".into()
}

fn default_credential_ttl() -> u64 {
    60
}

fn default_timeout() -> u64 {
    5
}

fn default_mirror_retry_attempts() -> u32 {
    5
}

fn default_mirror_retry_backoff_ms() -> u64 {
    500
}

fn default_mirror_retry_max_backoff_ms() -> u64 {
    30_000
}

fn default_mirror_queue_capacity() -> usize {
    1024
}

fn default_github_api_url() -> Url {
    #[allow(clippy::unwrap_used)]
    Url::parse("https://api.github.com").unwrap()
}

fn default_personal_organization_role() -> String {
    "admin".into()
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
