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

//! Scoped credentials for the downstream CI system.
//!
//! The credential is a HS256 signed JWT binding a purpose and a subject (the
//! login handle). The downstream system validates it with the secret shared
//! out of band, without calling back into the primary store. Every credential
//! carries an explicit short expiry.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;

pub use crate::credential::error::CredentialError;

/// Purpose of the credential authenticating API calls on behalf of a user.
pub const DRONE_USER_TOKEN_TYPE: &str = "user";

/// Claims understood by the downstream system.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DroneClaims {
    #[serde(rename = "type")]
    pub purpose: String,

    #[serde(rename = "text")]
    pub subject: String,

    /// Issued-at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl DroneClaims {
    pub fn new<P, S>(purpose: P, subject: S, issued_at: i64, ttl: Duration) -> Self
    where
        P: Into<String>,
        S: Into<String>,
    {
        Self {
            purpose: purpose.into(),
            subject: subject.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}

/// Mint a credential for the purpose and subject valid for `ttl`.
pub fn mint(
    purpose: &str,
    subject: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, CredentialError> {
    sign(
        &DroneClaims::new(purpose, subject, Utc::now().timestamp(), ttl),
        secret,
    )
}

/// Sign arbitrary claims.
pub fn sign(claims: &DroneClaims, secret: &str) -> Result<String, CredentialError> {
    if secret.is_empty() {
        return Err(CredentialError::MissingSecret);
    }
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|source| CredentialError::Encode { source })
}

/// Verify signature and expiry of the credential and return its claims.
pub fn validate(token: &str, secret: &str) -> Result<DroneClaims, CredentialError> {
    if secret.is_empty() {
        return Err(CredentialError::MissingSecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat"]);

    jsonwebtoken::decode::<DroneClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CredentialError::Expired,
        _ => CredentialError::Invalid(e.to_string()),
    })
}
