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

//! Identity federation.
//!
//! Completes the login of an externally authenticated user: provisions the
//! platform user with its personal organization, mirrors it into the
//! downstream system and imports the organizations known to the identity
//! provider together with the user roles.
//!
//! Only the primary store writes are fatal. The downstream mirror and the
//! identity provider organization listing degrade: the login succeeds with a
//! state that heals on the next login (or on the background mirror
//! reconciliation).

use openidconnect::AccessToken;
use tracing::{Span, error, info, warn};

pub mod error;
pub mod types;

use crate::downstream::DownstreamApi;
use crate::events::ProvisioningEvent;
use crate::external::ExternalIdentityProvider;
use crate::external::types::{ExternalIdentity, ExternalOrganization};
pub use crate::federation::error::FederationError;
pub use crate::federation::types::ProvisionedLogin;
use crate::identity::types::{User, UserCreate, UserProfile};
use crate::identity::{IdentityApi, IdentityProviderError};
use crate::organization::OrganizationApi;
use crate::principal::LoginContext;
use crate::service::ServiceState;

/// Provision the user of a completed external login, or refresh it when it
/// is already known, and return the canonical user.
#[tracing::instrument(
    name = "federation::login",
    level = "info",
    skip_all,
    fields(
        provider = identity.payload.provider(),
        login = tracing::field::Empty,
        remote_addr = ?ctx.remote_addr,
        request_id = ?ctx.request_id,
    )
)]
pub async fn provision_or_complete_login(
    state: &ServiceState,
    ctx: &LoginContext,
    identity: &ExternalIdentity,
    token: &AccessToken,
) -> Result<ProvisionedLogin, FederationError> {
    let idp = state
        .provider
        .get_external_providers()
        .resolve(&identity.payload)?;
    let login = idp.login(&identity.payload)?;
    Span::current().record("login", login.as_str());

    let candidate = UserCreate {
        login,
        name: identity.name.clone(),
        email: identity.email.clone(),
        image: identity.image.clone(),
        personal_organization_role: state.config.federation.personal_organization_role.clone(),
    };

    mirror_downstream(state, &candidate, token).await;
    state
        .provider
        .get_downstream_provider()
        .prewarm_repos(&candidate.login);

    let (user, created) = provision_user(state, candidate).await?;

    let external_organizations = list_external_organizations(idp.as_ref(), token).await;
    let organizations = state.provider.get_organization_provider();
    organizations
        .sync_organizations(&state.db, user.id, &external_organizations)
        .await
        .map_err(|source| {
            error!("synchronizing organizations of user {} failed: {source}", user.id);
            FederationError::OrgSync { source }
        })?;
    let memberships = organizations
        .list_user_organizations(&state.db, user.id)
        .await
        .map_err(|source| FederationError::OrgSync { source })?;

    publish(
        state,
        ProvisioningEvent::OrganizationsChanged {
            user_id: user.id,
            organization_ids: memberships.iter().map(|m| m.organization.id).collect(),
        },
    )
    .await;

    let user = User {
        organizations: memberships,
        ..user
    };
    info!(
        "login of user {} completed with {} organization(s)",
        user.id,
        user.organizations.len()
    );
    Ok(ProvisionedLogin {
        user_id: user.id_string(),
        user,
        created,
    })
}

/// Mirror the user into the downstream store. A failed attempt is queued for
/// reconciliation.
async fn mirror_downstream(state: &ServiceState, candidate: &UserCreate, token: &AccessToken) {
    let downstream = state.provider.get_downstream_provider();
    if let Err(err) = downstream.mirror_user(candidate, token).await {
        warn!("mirroring the user into the downstream store failed, queuing it: {err}");
        if let Err(err) = downstream.schedule_mirror(candidate, token) {
            warn!("queuing the downstream mirror failed: {err}");
        }
    }
}

/// Register the user with its personal organization, or refresh the profile
/// of the already registered one. Returns whether the user was created.
async fn provision_user(
    state: &ServiceState,
    candidate: UserCreate,
) -> Result<(User, bool), FederationError> {
    let identity = state.provider.get_identity_provider();
    if let Some(current) = identity
        .get_user_by_login(&state.db, &candidate.login)
        .await
        .map_err(primary_store_error)?
    {
        return Ok((refresh_profile(state, current, &candidate).await?, false));
    }

    match identity.create_user(&state.db, candidate.clone()).await {
        Ok(provisioned) => {
            info!("registered user {}", provisioned.user.id);
            publish(
                state,
                ProvisioningEvent::UserProvisioned {
                    user_id: provisioned.user.id,
                },
            )
            .await;
            publish(
                state,
                ProvisioningEvent::PersonalOrganizationCreated {
                    organization_id: provisioned.personal_organization.id,
                    name: provisioned.personal_organization.name.clone(),
                },
            )
            .await;
            Ok((provisioned.user, true))
        }
        Err(IdentityProviderError::Conflict(reason)) => {
            match identity
                .get_user_by_login(&state.db, &candidate.login)
                .await
                .map_err(primary_store_error)?
            {
                Some(current) => {
                    info!("user {} was registered concurrently: {reason}", candidate.login);
                    Ok((refresh_profile(state, current, &candidate).await?, false))
                }
                // The login is free, the personal organization name is not.
                None => Err(primary_store_error(IdentityProviderError::Conflict(reason))),
            }
        }
        Err(source) => Err(primary_store_error(source)),
    }
}

async fn refresh_profile(
    state: &ServiceState,
    current: User,
    candidate: &UserCreate,
) -> Result<User, FederationError> {
    state
        .provider
        .get_identity_provider()
        .update_profile(&state.db, current.id, UserProfile::from(candidate))
        .await
        .map_err(primary_store_error)
}

async fn list_external_organizations(
    idp: &dyn ExternalIdentityProvider,
    token: &AccessToken,
) -> Vec<ExternalOrganization> {
    match idp.list_organizations(token).await {
        Ok(organizations) => organizations,
        Err(err) => {
            warn!("listing organizations at the identity provider failed, continuing without them: {err}");
            Vec::new()
        }
    }
}

async fn publish(state: &ServiceState, event: ProvisioningEvent) {
    if let Err(err) = state.provider.get_event_sink().publish(event.clone()).await {
        warn!("publishing {event:?} failed: {err}");
    }
}

fn primary_store_error(source: IdentityProviderError) -> FederationError {
    error!("storing the user failed: {source}");
    FederationError::PrimaryStoreWrite { source }
}
