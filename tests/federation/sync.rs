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
//! Organization import against a real (SQLite) primary store.

use sea_orm::DatabaseConnection;

use pipeline_auth::config::Config;
use pipeline_auth::external::types::ExternalOrganization;
use pipeline_auth::identity::types::UserCreateBuilder;
use pipeline_auth::identity::{IdentityApi, IdentityProvider};
use pipeline_auth::organization::{
    OrganizationApi, OrganizationProvider, OrganizationProviderError,
};
use pipeline_auth::plugin_manager::PluginManager;

use crate::common::*;

fn external(external_id: i64, name: &str, role: &str) -> ExternalOrganization {
    ExternalOrganization {
        external_id,
        name: name.into(),
        role: role.into(),
    }
}

fn organization_provider() -> OrganizationProvider {
    OrganizationProvider::new(&Config::default(), &PluginManager::default()).unwrap()
}

async fn register(db: &DatabaseConnection, login: &str) -> i32 {
    IdentityProvider::new(&Config::default(), &PluginManager::default())
        .unwrap()
        .create_user(db, UserCreateBuilder::default().login(login).build().unwrap())
        .await
        .unwrap()
        .user
        .id
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let stores = setup_stores(false).await;
    let user_id = register(&stores.db, "bob").await;
    let provider = organization_provider();
    let organizations = vec![
        external(7, "acme", "member"),
        external(8, "widgets", "admin"),
    ];

    let first = provider
        .sync_organizations(&stores.db, user_id, &organizations)
        .await
        .unwrap();
    let second = provider
        .sync_organizations(&stores.db, user_id, &organizations)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(2, first.len());

    for external_id in [7, 8] {
        assert_eq!(
            1,
            organizations_with_external_id(&stores.db, external_id)
                .await
                .len()
        );
    }
    // personal organization and both imported ones
    assert_eq!(3, memberships_of(&stores.db, user_id).await.len());

    // Role is overwritten, never duplicated
    provider
        .sync_organizations(
            &stores.db,
            user_id,
            &[external(7, "acme", "admin"), external(8, "widgets", "admin")],
        )
        .await
        .unwrap();
    let memberships = memberships_of(&stores.db, user_id).await;
    assert_eq!(3, memberships.len());
    let acme = &organizations_with_external_id(&stores.db, 7).await[0];
    assert_eq!(
        Some("admin"),
        memberships
            .iter()
            .find(|m| m.organization_id == acme.id)
            .map(|m| m.role.as_str())
    );
}

#[tokio::test]
async fn test_sync_follows_rename() {
    let stores = setup_stores(false).await;
    let user_id = register(&stores.db, "bob").await;
    let provider = organization_provider();

    provider
        .sync_organizations(&stores.db, user_id, &[external(7, "acme", "member")])
        .await
        .unwrap();
    provider
        .sync_organizations(&stores.db, user_id, &[external(7, "acme-corp", "member")])
        .await
        .unwrap();

    let organizations = organizations_with_external_id(&stores.db, 7).await;
    assert_eq!(1, organizations.len());
    assert_eq!("acme-corp", organizations[0].name);
}

#[tokio::test]
async fn test_sync_is_atomic() {
    let stores = setup_stores(false).await;
    let user_id = register(&stores.db, "bob").await;
    let provider = organization_provider();
    let organizations = vec![
        external(1, "one", "member"),
        external(2, "two", "member"),
        // the membership of the third organization can not be written
        external(3, "three", ""),
        external(4, "four", "member"),
        external(5, "five", "member"),
    ];

    let res = provider
        .sync_organizations(&stores.db, user_id, &organizations)
        .await;
    assert!(matches!(res, Err(OrganizationProviderError::InvalidRole(_))));

    for external_id in 1..=5 {
        assert!(
            organizations_with_external_id(&stores.db, external_id)
                .await
                .is_empty()
        );
    }
    // Only the personal organization is left
    assert_eq!(1, memberships_of(&stores.db, user_id).await.len());

    // The user is not blocked from a later, valid, import
    provider
        .sync_organizations(&stores.db, user_id, &[external(3, "three", "member")])
        .await
        .unwrap();
    assert_eq!(2, memberships_of(&stores.db, user_id).await.len());
}

#[tokio::test]
async fn test_sync_name_taken_rolls_back() {
    let stores = setup_stores(false).await;
    let user_id = register(&stores.db, "bob").await;
    let provider = organization_provider();
    // "bob" is the personal organization of the user
    let organizations = vec![external(1, "one", "member"), external(99, "bob", "member")];

    let res = provider
        .sync_organizations(&stores.db, user_id, &organizations)
        .await;
    match res {
        Err(OrganizationProviderError::Conflict(msg)) => assert!(msg.contains("bob")),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(organizations_with_external_id(&stores.db, 1).await.is_empty());
    assert!(organizations_with_external_id(&stores.db, 99).await.is_empty());
    assert_eq!(1, memberships_of(&stores.db, user_id).await.len());

    let ids = provider
        .sync_organizations(&stores.db, user_id, &[external(1, "one", "member")])
        .await
        .unwrap();
    assert_eq!(1, ids.len());
    assert_eq!(ids[0], organizations_with_external_id(&stores.db, 1).await[0].id);
    assert_eq!(2, memberships_of(&stores.db, user_id).await.len());
}

#[tokio::test]
async fn test_concurrent_sync_single_organization() {
    let stores = setup_stores(false).await;
    let alice = register(&stores.db, "alice").await;
    let carol = register(&stores.db, "carol").await;
    let provider = organization_provider();
    let for_alice = [external(42, "shared", "member")];
    let for_carol = [external(42, "shared", "admin")];

    let (a, c) = tokio::join!(
        provider.sync_organizations(&stores.db, alice, &for_alice),
        provider.sync_organizations(&stores.db, carol, &for_carol),
    );
    let a = a.unwrap();
    let c = c.unwrap();
    assert_eq!(a, c);

    let organizations = organizations_with_external_id(&stores.db, 42).await;
    assert_eq!(1, organizations.len());
    let shared = organizations[0].id;
    assert!(
        memberships_of(&stores.db, alice)
            .await
            .iter()
            .any(|m| m.organization_id == shared && m.role == "member")
    );
    assert!(
        memberships_of(&stores.db, carol)
            .await
            .iter()
            .any(|m| m.organization_id == shared && m.role == "admin")
    );
}

#[tokio::test]
async fn test_list_user_organizations_personal_first() {
    let stores = setup_stores(false).await;
    let user_id = register(&stores.db, "bob").await;
    let provider = organization_provider();
    provider
        .sync_organizations(&stores.db, user_id, &[external(7, "acme", "member")])
        .await
        .unwrap();

    let memberships = provider
        .list_user_organizations(&stores.db, user_id)
        .await
        .unwrap();
    assert_eq!(
        vec![("bob", None, "admin"), ("acme", Some(7), "member")],
        memberships
            .iter()
            .map(|m| (
                m.organization.name.as_str(),
                m.organization.external_id,
                m.role.as_str()
            ))
            .collect::<Vec<_>>()
    );

    let acme = provider
        .get_organization(&stores.db, memberships[1].organization.id)
        .await
        .unwrap()
        .unwrap();
    assert!(acme.is_external());
}
