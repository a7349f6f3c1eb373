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
//! Complete logins against SQLite stores and mocked GitHub and Drone APIs.

use openidconnect::AccessToken;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pipeline_auth::config::Config;
use pipeline_auth::events::{ChannelEventSink, ProvisioningEvent};
use pipeline_auth::external::types::{ExternalIdentity, GithubIdentity, ProviderPayload};
use pipeline_auth::federation::{FederationError, ProvisionedLogin, provision_or_complete_login};
use pipeline_auth::plugin_manager::PluginManager;
use pipeline_auth::principal::LoginContext;
use pipeline_auth::service::{Service, ServiceState};

use crate::common::*;

struct Harness {
    state: ServiceState,
    events: UnboundedReceiver<ProvisioningEvent>,
    cancel: CancellationToken,
    reconciler: JoinHandle<()>,
    mirror_db: Arc<DatabaseConnection>,
    _dir: TempDir,
}

impl Harness {
    async fn start(config: Config, stores: TestStores) -> Self {
        let TestStores { db, mirror_db, dir } = stores;
        let (sink, events) = ChannelEventSink::new();
        let cancel = CancellationToken::new();
        let (state, reconciler) = Service::start(
            config,
            PluginManager::default(),
            db,
            mirror_db.clone(),
            Arc::new(sink),
            cancel.clone(),
        )
        .unwrap();
        Self {
            state,
            events,
            cancel,
            reconciler,
            mirror_db,
            _dir: dir,
        }
    }

    async fn login(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<ProvisionedLogin, FederationError> {
        provision_or_complete_login(
            &self.state,
            &LoginContext {
                remote_addr: Some("127.0.0.1:50000".parse().unwrap()),
                request_id: Some("req-1".into()),
            },
            identity,
            &AccessToken::new("T".into()),
        )
        .await
    }

    fn published(&mut self) -> Vec<ProvisioningEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.reconciler.await.unwrap();
    }
}

fn github_identity(login: &str, image: Option<&str>) -> ExternalIdentity {
    ExternalIdentity {
        name: None,
        email: Some(format!("{login}@example.com")),
        image: image.map(Into::into),
        payload: ProviderPayload::Github(GithubIdentity {
            login: login.into(),
            id: None,
        }),
    }
}

async fn github_with_memberships(memberships: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/memberships/orgs"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(memberships))
        .mount(&server)
        .await;
    server
}

async fn drone() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    server
}

async fn wait_for_requests(server: &MockServer, count: usize) -> bool {
    for _ in 0..100 {
        if server
            .received_requests()
            .await
            .is_some_and(|requests| requests.len() >= count)
        {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_login_end_to_end() {
    let github = github_with_memberships(json!([{
        "state": "active",
        "role": "member",
        "organization": {"login": "acme", "id": 7}
    }]))
    .await;
    let drone = drone().await;
    let mut harness = Harness::start(
        get_config(&github.uri(), Some(&drone.uri())),
        setup_stores(true).await,
    )
    .await;

    let login = harness.login(&github_identity("bob", None)).await.unwrap();

    assert!(login.created);
    assert_eq!("bob", login.user.login);
    assert_eq!(login.user.id.to_string(), login.user_id);
    assert_eq!(
        vec![("bob", None, "admin"), ("acme", Some(7), "member")],
        login
            .user
            .organizations
            .iter()
            .map(|m| (
                m.organization.name.as_str(),
                m.organization.external_id,
                m.role.as_str()
            ))
            .collect::<Vec<_>>()
    );

    let mirrored = mirrored_users(&harness.mirror_db, "bob").await;
    assert_eq!(1, mirrored.len());
    assert_eq!("T", mirrored[0].token);
    assert_eq!("drone-secret", mirrored[0].hash);
    assert!(mirrored[0].active && mirrored[0].admin);

    let personal = login.user.organizations[0].organization.id;
    let acme = login.user.organizations[1].organization.id;
    assert_eq!(
        vec![
            ProvisioningEvent::UserProvisioned {
                user_id: login.user.id
            },
            ProvisioningEvent::PersonalOrganizationCreated {
                organization_id: personal,
                name: "bob".into()
            },
            ProvisioningEvent::OrganizationsChanged {
                user_id: login.user.id,
                organization_ids: vec![personal, acme]
            },
        ],
        harness.published()
    );

    assert!(wait_for_requests(&drone, 1).await);
    harness.stop().await;
}

#[tokio::test]
async fn test_login_default_organization() {
    let github = github_with_memberships(json!([])).await;
    let harness = Harness::start(get_config(&github.uri(), None), setup_stores(true).await).await;

    let login = harness.login(&github_identity("alice", None)).await.unwrap();

    assert_eq!(1, login.user.organizations.len());
    let membership = &login.user.organizations[0];
    assert_eq!("alice", membership.organization.name);
    assert!(!membership.organization.is_external());
    assert_eq!("admin", membership.role);
    harness.stop().await;
}

#[tokio::test]
async fn test_login_github_unavailable() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&github)
        .await;
    let harness = Harness::start(get_config(&github.uri(), None), setup_stores(true).await).await;

    let login = harness.login(&github_identity("carol", None)).await.unwrap();

    assert_eq!(
        vec!["carol"],
        login
            .user
            .organizations
            .iter()
            .map(|m| m.organization.name.as_str())
            .collect::<Vec<_>>()
    );
    harness.stop().await;
}

#[tokio::test]
async fn test_login_mirror_failure_heals() {
    let github = github_with_memberships(json!([])).await;
    let mut config = get_config(&github.uri(), None);
    config.downstream.mirror_retry_attempts = 100;
    config.downstream.mirror_retry_backoff_ms = 20;
    config.downstream.mirror_retry_max_backoff_ms = 50;
    // downstream store without its user table
    let harness = Harness::start(config, setup_stores(false).await).await;

    let login = harness.login(&github_identity("dave", None)).await.unwrap();
    assert_eq!("dave", login.user.login);

    create_mirror_table(&harness.mirror_db).await;
    let mut mirrored = Vec::new();
    for _ in 0..100 {
        mirrored = mirrored_users(&harness.mirror_db, "dave").await;
        if !mirrored.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(1, mirrored.len());
    harness.stop().await;
}

#[tokio::test]
async fn test_login_returning_user() {
    let github = github_with_memberships(json!([{
        "state": "active",
        "role": "admin",
        "organization": {"login": "acme", "id": 7}
    }]))
    .await;
    let mut harness =
        Harness::start(get_config(&github.uri(), None), setup_stores(true).await).await;

    let first = harness
        .login(&github_identity("erin", Some("https://avatars.example.com/1")))
        .await
        .unwrap();
    harness.published();
    let second = harness
        .login(&github_identity("erin", Some("https://avatars.example.com/2")))
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(
        Some("https://avatars.example.com/2"),
        second.user.image.as_deref()
    );
    assert_eq!(first.user.organizations, second.user.organizations);
    assert_eq!(2, memberships_of(&harness.state.db, second.user.id).await.len());

    let mirrored = mirrored_users(&harness.mirror_db, "erin").await;
    assert_eq!(1, mirrored.len());
    assert_eq!("https://avatars.example.com/2", mirrored[0].avatar);

    assert!(matches!(
        harness.published().as_slice(),
        [ProvisioningEvent::OrganizationsChanged { .. }]
    ));
    harness.stop().await;
}

#[tokio::test]
async fn test_login_unknown_provider() {
    let github = github_with_memberships(json!([])).await;
    let harness = Harness::start(get_config(&github.uri(), None), setup_stores(true).await).await;

    let res = harness
        .login(&ExternalIdentity {
            name: None,
            email: None,
            image: None,
            payload: ProviderPayload::Unknown {
                provider: "gitlab".into(),
                claims: json!({"username": "frank"}),
            },
        })
        .await;
    assert!(matches!(res, Err(FederationError::IdentityShape { .. })));
    harness.stop().await;
}
