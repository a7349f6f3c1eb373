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
//! Common functionality of the federation tests: temporary SQLite stores for
//! the primary store and the downstream mirror.

use sea_orm::entity::*;
use sea_orm::query::*;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

use pipeline_auth::config::Config;
use pipeline_auth::db::entity::{
    drone_user, organization, prelude::*, user_organization,
};
use pipeline_auth::db::migration::Migrator;

pub struct TestStores {
    pub db: DatabaseConnection,
    pub mirror_db: Arc<DatabaseConnection>,
    // Keeps the database files alive
    pub dir: TempDir,
}

async fn connect(path: &Path) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    // Writers are serialized by SQLite anyway
    opt.max_connections(1).sqlx_logging(false);
    Database::connect(opt).await.unwrap()
}

/// Primary store with the schema applied and an empty downstream store.
/// The mirror table is only created when `with_mirror_table` is set.
pub async fn setup_stores(with_mirror_table: bool) -> TestStores {
    let dir = tempfile::tempdir().unwrap();
    let db = connect(&dir.path().join("pipeline.db")).await;
    Migrator::up(&db, None).await.unwrap();

    let mirror_db = connect(&dir.path().join("drone.db")).await;
    if with_mirror_table {
        create_mirror_table(&mirror_db).await;
    }
    TestStores {
        db,
        mirror_db: Arc::new(mirror_db),
        dir,
    }
}

/// Create the user table the downstream system owns.
pub async fn create_mirror_table(db: &DatabaseConnection) {
    let schema = Schema::new(DbBackend::Sqlite);
    db.execute(
        db.get_database_backend()
            .build(&schema.create_table_from_entity(DroneUser)),
    )
    .await
    .unwrap();
}

pub fn get_config(github_url: &str, drone_url: Option<&str>) -> Config {
    let mut config = Config::default();
    config.github.api_url = Url::parse(github_url).unwrap();
    config.github.timeout = 2;
    config.downstream.url = drone_url.map(|x| Url::parse(x).unwrap());
    config.downstream.signing_key = "drone-secret".into();
    config.downstream.timeout = 2;
    config.downstream.mirror_retry_attempts = 2;
    config.downstream.mirror_retry_backoff_ms = 10;
    config.downstream.mirror_retry_max_backoff_ms = 20;
    config
}

pub async fn organizations_with_external_id(
    db: &DatabaseConnection,
    external_id: i64,
) -> Vec<organization::Model> {
    Organization::find()
        .filter(organization::Column::GithubId.eq(external_id))
        .all(db)
        .await
        .unwrap()
}

pub async fn memberships_of(
    db: &DatabaseConnection,
    user_id: i32,
) -> Vec<user_organization::Model> {
    UserOrganization::find()
        .filter(user_organization::Column::UserId.eq(user_id))
        .order_by_asc(user_organization::Column::OrganizationId)
        .all(db)
        .await
        .unwrap()
}

pub async fn mirrored_users(db: &DatabaseConnection, login: &str) -> Vec<drone_user::Model> {
    DroneUser::find()
        .filter(drone_user::Column::Login.eq(login))
        .all(db)
        .await
        .unwrap()
}
