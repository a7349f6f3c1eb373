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

use sea_orm::DatabaseConnection;
use sea_orm::entity::*;
use sea_orm::query::*;
use tracing::debug;

use crate::db::entity::{drone_user as db_drone_user, prelude::DroneUser as DbDroneUser};
use crate::downstream::backends::error::MirrorDatabaseError;
use crate::downstream::types::MirrorRecord;

pub async fn get_by_login(
    db: &DatabaseConnection,
    login: &str,
) -> Result<Option<db_drone_user::Model>, MirrorDatabaseError> {
    Ok(DbDroneUser::find()
        .filter(db_drone_user::Column::Login.eq(login))
        .one(db)
        .await?)
}

/// Update the record of the login or insert it when missing. An insert that
/// loses the race against a concurrent one is retried once as an update.
pub async fn upsert(
    db: &DatabaseConnection,
    record: &MirrorRecord,
) -> Result<i32, MirrorDatabaseError> {
    if let Some(current) = get_by_login(db, &record.login).await? {
        return update(db, current, record).await;
    }
    match insert(db, record).await {
        Err(MirrorDatabaseError::Conflict(_)) => {
            debug!("mirror of {} was created concurrently", record.login);
            let current = get_by_login(db, &record.login)
                .await?
                .ok_or_else(|| MirrorDatabaseError::UserNotFound(record.login.clone()))?;
            update(db, current, record).await
        }
        other => other,
    }
}

async fn insert(db: &DatabaseConnection, record: &MirrorRecord) -> Result<i32, MirrorDatabaseError> {
    let entry: db_drone_user::Model = db_drone_user::ActiveModel {
        id: NotSet,
        login: Set(record.login.clone()),
        token: Set(record.token.clone()),
        secret: Set(String::new()),
        expiry: Set(0),
        email: Set(record.email.clone()),
        avatar: Set(record.avatar.clone()),
        active: Set(record.active),
        admin: Set(record.admin),
        hash: Set(record.hash.clone()),
        synced: Set(record.synced),
    }
    .insert(db)
    .await?;
    Ok(entry.id)
}

async fn update(
    db: &DatabaseConnection,
    current: db_drone_user::Model,
    record: &MirrorRecord,
) -> Result<i32, MirrorDatabaseError> {
    let mut entry: db_drone_user::ActiveModel = current.into();
    entry.token = Set(record.token.clone());
    entry.email = Set(record.email.clone());
    entry.avatar = Set(record.avatar.clone());
    entry.active = Set(record.active);
    entry.admin = Set(record.admin);
    entry.hash = Set(record.hash.clone());
    entry.synced = Set(record.synced);
    let updated: db_drone_user::Model = entry.update(db).await?;
    Ok(updated.id)
}

impl From<db_drone_user::Model> for MirrorRecord {
    fn from(value: db_drone_user::Model) -> Self {
        Self {
            login: value.login,
            email: value.email,
            avatar: value.avatar,
            token: value.token,
            hash: value.hash,
            active: value.active,
            admin: value.admin,
            synced: value.synced,
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn get_record() -> MirrorRecord {
        MirrorRecord {
            login: "bob".into(),
            email: "bob@example.com".into(),
            avatar: "https://avatars.example.com/bob".into(),
            token: "T".into(),
            hash: "key".into(),
            active: true,
            admin: true,
            synced: 1_700_000_000,
        }
    }

    fn get_mock(id: i32, record: &MirrorRecord) -> db_drone_user::Model {
        db_drone_user::Model {
            id,
            login: record.login.clone(),
            token: record.token.clone(),
            email: record.email.clone(),
            avatar: record.avatar.clone(),
            active: record.active,
            admin: record.admin,
            hash: record.hash.clone(),
            synced: record.synced,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_missing() {
        let record = get_record();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<db_drone_user::Model>::new()])
            .append_query_results([vec![get_mock(11, &record)]])
            .into_connection();

        assert_eq!(11, upsert(&db, &record).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_updates_existing() {
        let record = get_record();
        let mut stale = get_mock(4, &record);
        stale.avatar = "https://avatars.example.com/old".into();
        stale.synced = 1;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stale]])
            .append_query_results([vec![get_mock(4, &record)]])
            .into_connection();

        assert_eq!(4, upsert(&db, &record).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_by_login() {
        let record = get_record();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_mock(4, &record)]])
            .into_connection();

        let found: MirrorRecord = get_by_login(&db, "bob").await.unwrap().unwrap().into();
        assert_eq!(record, found);
    }
}
