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

//! Import of the identity provider organizations of a user.
//!
//! The whole import is one transaction: either every organization is found or
//! created, the user attached and its role recorded, or nothing is.

use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::query::*;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::db::entity::{
    organization as db_organization,
    prelude::{Organization as DbOrganization, UserOrganization as DbUserOrganization},
    user_organization as db_user_organization,
};
use crate::external::types::ExternalOrganization;
use crate::organization::backends::error::{OrganizationDatabaseError, is_unique_violation};
use crate::organization::types::is_valid_role;

pub async fn sync(
    _conf: &Config,
    db: &DatabaseConnection,
    user_id: i32,
    organizations: &[ExternalOrganization],
) -> Result<Vec<i32>, OrganizationDatabaseError> {
    let txn = db.begin().await?;
    match import(&txn, user_id, organizations).await {
        Ok(ids) => {
            txn.commit().await?;
            Ok(ids)
        }
        Err(err) => {
            warn!("rolling back organization import of user {user_id}: {err}");
            Err(rolled_back(err, txn.rollback().await))
        }
    }
}

/// The import error is what the caller sees, a failed rollback is only logged.
fn rolled_back(
    err: OrganizationDatabaseError,
    rollback: Result<(), DbErr>,
) -> OrganizationDatabaseError {
    if let Err(rollback_err) = rollback {
        error!("rollback of the organization import failed: {rollback_err}");
    }
    err
}

async fn import(
    txn: &DatabaseTransaction,
    user_id: i32,
    organizations: &[ExternalOrganization],
) -> Result<Vec<i32>, OrganizationDatabaseError> {
    let mut ids: Vec<i32> = Vec::with_capacity(organizations.len());
    for external in organizations {
        let organization = find_or_create(txn, external).await?;
        attach(txn, user_id, organization.id, &external.role).await?;
        if !ids.contains(&organization.id) {
            ids.push(organization.id);
        }
    }
    Ok(ids)
}

async fn find_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: i64,
    locking: bool,
) -> Result<Option<db_organization::Model>, OrganizationDatabaseError> {
    let mut select = DbOrganization::find().filter(db_organization::Column::GithubId.eq(external_id));
    // A plain read in a MySQL repeatable read transaction does not observe rows
    // committed by the concurrent creator.
    if locking && db.get_database_backend() == DatabaseBackend::MySql {
        select = select.lock_shared();
    }
    Ok(select.one(db).await?)
}

async fn find_or_create(
    txn: &DatabaseTransaction,
    external: &ExternalOrganization,
) -> Result<db_organization::Model, OrganizationDatabaseError> {
    if let Some(current) = find_by_external_id(txn, external.external_id, false).await? {
        return rename(txn, current, &external.name).await;
    }

    let now = Utc::now().naive_utc();
    let entry = db_organization::ActiveModel {
        id: NotSet,
        github_id: Set(Some(external.external_id)),
        created_at: Set(now),
        updated_at: Set(now),
        name: Set(external.name.clone()),
    };

    // Savepoint so that losing the creation race does not poison the import
    let savepoint = txn.begin().await?;
    match entry.insert(&savepoint).await {
        Ok(created) => {
            savepoint.commit().await?;
            debug!(
                "created organization {} for external id {}",
                created.id, external.external_id
            );
            Ok(created)
        }
        Err(err) if is_unique_violation(&err) => {
            savepoint.rollback().await?;
            debug!(
                "organization with external id {} created concurrently, retrying lookup",
                external.external_id
            );
            match find_by_external_id(txn, external.external_id, true).await? {
                Some(current) => rename(txn, current, &external.name).await,
                None => Err(OrganizationDatabaseError::Conflict(format!(
                    "organization name {} is already taken",
                    external.name
                ))),
            }
        }
        Err(err) => Err(err.into()),
    }
}

/// Follow renames done at the identity provider.
async fn rename(
    txn: &DatabaseTransaction,
    current: db_organization::Model,
    name: &str,
) -> Result<db_organization::Model, OrganizationDatabaseError> {
    if current.name == name {
        return Ok(current);
    }
    let mut entry: db_organization::ActiveModel = current.into();
    entry.name = Set(name.to_owned());
    entry.updated_at = Set(Utc::now().naive_utc());
    Ok(entry.update(txn).await?)
}

/// Attach the user to the organization with the given role, overwriting the
/// previously recorded one.
async fn attach(
    txn: &DatabaseTransaction,
    user_id: i32,
    organization_id: i32,
    role: &str,
) -> Result<(), OrganizationDatabaseError> {
    if !is_valid_role(role) {
        return Err(OrganizationDatabaseError::InvalidRole(role.to_owned()));
    }
    match DbUserOrganization::find_by_id((user_id, organization_id))
        .one(txn)
        .await?
    {
        Some(current) if current.role == role => {}
        Some(current) => {
            let mut entry: db_user_organization::ActiveModel = current.into();
            entry.role = Set(role.to_owned());
            entry.update(txn).await?;
        }
        None => {
            DbUserOrganization::insert(db_user_organization::ActiveModel {
                user_id: Set(user_id),
                organization_id: Set(organization_id),
                role: Set(role.to_owned()),
            })
            .exec_without_returning(txn)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use tracing_test::traced_test;

    use crate::db::entity::{organization, user_organization};

    use super::*;

    fn get_organization_mock(id: i32, github_id: i64, name: &str) -> organization::Model {
        organization::Model {
            id,
            github_id: Some(github_id),
            name: name.into(),
            ..Default::default()
        }
    }

    fn external(id: i64, name: &str, role: &str) -> ExternalOrganization {
        ExternalOrganization {
            external_id: id,
            name: name.into(),
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn test_sync_existing_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_organization_mock(3, 42, "acme")]])
            .append_query_results([vec![user_organization::Model {
                user_id: 1,
                organization_id: 3,
                role: "member".into(),
            }]])
            .into_connection();
        let config = Config::default();

        assert_eq!(
            vec![3],
            sync(&config, &db, 1, &[external(42, "acme", "member")])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_sync_role_overwritten() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_organization_mock(3, 42, "acme")]])
            .append_query_results([vec![user_organization::Model {
                user_id: 1,
                organization_id: 3,
                role: "member".into(),
            }]])
            .append_query_results([vec![user_organization::Model {
                user_id: 1,
                organization_id: 3,
                role: "admin".into(),
            }]])
            .append_exec_results([MockExecResult {
                rows_affected: 1,
                ..Default::default()
            }])
            .into_connection();
        let config = Config::default();

        assert_eq!(
            vec![3],
            sync(&config, &db, 1, &[external(42, "acme", "admin")])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_sync_invalid_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![get_organization_mock(3, 42, "acme")]])
            .into_connection();
        let config = Config::default();

        match sync(&config, &db, 1, &[external(42, "acme", "")]).await {
            Err(OrganizationDatabaseError::InvalidRole(role)) => assert!(role.is_empty()),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    #[traced_test]
    fn test_failed_rollback_keeps_import_error() {
        let err = rolled_back(
            OrganizationDatabaseError::InvalidRole(String::new()),
            Err(DbErr::Custom("connection lost".into())),
        );
        assert!(matches!(err, OrganizationDatabaseError::InvalidRole(_)));
        assert!(logs_contain("rollback of the organization import failed"));
    }

    #[tokio::test]
    async fn test_sync_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let config = Config::default();

        assert!(sync(&config, &db, 1, &[]).await.unwrap().is_empty());
    }
}
