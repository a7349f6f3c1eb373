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

use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::query::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::config::Config;
use crate::db::entity::{
    organization as db_organization,
    prelude::{User as DbUser, UserOrganization as DbUserOrganization},
    user as db_user, user_organization as db_user_organization,
};
use crate::identity::backends::error::IdentityDatabaseError;
use crate::identity::types::*;
use crate::organization::types::{Organization, OrganizationMembership, is_valid_role};

pub async fn get(
    _conf: &Config,
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<User>, IdentityDatabaseError> {
    let entry: Option<db_user::Model> = DbUser::find_by_id(user_id).one(db).await?;
    entry.map(TryInto::try_into).transpose()
}

pub async fn get_by_login<L: AsRef<str>>(
    _conf: &Config,
    db: &DatabaseConnection,
    login: L,
) -> Result<Option<User>, IdentityDatabaseError> {
    let entry: Option<db_user::Model> = DbUser::find()
        .filter(db_user::Column::Login.eq(login.as_ref()))
        .one(db)
        .await?;
    entry.map(TryInto::try_into).transpose()
}

/// Register the user. The user, its personal organization (named after the
/// login) and the membership are written in one transaction.
pub async fn create(
    _conf: &Config,
    db: &DatabaseConnection,
    user: &UserCreate,
) -> Result<ProvisionedUser, IdentityDatabaseError> {
    if !is_valid_role(&user.personal_organization_role) {
        return Err(IdentityDatabaseError::InvalidRole(
            user.personal_organization_role.clone(),
        ));
    }
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;
    let db_user: db_user::Model = db_user::ActiveModel {
        id: NotSet,
        created_at: Set(now),
        updated_at: Set(now),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        login: Set(user.login.clone()),
        image: Set(user.image.clone()),
    }
    .insert(&txn)
    .await?;

    let db_org: db_organization::Model = db_organization::ActiveModel {
        id: NotSet,
        github_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        name: Set(user.login.clone()),
    }
    .insert(&txn)
    .await?;

    DbUserOrganization::insert(db_user_organization::ActiveModel {
        user_id: Set(db_user.id),
        organization_id: Set(db_org.id),
        role: Set(user.personal_organization_role.clone()),
    })
    .exec_without_returning(&txn)
    .await?;
    txn.commit().await?;

    let personal_organization: Organization = db_org.try_into()?;
    let mut created: User = db_user.try_into()?;
    created.organizations = vec![OrganizationMembership {
        organization: personal_organization.clone(),
        role: user.personal_organization_role.clone(),
    }];
    Ok(ProvisionedUser {
        user: created,
        personal_organization,
    })
}

pub async fn update_profile(
    _conf: &Config,
    db: &DatabaseConnection,
    user_id: i32,
    profile: UserProfile,
) -> Result<User, IdentityDatabaseError> {
    let current = DbUser::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| IdentityDatabaseError::UserNotFound(user_id.to_string()))?;

    if current.name == profile.name
        && current.email == profile.email
        && current.image == profile.image
    {
        return current.try_into();
    }

    let mut entry: db_user::ActiveModel = current.into();
    entry.name = Set(profile.name);
    entry.email = Set(profile.email);
    entry.image = Set(profile.image);
    entry.updated_at = Set(Utc::now().naive_utc());
    let db_entry: db_user::Model = entry.update(db).await?;
    db_entry.try_into()
}

impl TryFrom<db_user::Model> for User {
    type Error = IdentityDatabaseError;

    fn try_from(value: db_user::Model) -> Result<Self, Self::Error> {
        let mut builder = UserBuilder::default();
        builder.id(value.id);
        builder.login(value.login);
        if let Some(val) = value.name {
            builder.name(val);
        }
        if let Some(val) = value.email {
            builder.email(val);
        }
        if let Some(val) = value.image {
            builder.image(val);
        }
        Ok(builder.build()?)
    }
}
