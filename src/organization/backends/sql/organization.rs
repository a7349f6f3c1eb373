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

use crate::config::Config;
use crate::db::entity::{
    organization as db_organization,
    prelude::{Organization as DbOrganization, UserOrganization as DbUserOrganization},
    user_organization as db_user_organization,
};
use crate::organization::backends::error::OrganizationDatabaseError;
use crate::organization::types::*;

pub async fn get(
    _conf: &Config,
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<Organization>, OrganizationDatabaseError> {
    let entry: Option<db_organization::Model> = DbOrganization::find_by_id(id).one(db).await?;
    entry.map(TryInto::try_into).transpose()
}

pub async fn list_for_user(
    _conf: &Config,
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<OrganizationMembership>, OrganizationDatabaseError> {
    let entries: Vec<(db_user_organization::Model, Option<db_organization::Model>)> =
        DbUserOrganization::find()
            .filter(db_user_organization::Column::UserId.eq(user_id))
            .find_also_related(DbOrganization)
            .all(db)
            .await?;

    let mut memberships = Vec::with_capacity(entries.len());
    for (membership, organization) in entries {
        if let Some(organization) = organization {
            memberships.push(OrganizationMembership {
                organization: organization.try_into()?,
                role: membership.role,
            });
        }
    }
    sort_memberships(&mut memberships);
    Ok(memberships)
}

impl TryFrom<db_organization::Model> for Organization {
    type Error = OrganizationDatabaseError;

    fn try_from(value: db_organization::Model) -> Result<Self, Self::Error> {
        let mut builder = OrganizationBuilder::default();
        builder.id(value.id);
        builder.name(value.name);
        if let Some(val) = value.github_id {
            builder.external_id(val);
        }
        Ok(builder.build()?)
    }
}
