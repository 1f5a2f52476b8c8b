//! Role assignment entity.

use sea_orm::entity::prelude::*;

use domain::RoleAssignment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sec_role_assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub role_code: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoleAssignment {
    fn from(model: Model) -> Self {
        RoleAssignment {
            id: model.id,
            username: model.username,
            role_code: model.role_code,
        }
    }
}
