//! Members table (minimal entity).
//!
//! The engine consumes the member directory read-only: paid/unpaid
//! aggregates resolve member ids to full records. Member management itself
//! lives outside this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member record as resolved from the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            department: model.department,
            phone: model.phone,
        }
    }
}
