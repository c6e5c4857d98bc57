//! Term primitives.
//!
//! A `Term` is the fee obligation for one `(year, semester)` period. At most
//! one term exists per pair; payment logs reference their owning term by id.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier for this term.
    ///
    /// This is a UUID generated once and persisted in the database; the
    /// `(year, semester)` pair stays the natural key callers use.
    pub id: Uuid,
    pub year: i32,
    pub semester: i32,
    /// Amount a member must reach with approved payments to count as paid.
    pub amount: i64,
}

impl Term {
    pub fn new(year: i32, semester: i32, amount: i64) -> ResultEngine<Self> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "term amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            year,
            semester,
            amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "terms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub year: i32,
    pub semester: i32,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_logs::Entity")]
    PaymentLogs,
}

impl Related<super::payment_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Term> for ActiveModel {
    fn from(term: &Term) -> Self {
        Self {
            id: ActiveValue::Set(term.id.to_string()),
            year: ActiveValue::Set(term.year),
            semester: ActiveValue::Set(term.semester),
            amount: ActiveValue::Set(term.amount),
        }
    }
}

impl TryFrom<Model> for Term {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "term")?,
            year: model.year,
            semester: model.semester,
            amount: model.amount,
        })
    }
}
