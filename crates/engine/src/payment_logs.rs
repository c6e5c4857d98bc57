//! Payment-log primitives.
//!
//! A `PaymentLog` is one payment event recorded against a term: a member
//! submission awaiting approval, an approved submission, or a direct deposit
//! entered by an administrator on the club account.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// A member submission that an administrator has not decided yet.
    Unapproved,
    /// A submission accepted by an administrator; counts toward totals.
    Approved,
    /// An administrator-entered deposit with no submitting member.
    Direct,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unapproved => "unapproved",
            Self::Approved => "approved",
            Self::Direct => "direct",
        }
    }
}

impl TryFrom<&str> for LogKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "unapproved" => Ok(Self::Unapproved),
            "approved" => Ok(Self::Approved),
            "direct" => Ok(Self::Direct),
            other => Err(EngineError::InvalidId(format!("invalid log kind: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLog {
    pub id: Uuid,
    pub term_id: Uuid,
    /// Submitting member; `None` for direct deposits.
    pub member_id: Option<String>,
    pub kind: LogKind,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    /// Last state change. Set on creation, refreshed on approval.
    pub updated_at: DateTime<Utc>,
}

impl PaymentLog {
    pub fn new(
        term_id: Uuid,
        member_id: Option<String>,
        kind: LogKind,
        amount: i64,
        at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "log amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            term_id,
            member_id,
            kind,
            amount,
            created_at: at,
            updated_at: at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub term_id: String,
    pub member_id: Option<String>,
    // The storage column keeps the historical name `type`.
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub amount: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::terms::Entity",
        from = "Column::TermId",
        to = "super::terms::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Terms,
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Terms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentLog> for ActiveModel {
    fn from(log: &PaymentLog) -> Self {
        Self {
            id: ActiveValue::Set(log.id.to_string()),
            term_id: ActiveValue::Set(log.term_id.to_string()),
            member_id: ActiveValue::Set(log.member_id.clone()),
            kind: ActiveValue::Set(log.kind.as_str().to_string()),
            amount: ActiveValue::Set(log.amount),
            created_at: ActiveValue::Set(log.created_at),
            updated_at: ActiveValue::Set(log.updated_at),
        }
    }
}

impl TryFrom<Model> for PaymentLog {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "log")?,
            term_id: parse_uuid(&model.term_id, "term")?,
            member_id: model.member_id,
            kind: LogKind::try_from(model.kind.as_str())?,
            amount: model.amount,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
