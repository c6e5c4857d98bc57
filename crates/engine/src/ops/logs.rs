use chrono::Utc;
use uuid::Uuid;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{LogKind, PaymentLog, ResultEngine, payment_logs};

use super::{Engine, with_tx};

impl Engine {
    /// Record a member's payment claim for the term.
    ///
    /// The claim starts `unapproved` and counts toward nothing until an
    /// administrator approves it. Fails with [`crate::EngineError::TermNotFound`]
    /// when the term does not exist, so a claim can never be orphaned.
    ///
    /// Member-limited operation.
    pub async fn submit(
        &self,
        member_id: &str,
        year: i32,
        semester: i32,
        amount: i64,
    ) -> ResultEngine<Uuid> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let log = PaymentLog::new(
                term.id,
                Some(member_id.to_string()),
                LogKind::Unapproved,
                amount,
                now,
            )?;
            let log_model: payment_logs::ActiveModel = (&log).into();
            log_model.insert(&db_tx).await?;
            Ok(log.id)
        })
    }

    /// Approve the submissions with the given ids.
    ///
    /// One batched update: every matching log becomes `approved` and gets a
    /// fresh `updated_at`. Ids that match nothing are skipped; re-approving
    /// only refreshes the timestamp.
    ///
    /// Privileged operation.
    pub async fn approve(&self, ids: &[Uuid]) -> ResultEngine<()> {
        let now = Utc::now();
        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
        with_tx!(self, |db_tx| {
            payment_logs::Entity::update_many()
                .col_expr(
                    payment_logs::Column::Kind,
                    Expr::value(LogKind::Approved.as_str()),
                )
                .col_expr(payment_logs::Column::UpdatedAt, Expr::value(now))
                .filter(payment_logs::Column::Id.is_in(id_strings))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Reject submissions: every given id is removed from the term's roster
    /// and its log deleted, in one batched delete scoped to the term.
    ///
    /// Ids that do not belong to the term are a no-op; a missing term is an
    /// error.
    ///
    /// Privileged operation.
    pub async fn reject(&self, year: i32, semester: i32, ids: &[Uuid]) -> ResultEngine<()> {
        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            payment_logs::Entity::delete_many()
                .filter(payment_logs::Column::TermId.eq(term.id.to_string()))
                .filter(payment_logs::Column::Id.is_in(id_strings))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Record a direct deposit made on the club account for the term.
    ///
    /// The log carries no member and is `direct` from creation; it never
    /// needs approval.
    ///
    /// Privileged operation.
    pub async fn deposit(&self, year: i32, semester: i32, amount: i64) -> ResultEngine<Uuid> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let log = PaymentLog::new(term.id, None, LogKind::Direct, amount, now)?;
            let log_model: payment_logs::ActiveModel = (&log).into();
            log_model.insert(&db_tx).await?;
            Ok(log.id)
        })
    }
}
