use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{LogKind, PaymentLog, ResultEngine, payment_logs};

use super::{Engine, with_tx};

impl Engine {
    /// Total approved amount credited to a member for the term.
    ///
    /// Only logs attached to the named term are summed.
    ///
    /// Member-limited operation.
    pub async fn member_total(
        &self,
        year: i32,
        semester: i32,
        member_id: &str,
    ) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let models = payment_logs::Entity::find()
                .filter(payment_logs::Column::TermId.eq(term.id.to_string()))
                .filter(payment_logs::Column::MemberId.eq(member_id.to_string()))
                .filter(payment_logs::Column::Kind.eq(LogKind::Approved.as_str()))
                .all(&db_tx)
                .await?;
            Ok(models.iter().map(|model| model.amount).sum::<i64>())
        })
    }

    /// Settled payment history for the term: approved submissions and direct
    /// deposits, oldest state change first.
    ///
    /// Member-limited operation.
    pub async fn history(&self, year: i32, semester: i32) -> ResultEngine<Vec<PaymentLog>> {
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let models = payment_logs::Entity::find()
                .filter(payment_logs::Column::TermId.eq(term.id.to_string()))
                .filter(payment_logs::Column::Kind.is_in([
                    LogKind::Approved.as_str(),
                    LogKind::Direct.as_str(),
                ]))
                .order_by_asc(payment_logs::Column::UpdatedAt)
                .order_by_asc(payment_logs::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(PaymentLog::try_from).collect()
        })
    }

    /// Submissions still waiting for an administrator decision, oldest first.
    ///
    /// Privileged operation.
    pub async fn pending(&self, year: i32, semester: i32) -> ResultEngine<Vec<PaymentLog>> {
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let models = payment_logs::Entity::find()
                .filter(payment_logs::Column::TermId.eq(term.id.to_string()))
                .filter(payment_logs::Column::Kind.eq(LogKind::Unapproved.as_str()))
                .order_by_asc(payment_logs::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(PaymentLog::try_from).collect()
        })
    }
}
