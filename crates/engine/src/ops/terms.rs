use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, LogKind, Member, ResultEngine, Term, members, payment_logs, terms,
    util::term_key,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create the fee record for a `(year, semester)` term.
    ///
    /// Fails with [`EngineError::DuplicateTerm`] when the pair already has a
    /// term; the existing record is left untouched.
    ///
    /// Privileged operation: only club administrators create terms.
    pub async fn create_term(&self, year: i32, semester: i32, amount: i64) -> ResultEngine<Uuid> {
        let term = Term::new(year, semester, amount)?;
        let term_model: terms::ActiveModel = (&term).into();
        with_tx!(self, |db_tx| {
            let exists = terms::Entity::find()
                .filter(terms::Column::Year.eq(year))
                .filter(terms::Column::Semester.eq(semester))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::DuplicateTerm(term_key(year, semester)));
            }

            term_model.insert(&db_tx).await?;
            Ok(term.id)
        })
    }

    /// Return the term record for `(year, semester)`.
    pub async fn term(&self, year: i32, semester: i32) -> ResultEngine<Term> {
        with_tx!(self, |db_tx| self.require_term(&db_tx, year, semester).await)
    }

    /// Members whose approved payments for the term reach the term amount.
    ///
    /// Privileged operation.
    pub async fn paid_members(&self, year: i32, semester: i32) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let totals = approved_totals(&db_tx, &term).await?;
            let ids: Vec<String> = totals
                .into_iter()
                .filter(|(_, total)| *total >= term.amount)
                .map(|(member_id, _)| member_id)
                .collect();
            resolve_members(&db_tx, ids).await
        })
    }

    /// Members whose approved payments for the term stay below the term
    /// amount.
    ///
    /// A member with no approved payment at all has no total to compare and
    /// appears in neither this list nor [`Engine::paid_members`].
    ///
    /// Privileged operation.
    pub async fn unpaid_members(&self, year: i32, semester: i32) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            let term = self.require_term(&db_tx, year, semester).await?;
            let totals = approved_totals(&db_tx, &term).await?;
            let ids: Vec<String> = totals
                .into_iter()
                .filter(|(_, total)| *total < term.amount)
                .map(|(member_id, _)| member_id)
                .collect();
            resolve_members(&db_tx, ids).await
        })
    }

    pub(super) async fn require_term(
        &self,
        db: &DatabaseTransaction,
        year: i32,
        semester: i32,
    ) -> ResultEngine<Term> {
        let model = terms::Entity::find()
            .filter(terms::Column::Year.eq(year))
            .filter(terms::Column::Semester.eq(semester))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::TermNotFound(term_key(year, semester)))?;
        Term::try_from(model)
    }
}

/// Sum approved log amounts for the term, grouped by member.
async fn approved_totals(
    db: &DatabaseTransaction,
    term: &Term,
) -> ResultEngine<HashMap<String, i64>> {
    let models = payment_logs::Entity::find()
        .filter(payment_logs::Column::TermId.eq(term.id.to_string()))
        .filter(payment_logs::Column::Kind.eq(LogKind::Approved.as_str()))
        .all(db)
        .await?;

    let mut totals: HashMap<String, i64> = HashMap::new();
    for model in models {
        // Direct deposits carry no member and count toward the term ledger
        // only, never toward a member's total.
        let Some(member_id) = model.member_id else {
            continue;
        };
        *totals.entry(member_id).or_insert(0) += model.amount;
    }
    Ok(totals)
}

/// Resolve member ids through the member directory.
async fn resolve_members(db: &DatabaseTransaction, ids: Vec<String>) -> ResultEngine<Vec<Member>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let models = members::Entity::find()
        .filter(members::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(models.into_iter().map(Member::from).collect())
}
