//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for the fee ledger:
//!
//! - `members`: the member directory consumed by aggregates
//! - `terms`: one fee obligation per (year, semester)
//! - `payment_logs`: payment events attached to a term

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Members {
    Table,
    Id,
    Name,
    Department,
    Phone,
}

#[derive(Iden)]
enum Terms {
    Table,
    Id,
    Year,
    Semester,
    Amount,
}

#[derive(Iden)]
enum PaymentLogs {
    Table,
    Id,
    TermId,
    MemberId,
    Type,
    Amount,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Department).string())
                    .col(ColumnDef::new(Members::Phone).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Terms
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Terms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Terms::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Terms::Year).integer().not_null())
                    .col(ColumnDef::new(Terms::Semester).integer().not_null())
                    .col(ColumnDef::new(Terms::Amount).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-terms-year-semester-unique")
                    .table(Terms::Table)
                    .col(Terms::Year)
                    .col(Terms::Semester)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Payment logs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentLogs::TermId).string().not_null())
                    .col(ColumnDef::new(PaymentLogs::MemberId).string())
                    .col(ColumnDef::new(PaymentLogs::Type).string().not_null())
                    .col(
                        ColumnDef::new(PaymentLogs::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentLogs::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentLogs::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_logs-term_id")
                            .from(PaymentLogs::Table, PaymentLogs::TermId)
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_logs-term_id")
                    .table(PaymentLogs::Table)
                    .col(PaymentLogs::TermId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_logs-member_id")
                    .table(PaymentLogs::Table)
                    .col(PaymentLogs::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(PaymentLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Terms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}
