use chrono::{DateTime, Utc};
use sqlx::Row;

use puente_core::domain::cashier::{
    CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId,
    CashierTransactionStatus,
};
use puente_core::domain::quotation::QuotationId;

use super::{
    parse_decimal, parse_opt_decimal, parse_opt_timestamp, parse_timestamp,
    CashierAccountRepository, CashierTransactionRepository, RepositoryError,
};
use crate::DbPool;

pub struct SqlCashierAccountRepository {
    pool: DbPool,
}

impl SqlCashierAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_account(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CashierAccount, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let cashier_id: String =
        row.try_get("cashier_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let daily_limit_str: String =
        row.try_get("daily_limit_bs").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let active: i64 = row.try_get("active").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(CashierAccount {
        id: CashierAccountId(id),
        cashier_id,
        name,
        daily_limit_bs: parse_decimal("daily_limit_bs", &daily_limit_str)?,
        active: active != 0,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl CashierAccountRepository for SqlCashierAccountRepository {
    async fn find_by_id(
        &self,
        id: &CashierAccountId,
    ) -> Result<Option<CashierAccount>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, cashier_id, name, daily_limit_bs, active, created_at, updated_at
             FROM cashier_account WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_account(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, account: CashierAccount) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cashier_account (id, cashier_id, name, daily_limit_bs, active,
                                          created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 daily_limit_bs = excluded.daily_limit_bs,
                 active = excluded.active,
                 updated_at = excluded.updated_at",
        )
        .bind(&account.id.0)
        .bind(&account.cashier_id)
        .bind(&account.name)
        .bind(account.daily_limit_bs.to_string())
        .bind(account.active as i64)
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_cashier(
        &self,
        cashier_id: &str,
    ) -> Result<Vec<CashierAccount>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, cashier_id, name, daily_limit_bs, active, created_at, updated_at
             FROM cashier_account WHERE cashier_id = ? ORDER BY created_at ASC",
        )
        .bind(cashier_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_account).collect::<Result<Vec<_>, _>>()
    }

    async fn transaction_count(&self, id: &CashierAccountId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM cashier_transaction WHERE account_id = ?",
        )
        .bind(&id.0)
        .fetch_one(&self.pool)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    async fn delete(&self, id: &CashierAccountId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cashier_assignment WHERE account_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cashier_account WHERE id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

pub struct SqlCashierTransactionRepository {
    pool: DbPool,
}

impl SqlCashierTransactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_transaction(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CashierTransaction, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let account_id: String =
        row.try_get("account_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let cashier_id: String =
        row.try_get("cashier_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quotation_id: String =
        row.try_get("quotation_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let assigned_amount_str: String =
        row.try_get("assigned_amount_bs").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rate_str: String = row
        .try_get("suggested_exchange_rate")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expected_usdt_str: String =
        row.try_get("expected_usdt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let delivered_usdt: Option<String> =
        row.try_get("delivered_usdt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let assigned_at_str: String =
        row.try_get("assigned_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let completed_at: Option<String> =
        row.try_get("completed_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(CashierTransaction {
        id: CashierTransactionId(id),
        account_id: CashierAccountId(account_id),
        cashier_id,
        quotation_id: QuotationId(quotation_id),
        assigned_amount_bs: parse_decimal("assigned_amount_bs", &assigned_amount_str)?,
        suggested_exchange_rate: parse_decimal("suggested_exchange_rate", &rate_str)?,
        expected_usdt: parse_decimal("expected_usdt", &expected_usdt_str)?,
        delivered_usdt: parse_opt_decimal("delivered_usdt", delivered_usdt)?,
        status: CashierTransactionStatus::parse(&status_str),
        assigned_at: parse_timestamp("assigned_at", &assigned_at_str)?,
        completed_at: parse_opt_timestamp("completed_at", completed_at)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, account_id, cashier_id, quotation_id, assigned_amount_bs,
     suggested_exchange_rate, expected_usdt, delivered_usdt, status, assigned_at, completed_at";

#[async_trait::async_trait]
impl CashierTransactionRepository for SqlCashierTransactionRepository {
    async fn find_by_id(
        &self,
        id: &CashierTransactionId,
    ) -> Result<Option<CashierTransaction>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM cashier_transaction WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_transaction(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, transaction: CashierTransaction) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cashier_transaction (id, account_id, cashier_id, quotation_id,
                                              assigned_amount_bs, suggested_exchange_rate,
                                              expected_usdt, delivered_usdt, status,
                                              assigned_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 delivered_usdt = excluded.delivered_usdt,
                 status = excluded.status,
                 completed_at = excluded.completed_at",
        )
        .bind(&transaction.id.0)
        .bind(&transaction.account_id.0)
        .bind(&transaction.cashier_id)
        .bind(&transaction.quotation_id.0)
        .bind(transaction.assigned_amount_bs.to_string())
        .bind(transaction.suggested_exchange_rate.to_string())
        .bind(transaction.expected_usdt.to_string())
        .bind(transaction.delivered_usdt.map(|d| d.to_string()))
        .bind(transaction.status.as_str())
        .bind(transaction.assigned_at.to_rfc3339())
        .bind(transaction.completed_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_account_in_window(
        &self,
        account_id: &CashierAccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CashierTransaction>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM cashier_transaction
             WHERE account_id = ? AND assigned_at >= ? AND assigned_at < ?
             ORDER BY assigned_at ASC"
        ))
        .bind(&account_id.0)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaction).collect::<Result<Vec<_>, _>>()
    }
}
