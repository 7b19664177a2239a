use sqlx::Row;

use puente_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
use puente_core::domain::request::RequestId;

use super::{parse_opt_decimal, parse_timestamp, QuotationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuotationRepository {
    pool: DbPool,
}

impl SqlQuotationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const QUOTATION_COLUMNS: &str = "id, request_id, code, status, base_amount, fees, taxes,
     total_amount, exchange_rate, amount_in_bs, management_service_bs, total_in_bs,
     valid_until, rejection_reason, response_notes, created_at, updated_at";

pub(crate) fn row_to_quotation(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<Quotation, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let request_id: String =
        row.try_get("request_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let code: String = row.try_get("code").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let base_amount: Option<String> =
        row.try_get("base_amount").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let fees: Option<String> =
        row.try_get("fees").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let taxes: Option<String> =
        row.try_get("taxes").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let total_amount: Option<String> =
        row.try_get("total_amount").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let exchange_rate: Option<String> =
        row.try_get("exchange_rate").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let amount_in_bs: Option<String> =
        row.try_get("amount_in_bs").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let management_service_bs: Option<String> =
        row.try_get("management_service_bs").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let total_in_bs: Option<String> =
        row.try_get("total_in_bs").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let valid_until_str: String =
        row.try_get("valid_until").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rejection_reason: Option<String> =
        row.try_get("rejection_reason").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let response_notes: Option<String> =
        row.try_get("response_notes").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Quotation {
        id: QuotationId(id),
        request_id: RequestId(request_id),
        code,
        status: QuotationStatus::parse(&status_str),
        base_amount: parse_opt_decimal("base_amount", base_amount)?,
        fees: parse_opt_decimal("fees", fees)?,
        taxes: parse_opt_decimal("taxes", taxes)?,
        total_amount: parse_opt_decimal("total_amount", total_amount)?,
        exchange_rate: parse_opt_decimal("exchange_rate", exchange_rate)?,
        amount_in_bs: parse_opt_decimal("amount_in_bs", amount_in_bs)?,
        management_service_bs: parse_opt_decimal("management_service_bs", management_service_bs)?,
        total_in_bs: parse_opt_decimal("total_in_bs", total_in_bs)?,
        valid_until: parse_timestamp("valid_until", &valid_until_str)?,
        rejection_reason,
        response_notes,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl QuotationRepository for SqlQuotationRepository {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {QUOTATION_COLUMNS} FROM quotation WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_quotation(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, quotation: Quotation) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO quotation (id, request_id, code, status, base_amount, fees, taxes,
                                    total_amount, exchange_rate, amount_in_bs,
                                    management_service_bs, total_in_bs, valid_until,
                                    rejection_reason, response_notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 base_amount = excluded.base_amount,
                 fees = excluded.fees,
                 taxes = excluded.taxes,
                 total_amount = excluded.total_amount,
                 exchange_rate = excluded.exchange_rate,
                 amount_in_bs = excluded.amount_in_bs,
                 management_service_bs = excluded.management_service_bs,
                 total_in_bs = excluded.total_in_bs,
                 valid_until = excluded.valid_until,
                 rejection_reason = excluded.rejection_reason,
                 response_notes = excluded.response_notes,
                 updated_at = excluded.updated_at",
        )
        .bind(&quotation.id.0)
        .bind(&quotation.request_id.0)
        .bind(&quotation.code)
        .bind(quotation.status.as_str())
        .bind(quotation.base_amount.map(|d| d.to_string()))
        .bind(quotation.fees.map(|d| d.to_string()))
        .bind(quotation.taxes.map(|d| d.to_string()))
        .bind(quotation.total_amount.map(|d| d.to_string()))
        .bind(quotation.exchange_rate.map(|d| d.to_string()))
        .bind(quotation.amount_in_bs.map(|d| d.to_string()))
        .bind(quotation.management_service_bs.map(|d| d.to_string()))
        .bind(quotation.total_in_bs.map(|d| d.to_string()))
        .bind(quotation.valid_until.to_rfc3339())
        .bind(&quotation.rejection_reason)
        .bind(&quotation.response_notes)
        .bind(quotation.created_at.to_rfc3339())
        .bind(quotation.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<Quotation>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotation WHERE request_id = ? ORDER BY created_at ASC"
        ))
        .bind(&request_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_quotation).collect::<Result<Vec<_>, _>>()
    }
}
