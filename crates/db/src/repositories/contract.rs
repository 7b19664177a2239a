use sqlx::Row;

use puente_core::domain::contract::{Contract, ContractId, ContractStatus};
use puente_core::domain::quotation::QuotationId;
use puente_core::domain::request::RequestId;

use super::{parse_decimal, parse_opt_timestamp, parse_timestamp, ContractRepository, RepositoryError};
use crate::DbPool;

pub struct SqlContractRepository {
    pool: DbPool,
}

impl SqlContractRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const CONTRACT_COLUMNS: &str = "id, request_id, quotation_id, code, status, amount, currency,
     start_date, end_date, additional_data, created_at, updated_at";

pub(crate) fn row_to_contract(row: &sqlx::sqlite::SqliteRow) -> Result<Contract, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let request_id: String =
        row.try_get("request_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quotation_id: String =
        row.try_get("quotation_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let code: String = row.try_get("code").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let amount_str: String =
        row.try_get("amount").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let currency: String =
        row.try_get("currency").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let start_date: Option<String> =
        row.try_get("start_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let end_date: Option<String> =
        row.try_get("end_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let additional_data_str: Option<String> =
        row.try_get("additional_data").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let additional_data = additional_data_str
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| RepositoryError::Decode(format!("invalid additional_data json: {e}")))?;

    Ok(Contract {
        id: ContractId(id),
        request_id: RequestId(request_id),
        quotation_id: QuotationId(quotation_id),
        code,
        status: ContractStatus::parse(&status_str),
        amount: parse_decimal("amount", &amount_str)?,
        currency,
        start_date: parse_opt_timestamp("start_date", start_date)?,
        end_date: parse_opt_timestamp("end_date", end_date)?,
        additional_data,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl ContractRepository for SqlContractRepository {
    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CONTRACT_COLUMNS} FROM contract WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_contract(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, contract: Contract) -> Result<(), RepositoryError> {
        let additional_data = contract
            .additional_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Decode(format!("unserializable additional_data: {e}")))?;

        sqlx::query(
            "INSERT INTO contract (id, request_id, quotation_id, code, status, amount, currency,
                                   start_date, end_date, additional_data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 amount = excluded.amount,
                 currency = excluded.currency,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 additional_data = excluded.additional_data,
                 updated_at = excluded.updated_at",
        )
        .bind(&contract.id.0)
        .bind(&contract.request_id.0)
        .bind(&contract.quotation_id.0)
        .bind(&contract.code)
        .bind(contract.status.as_str())
        .bind(contract.amount.to_string())
        .bind(&contract.currency)
        .bind(contract.start_date.map(|dt| dt.to_rfc3339()))
        .bind(contract.end_date.map(|dt| dt.to_rfc3339()))
        .bind(additional_data)
        .bind(contract.created_at.to_rfc3339())
        .bind(contract.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<Contract>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contract
             WHERE request_id = ? ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(&request_id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_contract(r)?)),
            None => Ok(None),
        }
    }
}
