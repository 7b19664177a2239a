use sqlx::Row;

use puente_core::domain::company::CompanyId;
use puente_core::domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};

use super::{parse_decimal, parse_timestamp, RepositoryError, RequestRepository};
use crate::DbPool;

pub struct SqlRequestRepository {
    pool: DbPool,
}

impl SqlRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const REQUEST_COLUMNS: &str = "id, company_id, code, amount, currency, status, rejection_count,
     description, provider_name, provider_bank_name, provider_bank_account, provider_country,
     created_at, updated_at";

pub(crate) fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<Request, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let company_id: String =
        row.try_get("company_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let code: String = row.try_get("code").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let amount_str: String =
        row.try_get("amount").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let currency: String =
        row.try_get("currency").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rejection_count: i64 =
        row.try_get("rejection_count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: Option<String> =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let provider_name: String =
        row.try_get("provider_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let provider_bank_name: Option<String> =
        row.try_get("provider_bank_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let provider_bank_account: Option<String> = row
        .try_get("provider_bank_account")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let provider_country: Option<String> =
        row.try_get("provider_country").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Request {
        id: RequestId(id),
        company_id: CompanyId(company_id),
        code,
        amount: parse_decimal("amount", &amount_str)?,
        currency,
        status: RequestStatus::parse(&status_str),
        rejection_count: rejection_count.max(0) as u32,
        description,
        provider: ProviderSnapshot {
            name: provider_name,
            bank_name: provider_bank_name,
            bank_account: provider_bank_account,
            country: provider_country,
        },
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl RequestRepository for SqlRequestRepository {
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM request WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_request(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, request: Request) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO request (id, company_id, code, amount, currency, status,
                                  rejection_count, description, provider_name,
                                  provider_bank_name, provider_bank_account, provider_country,
                                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 amount = excluded.amount,
                 currency = excluded.currency,
                 status = excluded.status,
                 rejection_count = excluded.rejection_count,
                 description = excluded.description,
                 updated_at = excluded.updated_at",
        )
        .bind(&request.id.0)
        .bind(&request.company_id.0)
        .bind(&request.code)
        .bind(request.amount.to_string())
        .bind(&request.currency)
        .bind(request.status.as_str())
        .bind(request.rejection_count as i64)
        .bind(&request.description)
        .bind(&request.provider.name)
        .bind(&request.provider.bank_name)
        .bind(&request.provider.bank_account)
        .bind(&request.provider.country)
        .bind(request.created_at.to_rfc3339())
        .bind(request.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Request>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM request ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_request).collect::<Result<Vec<_>, _>>()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use puente_core::domain::company::{Company, CompanyId};
    use puente_core::domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};

    use super::SqlRequestRepository;
    use crate::repositories::{CompanyRepository, RequestRepository, SqlCompanyRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    async fn insert_company(pool: &sqlx::SqlitePool, id: &str, name: &str) {
        let repo = SqlCompanyRepository::new(pool.clone());
        repo.save(Company {
            id: CompanyId(id.to_string()),
            name: name.to_string(),
            created_at: Utc::now(),
        })
        .await
        .expect("insert company");
    }

    fn sample_request(id: &str, company_id: &str, code: &str) -> Request {
        let now = Utc::now();
        Request {
            id: RequestId(id.to_string()),
            company_id: CompanyId(company_id.to_string()),
            code: code.to_string(),
            amount: Decimal::new(1_250_000, 2),
            currency: "USD".to_string(),
            status: RequestStatus::Pending,
            rejection_count: 0,
            description: Some("machine parts".to_string()),
            provider: ProviderSnapshot {
                name: "Ningbo Machinery".to_string(),
                bank_name: Some("Bank of China".to_string()),
                bank_account: Some("6217-0001".to_string()),
                country: Some("CN".to_string()),
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trips_amount_and_provider() {
        let pool = setup().await;
        insert_company(&pool, "CO-1", "Acme Trading").await;

        let repo = SqlRequestRepository::new(pool);
        repo.save(sample_request("RQ-1", "CO-1", "AT082601")).await.expect("save");

        let found = repo
            .find_by_id(&RequestId("RQ-1".to_string()))
            .await
            .expect("find")
            .expect("should exist");
        assert_eq!(found.amount, Decimal::new(1_250_000, 2));
        assert_eq!(found.provider.name, "Ningbo Machinery");
        assert_eq!(found.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn upsert_updates_status_and_rejection_count() {
        let pool = setup().await;
        insert_company(&pool, "CO-1", "Acme Trading").await;

        let repo = SqlRequestRepository::new(pool);
        let request = sample_request("RQ-1", "CO-1", "AT082601");
        repo.save(request.clone()).await.expect("save");

        let mut updated = request;
        updated.status = RequestStatus::Cancelled;
        updated.rejection_count = 3;
        updated.updated_at = Utc::now();
        repo.save(updated).await.expect("upsert");

        let found = repo
            .find_by_id(&RequestId("RQ-1".to_string()))
            .await
            .expect("find")
            .expect("should exist");
        assert_eq!(found.status, RequestStatus::Cancelled);
        assert_eq!(found.rejection_count, 3);
    }

    #[tokio::test]
    async fn duplicate_code_for_one_company_is_rejected() {
        let pool = setup().await;
        insert_company(&pool, "CO-1", "Acme Trading").await;

        let repo = SqlRequestRepository::new(pool);
        repo.save(sample_request("RQ-1", "CO-1", "AT082601")).await.expect("save");

        let duplicate = sample_request("RQ-2", "CO-1", "AT082601");
        assert!(repo.save(duplicate).await.is_err());
    }
}
