use sqlx::Row;

use puente_core::domain::contract::ContractId;
use puente_core::domain::payment::{Payment, PaymentId, PaymentKind, PaymentStatus};

use super::{parse_timestamp, PaymentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPaymentRepository {
    pool: DbPool,
}

impl SqlPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let contract_id: String =
        row.try_get("contract_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_str: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let payment_type: String =
        row.try_get("payment_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let documents_str: String =
        row.try_get("documents").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let review_notes: Option<String> =
        row.try_get("review_notes").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let documents: Vec<String> = serde_json::from_str(&documents_str)
        .map_err(|e| RepositoryError::Decode(format!("invalid documents json: {e}")))?;

    Ok(Payment {
        id: PaymentId(id),
        contract_id: ContractId(contract_id),
        status: PaymentStatus::parse(&status_str),
        kind: PaymentKind::parse(&payment_type),
        documents,
        review_notes,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl PaymentRepository for SqlPaymentRepository {
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, contract_id, status, payment_type, documents, review_notes,
                    created_at, updated_at
             FROM payment WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, payment: Payment) -> Result<(), RepositoryError> {
        let documents = serde_json::to_string(&payment.documents)
            .map_err(|e| RepositoryError::Decode(format!("unserializable documents: {e}")))?;

        sqlx::query(
            "INSERT INTO payment (id, contract_id, status, payment_type, documents,
                                  review_notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 status = excluded.status,
                 documents = excluded.documents,
                 review_notes = excluded.review_notes,
                 updated_at = excluded.updated_at",
        )
        .bind(&payment.id.0)
        .bind(&payment.contract_id.0)
        .bind(payment.status.as_str())
        .bind(payment.kind.as_str())
        .bind(documents)
        .bind(&payment.review_notes)
        .bind(payment.created_at.to_rfc3339())
        .bind(payment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_contract_id(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, contract_id, status, payment_type, documents, review_notes,
                    created_at, updated_at
             FROM payment WHERE contract_id = ? ORDER BY created_at ASC",
        )
        .bind(&contract_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect::<Result<Vec<_>, _>>()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use puente_core::domain::company::{Company, CompanyId};
    use puente_core::domain::contract::{Contract, ContractId, ContractStatus};
    use puente_core::domain::payment::{Payment, PaymentId, PaymentKind, PaymentStatus};
    use puente_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
    use puente_core::domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};

    use super::SqlPaymentRepository;
    use crate::repositories::{
        CompanyRepository, ContractRepository, PaymentRepository, QuotationRepository,
        RequestRepository, SqlCompanyRepository, SqlContractRepository, SqlQuotationRepository,
        SqlRequestRepository,
    };
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        insert_contract_graph(&pool).await;
        pool
    }

    async fn insert_contract_graph(pool: &sqlx::SqlitePool) {
        let now = Utc::now();
        SqlCompanyRepository::new(pool.clone())
            .save(Company {
                id: CompanyId("CO-1".to_string()),
                name: "Acme Trading".to_string(),
                created_at: now,
            })
            .await
            .expect("company");
        SqlRequestRepository::new(pool.clone())
            .save(Request {
                id: RequestId("RQ-1".to_string()),
                company_id: CompanyId("CO-1".to_string()),
                code: "AT082601".to_string(),
                amount: Decimal::new(400_000, 2),
                currency: "USD".to_string(),
                status: RequestStatus::Approved,
                rejection_count: 0,
                description: None,
                provider: ProviderSnapshot {
                    name: "Foshan Ceramics".to_string(),
                    bank_name: None,
                    bank_account: None,
                    country: Some("CN".to_string()),
                },
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("request");
        SqlQuotationRepository::new(pool.clone())
            .save(Quotation {
                id: QuotationId("QT-1".to_string()),
                request_id: RequestId("RQ-1".to_string()),
                code: "AT082601-Q1".to_string(),
                status: QuotationStatus::Accepted,
                base_amount: None,
                fees: None,
                taxes: None,
                total_amount: Some(Decimal::new(416_000, 2)),
                exchange_rate: None,
                amount_in_bs: None,
                management_service_bs: None,
                total_in_bs: None,
                valid_until: now + Duration::days(3),
                rejection_reason: None,
                response_notes: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("quotation");
        SqlContractRepository::new(pool.clone())
            .save(Contract {
                id: ContractId("CT-1".to_string()),
                request_id: RequestId("RQ-1".to_string()),
                quotation_id: QuotationId("QT-1".to_string()),
                code: "AT082601-C".to_string(),
                status: ContractStatus::Active,
                amount: Decimal::new(416_000, 2),
                currency: "USD".to_string(),
                start_date: None,
                end_date: None,
                additional_data: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("contract");
    }

    fn sample_payment(id: &str) -> Payment {
        let now = Utc::now();
        Payment {
            id: PaymentId(id.to_string()),
            contract_id: ContractId("CT-1".to_string()),
            status: PaymentStatus::Pending,
            kind: PaymentKind::ImporterToPlatform,
            documents: vec!["files/transfer-001.pdf".to_string()],
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trips_documents() {
        let pool = setup().await;
        let repo = SqlPaymentRepository::new(pool);

        repo.save(sample_payment("PAY-1")).await.expect("save");

        let found = repo
            .find_by_id(&PaymentId("PAY-1".to_string()))
            .await
            .expect("find")
            .expect("should exist");
        assert_eq!(found.documents, vec!["files/transfer-001.pdf".to_string()]);
        assert_eq!(found.kind, PaymentKind::ImporterToPlatform);
    }

    #[tokio::test]
    async fn find_by_contract_id_lists_payments() {
        let pool = setup().await;
        let repo = SqlPaymentRepository::new(pool);

        repo.save(sample_payment("PAY-1")).await.expect("save 1");
        let mut provider_leg = sample_payment("PAY-2");
        provider_leg.kind = PaymentKind::PlatformToProvider;
        repo.save(provider_leg).await.expect("save 2");

        let payments =
            repo.find_by_contract_id(&ContractId("CT-1".to_string())).await.expect("list");
        assert_eq!(payments.len(), 2);
    }

    #[tokio::test]
    async fn upsert_records_review_notes() {
        let pool = setup().await;
        let repo = SqlPaymentRepository::new(pool);

        let payment = sample_payment("PAY-1");
        repo.save(payment.clone()).await.expect("save");

        let mut reviewed = payment;
        reviewed.status = PaymentStatus::Reviewed;
        reviewed.review_notes = Some("amount matches the contract".to_string());
        reviewed.updated_at = Utc::now();
        repo.save(reviewed).await.expect("upsert");

        let found = repo
            .find_by_id(&PaymentId("PAY-1".to_string()))
            .await
            .expect("find")
            .expect("should exist");
        assert_eq!(found.status, PaymentStatus::Reviewed);
        assert!(found.review_notes.is_some());
    }
}
