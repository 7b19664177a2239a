//! Admin cashier reporting: filtered transaction rows with per-row
//! surplus/shortage and summary totals. Aggregation happens in SQL; the
//! arithmetic on decoded decimals happens here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};

use puente_core::domain::cashier::CashierTransactionStatus;

use crate::repositories::{parse_decimal, parse_opt_decimal, parse_opt_timestamp, parse_timestamp, RepositoryError};
use crate::DbPool;

#[derive(Clone, Debug, Default)]
pub struct CashierReportFilter {
    pub status: Option<CashierTransactionStatus>,
    pub quotation_id: Option<String>,
    pub company_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashierReportRow {
    pub transaction_id: String,
    pub account_id: String,
    pub account_name: String,
    pub cashier_id: String,
    pub quotation_id: String,
    pub request_code: String,
    pub company_id: String,
    pub assigned_amount_bs: Decimal,
    pub expected_usdt: Decimal,
    pub delivered_usdt: Option<Decimal>,
    /// `delivered - expected`; absent until the transaction settles.
    pub surplus_usdt: Option<Decimal>,
    pub status: CashierTransactionStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashierReportSummary {
    pub transaction_count: u64,
    pub total_assigned_bs: Decimal,
    pub total_expected_usdt: Decimal,
    pub total_delivered_usdt: Decimal,
    /// Net surplus over settled transactions only.
    pub net_surplus_usdt: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashierReport {
    pub rows: Vec<CashierReportRow>,
    pub summary: CashierReportSummary,
}

pub async fn cashier_report(
    pool: &DbPool,
    filter: &CashierReportFilter,
) -> Result<CashierReport, RepositoryError> {
    let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
        "SELECT t.id AS transaction_id, t.account_id, a.name AS account_name, t.cashier_id,
                t.quotation_id, r.code AS request_code, r.company_id,
                t.assigned_amount_bs, t.expected_usdt, t.delivered_usdt, t.status,
                t.assigned_at, t.completed_at
         FROM cashier_transaction t
         JOIN cashier_account a ON a.id = t.account_id
         JOIN quotation q ON q.id = t.quotation_id
         JOIN request r ON r.id = q.request_id
         WHERE 1 = 1",
    );

    if let Some(status) = filter.status {
        builder.push(" AND t.status = ").push_bind(status.as_str());
    }
    if let Some(ref quotation_id) = filter.quotation_id {
        builder.push(" AND t.quotation_id = ").push_bind(quotation_id.clone());
    }
    if let Some(ref company_id) = filter.company_id {
        builder.push(" AND r.company_id = ").push_bind(company_id.clone());
    }
    if let Some(from) = filter.from {
        builder.push(" AND t.assigned_at >= ").push_bind(from.to_rfc3339());
    }
    if let Some(to) = filter.to {
        builder.push(" AND t.assigned_at < ").push_bind(to.to_rfc3339());
    }
    builder.push(" ORDER BY t.assigned_at ASC");

    let sqlite_rows = builder.build().fetch_all(pool).await?;

    let mut rows = Vec::with_capacity(sqlite_rows.len());
    let mut total_assigned_bs = Decimal::ZERO;
    let mut total_expected_usdt = Decimal::ZERO;
    let mut total_delivered_usdt = Decimal::ZERO;
    let mut net_surplus_usdt = Decimal::ZERO;

    for row in &sqlite_rows {
        let assigned_str: String = row
            .try_get("assigned_amount_bs")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let expected_str: String =
            row.try_get("expected_usdt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let delivered_str: Option<String> =
            row.try_get("delivered_usdt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let status_str: String =
            row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let assigned_at_str: String =
            row.try_get("assigned_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let completed_at: Option<String> =
            row.try_get("completed_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

        let assigned_amount_bs = parse_decimal("assigned_amount_bs", &assigned_str)?;
        let expected_usdt = parse_decimal("expected_usdt", &expected_str)?;
        let delivered_usdt = parse_opt_decimal("delivered_usdt", delivered_str)?;
        let surplus_usdt = delivered_usdt.map(|delivered| delivered - expected_usdt);

        total_assigned_bs += assigned_amount_bs;
        total_expected_usdt += expected_usdt;
        if let Some(delivered) = delivered_usdt {
            total_delivered_usdt += delivered;
        }
        if let Some(surplus) = surplus_usdt {
            net_surplus_usdt += surplus;
        }

        rows.push(CashierReportRow {
            transaction_id: row
                .try_get("transaction_id")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            account_id: row
                .try_get("account_id")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            account_name: row
                .try_get("account_name")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            cashier_id: row
                .try_get("cashier_id")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            quotation_id: row
                .try_get("quotation_id")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            request_code: row
                .try_get("request_code")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            company_id: row
                .try_get("company_id")
                .map_err(|e| RepositoryError::Decode(e.to_string()))?,
            assigned_amount_bs,
            expected_usdt,
            delivered_usdt,
            surplus_usdt,
            status: CashierTransactionStatus::parse(&status_str),
            assigned_at: parse_timestamp("assigned_at", &assigned_at_str)?,
            completed_at: parse_opt_timestamp("completed_at", completed_at)?,
        });
    }

    let summary = CashierReportSummary {
        transaction_count: rows.len() as u64,
        total_assigned_bs,
        total_expected_usdt,
        total_delivered_usdt,
        net_surplus_usdt,
    };

    Ok(CashierReport { rows, summary })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use puente_core::domain::cashier::CashierTransactionStatus;
    use puente_core::domain::company::{Company, CompanyId};
    use puente_core::domain::request::ProviderSnapshot;

    use super::{cashier_report, CashierReportFilter};
    use crate::repositories::{CompanyRepository, SqlCompanyRepository};
    use crate::services::{
        CashierService, NewCashierAccount, NewCashierTransaction, NewQuotation, NewRequest,
        WorkflowService,
    };
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCompanyRepository::new(pool.clone())
            .save(Company {
                id: CompanyId("CO-1".to_string()),
                name: "Acme Trading".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("seed company");
        pool
    }

    async fn seed_transactions(pool: &sqlx::SqlitePool) -> (String, String) {
        let workflow = WorkflowService::new(pool.clone());
        let cashier = CashierService::new(pool.clone(), -240);

        let request = workflow
            .create_request(NewRequest {
                company_id: CompanyId("CO-1".to_string()),
                amount: Decimal::new(500_000, 2),
                currency: "USD".to_string(),
                description: None,
                provider: ProviderSnapshot {
                    name: "Dalian Steel".to_string(),
                    bank_name: None,
                    bank_account: None,
                    country: Some("CN".to_string()),
                },
            })
            .await
            .expect("request");
        let quotation = workflow
            .issue_quotation(
                &request.id,
                NewQuotation {
                    base_amount: None,
                    fees: None,
                    taxes: None,
                    total_amount: Some(Decimal::new(520_000, 2)),
                    exchange_rate: None,
                    amount_in_bs: None,
                    management_service_bs: None,
                    total_in_bs: None,
                    valid_until: Utc::now() + Duration::days(2),
                },
            )
            .await
            .expect("quotation");

        let account = cashier
            .create_account(NewCashierAccount {
                cashier_id: "cashier-1".to_string(),
                name: "Banesco corriente".to_string(),
                daily_limit_bs: Decimal::new(10_000, 0),
            })
            .await
            .expect("account");

        let first = cashier
            .assign_transaction(NewCashierTransaction {
                account_id: account.id.clone(),
                quotation_id: quotation.id.clone(),
                assigned_amount_bs: Decimal::new(365, 0),
                suggested_exchange_rate: Decimal::new(36_50, 2),
            })
            .await
            .expect("assign 1");
        cashier
            .settle_transaction(&first.id, Decimal::new(10_40, 2))
            .await
            .expect("settle 1");

        cashier
            .assign_transaction(NewCashierTransaction {
                account_id: account.id,
                quotation_id: quotation.id.clone(),
                assigned_amount_bs: Decimal::new(730, 0),
                suggested_exchange_rate: Decimal::new(36_50, 2),
            })
            .await
            .expect("assign 2");

        (quotation.id.0, first.id.0)
    }

    #[tokio::test]
    async fn report_computes_surplus_and_totals() {
        let pool = setup().await;
        seed_transactions(&pool).await;

        let report = cashier_report(&pool, &CashierReportFilter::default())
            .await
            .expect("report");

        assert_eq!(report.summary.transaction_count, 2);
        assert_eq!(report.summary.total_assigned_bs, Decimal::new(1095, 0));
        assert_eq!(report.summary.total_expected_usdt, Decimal::new(30_00, 2));
        assert_eq!(report.summary.total_delivered_usdt, Decimal::new(10_40, 2));
        // Only the settled transaction contributes surplus: 10.40 - 10.00.
        assert_eq!(report.summary.net_surplus_usdt, Decimal::new(40, 2));

        let settled = report
            .rows
            .iter()
            .find(|row| row.status == CashierTransactionStatus::Completed)
            .expect("settled row");
        assert_eq!(settled.surplus_usdt, Some(Decimal::new(40, 2)));
        assert_eq!(settled.request_code.len(), 8);
    }

    #[tokio::test]
    async fn status_filter_narrows_the_rows() {
        let pool = setup().await;
        seed_transactions(&pool).await;

        let report = cashier_report(
            &pool,
            &CashierReportFilter {
                status: Some(CashierTransactionStatus::Pending),
                ..CashierReportFilter::default()
            },
        )
        .await
        .expect("report");

        assert_eq!(report.summary.transaction_count, 1);
        assert!(report.rows.iter().all(|row| row.status == CashierTransactionStatus::Pending));
    }

    #[tokio::test]
    async fn company_filter_excludes_other_companies() {
        let pool = setup().await;
        seed_transactions(&pool).await;

        let report = cashier_report(
            &pool,
            &CashierReportFilter {
                company_id: Some("CO-404".to_string()),
                ..CashierReportFilter::default()
            },
        )
        .await
        .expect("report");

        assert!(report.rows.is_empty());
        assert_eq!(report.summary.total_assigned_bs, Decimal::ZERO);
    }

    #[tokio::test]
    async fn date_window_is_half_open() {
        let pool = setup().await;
        seed_transactions(&pool).await;

        let report = cashier_report(
            &pool,
            &CashierReportFilter {
                from: Some(Utc::now() + Duration::hours(1)),
                ..CashierReportFilter::default()
            },
        )
        .await
        .expect("report");

        assert!(report.rows.is_empty());
    }
}
