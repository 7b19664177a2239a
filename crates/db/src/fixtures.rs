use sqlx::{Executor, Row};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_REQUEST_IDS: &[&str] = &["rq-demo-001", "rq-demo-002"];
const SEED_TRANSACTION_IDS: &[&str] = &["tx-demo-001", "tx-demo-002"];

/// Deterministic demo dataset covering both ends of the workflow: a freshly
/// created request still awaiting its quotation, and a request with an
/// accepted quotation, an active contract, and cashier activity against it.
pub struct DemoSeedDataset;

#[derive(Clone, Debug)]
pub struct SeedCheck {
    pub name: &'static str,
    pub passed: bool,
}

#[derive(Clone, Debug)]
pub struct SeedVerification {
    pub checks: Vec<SeedCheck>,
}

impl SeedVerification {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }
}

impl DemoSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed.sql");

    pub async fn load(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let mut checks = Vec::new();

        let request_count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM request WHERE id IN (?, ?)",
        )
        .bind(SEED_REQUEST_IDS[0])
        .bind(SEED_REQUEST_IDS[1])
        .fetch_one(pool)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        checks.push(SeedCheck {
            name: "both demo requests present",
            passed: request_count == SEED_REQUEST_IDS.len() as i64,
        });

        let accepted_count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM quotation
             WHERE request_id = 'rq-demo-002' AND status = 'ACCEPTED'",
        )
        .fetch_one(pool)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        checks.push(SeedCheck {
            name: "exactly one accepted quotation on the contracted request",
            passed: accepted_count == 1,
        });

        let transaction_count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM cashier_transaction WHERE id IN (?, ?)",
        )
        .bind(SEED_TRANSACTION_IDS[0])
        .bind(SEED_TRANSACTION_IDS[1])
        .fetch_one(pool)
        .await?
        .try_get("count")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        checks.push(SeedCheck {
            name: "cashier transactions present",
            passed: transaction_count == SEED_TRANSACTION_IDS.len() as i64,
        });

        Ok(SeedVerification { checks })
    }
}

#[cfg(test)]
mod tests {
    use super::DemoSeedDataset;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn demo_seed_loads_and_verifies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        DemoSeedDataset::load(&pool).await.expect("load seed");
        let verification = DemoSeedDataset::verify(&pool).await.expect("verify seed");
        assert!(verification.all_passed(), "failed checks: {:?}", verification.checks);
    }
}
