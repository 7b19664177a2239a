use sqlx::Row;

use puente_core::domain::company::{Company, CompanyId};

use super::{parse_timestamp, CompanyRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCompanyRepository {
    pool: DbPool,
}

impl SqlCompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_company(row: &sqlx::sqlite::SqliteRow) -> Result<Company, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Company {
        id: CompanyId(id),
        name,
        created_at: parse_timestamp("created_at", &created_at_str)?,
    })
}

#[async_trait::async_trait]
impl CompanyRepository for SqlCompanyRepository {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, created_at FROM company WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_company(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, company: Company) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO company (id, name, created_at)
             VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(&company.id.0)
        .bind(&company.name)
        .bind(company.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
