use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use puente_core::domain::cashier::{
    CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId,
};
use puente_core::domain::company::{Company, CompanyId};
use puente_core::domain::contract::{Contract, ContractId};
use puente_core::domain::payment::{Payment, PaymentId};
use puente_core::domain::quotation::{Quotation, QuotationId};
use puente_core::domain::request::{Request, RequestId};

pub mod cashier;
pub mod company;
pub mod contract;
pub mod payment;
pub mod quotation;
pub mod request;

pub use cashier::{SqlCashierAccountRepository, SqlCashierTransactionRepository};
pub use company::SqlCompanyRepository;
pub use contract::SqlContractRepository;
pub use payment::SqlPaymentRepository;
pub use quotation::SqlQuotationRepository;
pub use request::SqlRequestRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

pub(crate) fn parse_decimal(
    column: &str,
    value: &str,
) -> Result<rust_decimal::Decimal, RepositoryError> {
    use std::str::FromStr;
    rust_decimal::Decimal::from_str(value).map_err(|error| {
        RepositoryError::Decode(format!("invalid decimal in column `{column}`: {error}"))
    })
}

pub(crate) fn parse_opt_decimal(
    column: &str,
    value: Option<String>,
) -> Result<Option<rust_decimal::Decimal>, RepositoryError> {
    value.as_deref().map(|raw| parse_decimal(column, raw)).transpose()
}

pub(crate) fn parse_timestamp(
    column: &str,
    value: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)).map_err(|error| {
        RepositoryError::Decode(format!("invalid timestamp in column `{column}`: {error}"))
    })
}

pub(crate) fn parse_opt_timestamp(
    column: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    value.as_deref().map(|raw| parse_timestamp(column, raw)).transpose()
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    async fn save(&self, company: Company) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>, RepositoryError>;
    async fn save(&self, request: Request) -> Result<(), RepositoryError>;
    async fn list(&self) -> Result<Vec<Request>, RepositoryError>;
}

#[async_trait]
pub trait QuotationRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, RepositoryError>;
    async fn save(&self, quotation: Quotation) -> Result<(), RepositoryError>;
    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<Quotation>, RepositoryError>;
}

#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError>;
    async fn save(&self, contract: Contract) -> Result<(), RepositoryError>;
    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<Contract>, RepositoryError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, RepositoryError>;
    async fn save(&self, payment: Payment) -> Result<(), RepositoryError>;
    async fn find_by_contract_id(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<Payment>, RepositoryError>;
}

#[async_trait]
pub trait CashierAccountRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &CashierAccountId,
    ) -> Result<Option<CashierAccount>, RepositoryError>;
    async fn save(&self, account: CashierAccount) -> Result<(), RepositoryError>;
    async fn list_for_cashier(
        &self,
        cashier_id: &str,
    ) -> Result<Vec<CashierAccount>, RepositoryError>;
    async fn transaction_count(&self, id: &CashierAccountId) -> Result<u64, RepositoryError>;
    /// Removes assignment links first, then the account row itself.
    async fn delete(&self, id: &CashierAccountId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CashierTransactionRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &CashierTransactionId,
    ) -> Result<Option<CashierTransaction>, RepositoryError>;
    async fn save(&self, transaction: CashierTransaction) -> Result<(), RepositoryError>;
    /// Transactions for one account assigned inside [start, end).
    async fn list_for_account_in_window(
        &self,
        account_id: &CashierAccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CashierTransaction>, RepositoryError>;
}
