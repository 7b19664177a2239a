//! Transactional workflow services.
//!
//! Repositories stay single-entity; everything that must mutate more than one
//! row atomically (reject cascade, acceptance, contract creation) runs here
//! inside one sqlx transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;

use puente_core::accounting::{compute_daily_usage, day_bounds, local_date, DailyUsage};
use puente_core::codegen::request_code;
use puente_core::domain::cashier::{
    CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId,
    CashierTransactionStatus,
};
use puente_core::domain::company::CompanyId;
use puente_core::domain::contract::{Contract, ContractId, ContractStatus};
use puente_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
use puente_core::domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};
use puente_core::errors::{ApplicationError, DomainError};
use puente_core::lifecycle::{
    decide_acceptance, decide_contract_creation, decide_rejection, ensure_quotable,
    request_status_after_acceptance,
};

use crate::repositories::{
    contract::row_to_contract, quotation::row_to_quotation,
    request::row_to_request, CashierAccountRepository, CashierTransactionRepository,
    ContractRepository, QuotationRepository, RepositoryError, RequestRepository,
    SqlCashierAccountRepository, SqlCashierTransactionRepository, SqlContractRepository,
    SqlQuotationRepository, SqlRequestRepository,
};
use crate::DbPool;

fn persistence(error: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct NewRequest {
    pub company_id: CompanyId,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub provider: ProviderSnapshot,
}

#[derive(Clone, Debug)]
pub struct NewQuotation {
    pub base_amount: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub taxes: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub amount_in_bs: Option<Decimal>,
    pub management_service_bs: Option<Decimal>,
    pub total_in_bs: Option<Decimal>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuotationAction {
    Accepted,
    Rejected,
}

/// Result of a quotation response: the updated quotation plus the request it
/// may have cascaded onto.
#[derive(Clone, Debug)]
pub struct QuotationResponse {
    pub quotation: Quotation,
    pub request: Request,
}

/// Full entity graph for one request.
#[derive(Clone, Debug)]
pub struct RequestDetail {
    pub request: Request,
    pub quotations: Vec<Quotation>,
    pub contract: Option<Contract>,
}

pub struct WorkflowService {
    pool: DbPool,
}

impl WorkflowService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_request(&self, new: NewRequest) -> Result<Request, ApplicationError> {
        if new.amount <= Decimal::ZERO {
            return Err(
                DomainError::Validation("request amount must be positive".to_string()).into()
            );
        }
        if new.provider.name.trim().is_empty() {
            return Err(
                DomainError::Validation("provider name must not be empty".to_string()).into()
            );
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let company_row = sqlx::query("SELECT name FROM company WHERE id = ?")
            .bind(&new.company_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(persistence)?;
        let company_name: String = match company_row {
            Some(row) => row.try_get("name").map_err(persistence)?,
            None => {
                return Err(DomainError::not_found("company", new.company_id.0.clone()).into());
            }
        };

        let code_rows = sqlx::query("SELECT code FROM request WHERE company_id = ?")
            .bind(&new.company_id.0)
            .fetch_all(&mut *tx)
            .await
            .map_err(persistence)?;
        let existing_codes: Vec<String> = code_rows
            .iter()
            .map(|row| row.try_get::<String, _>("code"))
            .collect::<Result<_, _>>()
            .map_err(persistence)?;

        let code =
            request_code(&company_name, existing_codes.iter().map(String::as_str), now)?;

        let request = Request {
            id: RequestId(Uuid::new_v4().to_string()),
            company_id: new.company_id,
            code,
            amount: new.amount,
            currency: new.currency,
            status: RequestStatus::Pending,
            rejection_count: 0,
            description: new.description,
            provider: new.provider,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO request (id, company_id, code, amount, currency, status,
                                  rejection_count, description, provider_name,
                                  provider_bank_name, provider_bank_account, provider_country,
                                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
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
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;

        info!(
            event_name = "request_created",
            request_id = %request.id.0,
            code = %request.code,
            "request created"
        );
        Ok(request)
    }

    pub async fn request_detail(&self, id: &RequestId) -> Result<RequestDetail, ApplicationError> {
        let requests = SqlRequestRepository::new(self.pool.clone());
        let quotations = SqlQuotationRepository::new(self.pool.clone());
        let contracts = SqlContractRepository::new(self.pool.clone());

        let request = requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("request", id.0.clone()))?;
        let quotations = quotations.find_by_request_id(id).await?;
        let contract = contracts.find_by_request_id(id).await?;

        Ok(RequestDetail { request, quotations, contract })
    }

    pub async fn list_request_details(&self) -> Result<Vec<RequestDetail>, ApplicationError> {
        let requests = SqlRequestRepository::new(self.pool.clone());
        let quotations = SqlQuotationRepository::new(self.pool.clone());
        let contracts = SqlContractRepository::new(self.pool.clone());

        let mut details = Vec::new();
        for request in requests.list().await? {
            let request_quotations = quotations.find_by_request_id(&request.id).await?;
            let contract = contracts.find_by_request_id(&request.id).await?;
            details.push(RequestDetail { request, quotations: request_quotations, contract });
        }
        Ok(details)
    }

    pub async fn issue_quotation(
        &self,
        request_id: &RequestId,
        new: NewQuotation,
    ) -> Result<Quotation, ApplicationError> {
        let now = Utc::now();
        if new.valid_until <= now {
            return Err(
                DomainError::Validation("valid_until must lie in the future".to_string()).into()
            );
        }

        let requests = SqlRequestRepository::new(self.pool.clone());
        let quotation_repo = SqlQuotationRepository::new(self.pool.clone());

        let request = requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| DomainError::not_found("request", request_id.0.clone()))?;
        let siblings = quotation_repo.find_by_request_id(request_id).await?;
        ensure_quotable(&request, &siblings)?;

        let quotation = Quotation {
            id: QuotationId(Uuid::new_v4().to_string()),
            request_id: request.id.clone(),
            code: format!("{}-Q{}", request.code, siblings.len() + 1),
            status: QuotationStatus::Sent,
            base_amount: new.base_amount,
            fees: new.fees,
            taxes: new.taxes,
            total_amount: new.total_amount,
            exchange_rate: new.exchange_rate,
            amount_in_bs: new.amount_in_bs,
            management_service_bs: new.management_service_bs,
            total_in_bs: new.total_in_bs,
            valid_until: new.valid_until,
            rejection_reason: None,
            response_notes: None,
            created_at: now,
            updated_at: now,
        };
        quotation_repo.save(quotation.clone()).await?;

        info!(
            event_name = "quotation_issued",
            quotation_id = %quotation.id.0,
            request_id = %request.id.0,
            "quotation issued"
        );
        Ok(quotation)
    }

    /// Applies an importer's response. Accept and reject both touch the
    /// quotation and its request in one transaction; a third rejection
    /// cancels the request in the same commit.
    pub async fn respond_to_quotation(
        &self,
        quotation_id: &QuotationId,
        action: QuotationAction,
        notes: Option<&str>,
    ) -> Result<QuotationResponse, ApplicationError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let quotation_row = sqlx::query(
            "SELECT id, request_id, code, status, base_amount, fees, taxes, total_amount,
                    exchange_rate, amount_in_bs, management_service_bs, total_in_bs,
                    valid_until, rejection_reason, response_notes, created_at, updated_at
             FROM quotation WHERE id = ?",
        )
        .bind(&quotation_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;
        let quotation = match quotation_row {
            Some(ref row) => row_to_quotation(row)?,
            None => {
                return Err(DomainError::not_found("quotation", quotation_id.0.clone()).into());
            }
        };

        let request_row = sqlx::query(
            "SELECT id, company_id, code, amount, currency, status, rejection_count,
                    description, provider_name, provider_bank_name, provider_bank_account,
                    provider_country, created_at, updated_at
             FROM request WHERE id = ?",
        )
        .bind(&quotation.request_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;
        let request = match request_row {
            Some(ref row) => row_to_request(row)?,
            None => {
                return Err(
                    DomainError::not_found("request", quotation.request_id.0.clone()).into()
                );
            }
        };

        let response = match action {
            QuotationAction::Accepted => {
                let sibling_rows = sqlx::query(
                    "SELECT id, request_id, code, status, base_amount, fees, taxes, total_amount,
                            exchange_rate, amount_in_bs, management_service_bs, total_in_bs,
                            valid_until, rejection_reason, response_notes, created_at, updated_at
                     FROM quotation WHERE request_id = ?",
                )
                .bind(&quotation.request_id.0)
                .fetch_all(&mut *tx)
                .await
                .map_err(persistence)?;
                let siblings: Vec<Quotation> = sibling_rows
                    .iter()
                    .map(row_to_quotation)
                    .collect::<Result<_, _>>()?;

                decide_acceptance(&quotation, &siblings, now)?;

                let mut accepted = quotation;
                accepted.status = QuotationStatus::Accepted;
                accepted.response_notes = notes.map(str::to_string);
                accepted.updated_at = now;

                sqlx::query(
                    "UPDATE quotation SET status = ?, response_notes = ?, updated_at = ?
                     WHERE id = ?",
                )
                .bind(accepted.status.as_str())
                .bind(&accepted.response_notes)
                .bind(accepted.updated_at.to_rfc3339())
                .bind(&accepted.id.0)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?;

                let mut advanced = request;
                advanced.status = request_status_after_acceptance(&advanced);
                advanced.updated_at = now;

                sqlx::query("UPDATE request SET status = ?, updated_at = ? WHERE id = ?")
                    .bind(advanced.status.as_str())
                    .bind(advanced.updated_at.to_rfc3339())
                    .bind(&advanced.id.0)
                    .execute(&mut *tx)
                    .await
                    .map_err(persistence)?;

                QuotationResponse { quotation: accepted, request: advanced }
            }
            QuotationAction::Rejected => {
                let reason = notes.unwrap_or_default();
                let outcome = decide_rejection(&quotation, &request, reason, now)?;

                let mut rejected = quotation;
                rejected.status = QuotationStatus::Rejected;
                rejected.rejection_reason = Some(reason.trim().to_string());
                rejected.updated_at = now;

                sqlx::query(
                    "UPDATE quotation SET status = ?, rejection_reason = ?, updated_at = ?
                     WHERE id = ?",
                )
                .bind(rejected.status.as_str())
                .bind(&rejected.rejection_reason)
                .bind(rejected.updated_at.to_rfc3339())
                .bind(&rejected.id.0)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?;

                let mut counted = request;
                counted.rejection_count = outcome.new_rejection_count;
                if outcome.cancel_request {
                    counted.status = RequestStatus::Cancelled;
                }
                counted.updated_at = now;

                sqlx::query(
                    "UPDATE request SET status = ?, rejection_count = ?, updated_at = ?
                     WHERE id = ?",
                )
                .bind(counted.status.as_str())
                .bind(counted.rejection_count as i64)
                .bind(counted.updated_at.to_rfc3339())
                .bind(&counted.id.0)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?;

                if outcome.cancel_request {
                    warn!(
                        event_name = "request_cancelled_by_rejection_cap",
                        request_id = %counted.id.0,
                        rejection_count = counted.rejection_count,
                        "request cancelled after repeated rejections"
                    );
                }

                QuotationResponse { quotation: rejected, request: counted }
            }
        };

        tx.commit().await.map_err(persistence)?;

        info!(
            event_name = "quotation_responded",
            quotation_id = %response.quotation.id.0,
            status = response.quotation.status.as_str(),
            "quotation response recorded"
        );
        Ok(response)
    }

    /// Generates the DRAFT contract for a request whose quotation has been
    /// accepted. Amount and currency come from the accepted quotation.
    pub async fn auto_create_contract(
        &self,
        request_id: &RequestId,
    ) -> Result<Contract, ApplicationError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let request_row = sqlx::query(
            "SELECT id, company_id, code, amount, currency, status, rejection_count,
                    description, provider_name, provider_bank_name, provider_bank_account,
                    provider_country, created_at, updated_at
             FROM request WHERE id = ?",
        )
        .bind(&request_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;
        let request = match request_row {
            Some(ref row) => row_to_request(row)?,
            None => return Err(DomainError::not_found("request", request_id.0.clone()).into()),
        };

        let quotation_rows = sqlx::query(
            "SELECT id, request_id, code, status, base_amount, fees, taxes, total_amount,
                    exchange_rate, amount_in_bs, management_service_bs, total_in_bs,
                    valid_until, rejection_reason, response_notes, created_at, updated_at
             FROM quotation WHERE request_id = ?",
        )
        .bind(&request_id.0)
        .fetch_all(&mut *tx)
        .await
        .map_err(persistence)?;
        let quotations: Vec<Quotation> =
            quotation_rows.iter().map(row_to_quotation).collect::<Result<_, _>>()?;

        let contract_row = sqlx::query(
            "SELECT id, request_id, quotation_id, code, status, amount, currency,
                    start_date, end_date, additional_data, created_at, updated_at
             FROM contract WHERE request_id = ? ORDER BY created_at ASC LIMIT 1",
        )
        .bind(&request_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence)?;
        let existing = contract_row.as_ref().map(row_to_contract).transpose()?;

        let accepted = decide_contract_creation(&request, &quotations, existing.as_ref())?;
        let amount = accepted
            .total()
            .ok_or_else(|| DomainError::State("accepted quotation has no total".to_string()))?;
        let currency =
            if accepted.total_amount.is_some() { request.currency.clone() } else { "Bs".to_string() };

        let contract = Contract {
            id: ContractId(Uuid::new_v4().to_string()),
            request_id: request.id.clone(),
            quotation_id: accepted.id.clone(),
            code: format!("{}-C", request.code),
            status: ContractStatus::Draft,
            amount,
            currency,
            start_date: None,
            end_date: None,
            additional_data: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO contract (id, request_id, quotation_id, code, status, amount, currency,
                                   start_date, end_date, additional_data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL, NULL, ?, ?)",
        )
        .bind(&contract.id.0)
        .bind(&contract.request_id.0)
        .bind(&contract.quotation_id.0)
        .bind(&contract.code)
        .bind(contract.status.as_str())
        .bind(contract.amount.to_string())
        .bind(&contract.currency)
        .bind(contract.created_at.to_rfc3339())
        .bind(contract.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;

        info!(
            event_name = "contract_created",
            contract_id = %contract.id.0,
            request_id = %request.id.0,
            "contract created from accepted quotation"
        );
        Ok(contract)
    }
}

#[derive(Clone, Debug)]
pub struct NewCashierAccount {
    pub cashier_id: String,
    pub name: String,
    pub daily_limit_bs: Decimal,
}

#[derive(Clone, Debug, Default)]
pub struct CashierAccountPatch {
    pub name: Option<String>,
    pub daily_limit_bs: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct NewCashierTransaction {
    pub account_id: CashierAccountId,
    pub quotation_id: QuotationId,
    pub assigned_amount_bs: Decimal,
    pub suggested_exchange_rate: Decimal,
}

/// One account's usage for a single operating-day window.
#[derive(Clone, Debug)]
pub struct AccountDailyUsage {
    pub account: CashierAccount,
    pub usage: DailyUsage,
}

pub struct CashierService {
    pool: DbPool,
    utc_offset_minutes: i32,
}

impl CashierService {
    pub fn new(pool: DbPool, utc_offset_minutes: i32) -> Self {
        Self { pool, utc_offset_minutes }
    }

    pub async fn create_account(
        &self,
        new: NewCashierAccount,
    ) -> Result<CashierAccount, ApplicationError> {
        if new.name.trim().is_empty() {
            return Err(
                DomainError::Validation("account name must not be empty".to_string()).into()
            );
        }
        if new.daily_limit_bs < Decimal::ZERO {
            return Err(
                DomainError::Validation("daily limit must not be negative".to_string()).into()
            );
        }

        let now = Utc::now();
        let account = CashierAccount {
            id: CashierAccountId(Uuid::new_v4().to_string()),
            cashier_id: new.cashier_id,
            name: new.name,
            daily_limit_bs: new.daily_limit_bs,
            active: true,
            created_at: now,
            updated_at: now,
        };

        SqlCashierAccountRepository::new(self.pool.clone()).save(account.clone()).await?;

        info!(
            event_name = "cashier_account_created",
            account_id = %account.id.0,
            cashier_id = %account.cashier_id,
            "cashier account created"
        );
        Ok(account)
    }

    /// Partial update. A limit change affects future windows only; usage is
    /// always recomputed against the limit in force at read time.
    pub async fn update_account(
        &self,
        id: &CashierAccountId,
        patch: CashierAccountPatch,
    ) -> Result<CashierAccount, ApplicationError> {
        let repo = SqlCashierAccountRepository::new(self.pool.clone());
        let mut account = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("cashier account", id.0.clone()))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(
                    DomainError::Validation("account name must not be empty".to_string()).into()
                );
            }
            account.name = name;
        }
        if let Some(limit) = patch.daily_limit_bs {
            if limit < Decimal::ZERO {
                return Err(
                    DomainError::Validation("daily limit must not be negative".to_string()).into()
                );
            }
            account.daily_limit_bs = limit;
        }
        if let Some(active) = patch.active {
            account.active = active;
        }
        account.updated_at = Utc::now();

        repo.save(account.clone()).await?;
        Ok(account)
    }

    pub async fn delete_account(&self, id: &CashierAccountId) -> Result<(), ApplicationError> {
        let repo = SqlCashierAccountRepository::new(self.pool.clone());
        let account = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("cashier account", id.0.clone()))?;

        if repo.transaction_count(id).await? > 0 {
            return Err(DomainError::Conflict(
                "account has existing transactions, deactivate it instead".to_string(),
            )
            .into());
        }

        repo.delete(id).await?;
        info!(
            event_name = "cashier_account_deleted",
            account_id = %account.id.0,
            "cashier account deleted"
        );
        Ok(())
    }

    /// Live usage for every account the cashier owns, for the given operating
    /// date (defaults to today at the operating offset).
    pub async fn daily_usage(
        &self,
        cashier_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AccountDailyUsage>, ApplicationError> {
        let accounts = SqlCashierAccountRepository::new(self.pool.clone());
        let transactions = SqlCashierTransactionRepository::new(self.pool.clone());

        let date = date.unwrap_or_else(|| local_date(Utc::now(), self.utc_offset_minutes));
        let (start, end) = day_bounds(date, self.utc_offset_minutes);

        let mut usages = Vec::new();
        for account in accounts.list_for_cashier(cashier_id).await? {
            let in_window =
                transactions.list_for_account_in_window(&account.id, start, end).await?;
            let usage =
                compute_daily_usage(&account, &in_window, date, self.utc_offset_minutes);
            usages.push(AccountDailyUsage { account, usage });
        }
        Ok(usages)
    }

    /// Assigns Bs funds to an account against a quotation. The daily limit is
    /// reported elsewhere, never enforced here.
    pub async fn assign_transaction(
        &self,
        new: NewCashierTransaction,
    ) -> Result<CashierTransaction, ApplicationError> {
        if new.assigned_amount_bs <= Decimal::ZERO {
            return Err(
                DomainError::Validation("assigned amount must be positive".to_string()).into()
            );
        }
        if new.suggested_exchange_rate <= Decimal::ZERO {
            return Err(
                DomainError::Validation("exchange rate must be positive".to_string()).into()
            );
        }

        let accounts = SqlCashierAccountRepository::new(self.pool.clone());
        let account = accounts
            .find_by_id(&new.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("cashier account", new.account_id.0.clone()))?;
        if !account.active {
            return Err(DomainError::State(format!(
                "cashier account `{}` is inactive",
                account.id.0
            ))
            .into());
        }

        let quotation_exists = sqlx::query("SELECT 1 AS one FROM quotation WHERE id = ?")
            .bind(&new.quotation_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?
            .is_some();
        if !quotation_exists {
            return Err(DomainError::not_found("quotation", new.quotation_id.0.clone()).into());
        }

        let transaction = CashierTransaction {
            id: CashierTransactionId(Uuid::new_v4().to_string()),
            account_id: account.id.clone(),
            cashier_id: account.cashier_id.clone(),
            quotation_id: new.quotation_id,
            assigned_amount_bs: new.assigned_amount_bs,
            suggested_exchange_rate: new.suggested_exchange_rate,
            expected_usdt: (new.assigned_amount_bs / new.suggested_exchange_rate).round_dp(2),
            delivered_usdt: None,
            status: CashierTransactionStatus::Pending,
            assigned_at: Utc::now(),
            completed_at: None,
        };

        SqlCashierTransactionRepository::new(self.pool.clone()).save(transaction.clone()).await?;

        info!(
            event_name = "cashier_transaction_assigned",
            transaction_id = %transaction.id.0,
            account_id = %transaction.account_id.0,
            "cashier transaction assigned"
        );
        Ok(transaction)
    }

    /// Records the delivered USDT and closes the transaction.
    pub async fn settle_transaction(
        &self,
        id: &CashierTransactionId,
        delivered_usdt: Decimal,
    ) -> Result<CashierTransaction, ApplicationError> {
        if delivered_usdt < Decimal::ZERO {
            return Err(
                DomainError::Validation("delivered amount must not be negative".to_string()).into()
            );
        }

        let repo = SqlCashierTransactionRepository::new(self.pool.clone());
        let mut transaction = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("cashier transaction", id.0.clone()))?;

        if transaction.status == CashierTransactionStatus::Completed {
            return Err(DomainError::State(format!(
                "cashier transaction `{}` is already settled",
                transaction.id.0
            ))
            .into());
        }

        transaction.delivered_usdt = Some(delivered_usdt);
        transaction.status = CashierTransactionStatus::Completed;
        transaction.completed_at = Some(Utc::now());
        repo.save(transaction.clone()).await?;

        info!(
            event_name = "cashier_transaction_settled",
            transaction_id = %transaction.id.0,
            "cashier transaction settled"
        );
        Ok(transaction)
    }
}
