use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use puente_core::accounting::DailyUsage;
use puente_core::domain::cashier::{CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId};
use puente_core::domain::quotation::QuotationId;
use puente_core::errors::DomainError;
use puente_db::services::{CashierAccountPatch, NewCashierAccount, NewCashierTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    pub cashier_id: String,
    pub name: String,
    pub daily_limit_bs: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PatchAccountBody {
    pub name: Option<String>,
    pub daily_limit_bs: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DailyUsageQuery {
    pub cashier_id: String,
    /// `YYYY-MM-DD` in the operating timezone; defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountDailyUsageView {
    pub account: CashierAccount,
    pub usage: DailyUsage,
}

#[derive(Debug, Deserialize)]
pub struct AssignTransactionBody {
    pub account_id: String,
    pub quotation_id: String,
    pub assigned_amount_bs: Decimal,
    pub suggested_exchange_rate: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SettleBody {
    pub delivered_usdt: Decimal,
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountBody>,
) -> Result<(StatusCode, Json<CashierAccount>), ApiError> {
    let account = state
        .cashier()
        .create_account(NewCashierAccount {
            cashier_id: body.cashier_id,
            name: body.name,
            daily_limit_bs: body.daily_limit_bs,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PatchAccountBody>,
) -> Result<Json<CashierAccount>, ApiError> {
    let account = state
        .cashier()
        .update_account(
            &CashierAccountId(id),
            CashierAccountPatch {
                name: body.name,
                daily_limit_bs: body.daily_limit_bs,
                active: body.active,
            },
        )
        .await?;
    Ok(Json(account))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.cashier().delete_account(&CashierAccountId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn daily_usage(
    State(state): State<AppState>,
    Query(query): Query<DailyUsageQuery>,
) -> Result<Json<Vec<AccountDailyUsageView>>, ApiError> {
    let date = query
        .date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                DomainError::Validation(format!("date must be YYYY-MM-DD, got `{raw}`"))
            })
        })
        .transpose()?;

    let usages = state.cashier().daily_usage(&query.cashier_id, date).await?;
    Ok(Json(
        usages
            .into_iter()
            .map(|entry| AccountDailyUsageView { account: entry.account, usage: entry.usage })
            .collect(),
    ))
}

pub async fn assign_transaction(
    State(state): State<AppState>,
    Json(body): Json<AssignTransactionBody>,
) -> Result<(StatusCode, Json<CashierTransaction>), ApiError> {
    let transaction = state
        .cashier()
        .assign_transaction(NewCashierTransaction {
            account_id: CashierAccountId(body.account_id),
            quotation_id: QuotationId(body.quotation_id),
            assigned_amount_bs: body.assigned_amount_bs,
            suggested_exchange_rate: body.suggested_exchange_rate,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn settle_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SettleBody>,
) -> Result<Json<CashierTransaction>, ApiError> {
    let transaction = state
        .cashier()
        .settle_transaction(&CashierTransactionId(id), body.delivered_usdt)
        .await?;
    Ok(Json(transaction))
}
