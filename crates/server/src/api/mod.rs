//! JSON API surface.
//!
//! - `POST /api/v1/requests`                          — create a payment request
//! - `GET  /api/v1/requests`                          — list requests with workflow position
//! - `GET  /api/v1/requests/{id}`                     — one request with its full graph
//! - `POST /api/v1/requests/{id}/quotations`          — issue a quotation
//! - `PUT  /api/v1/quotations/{id}`                   — accept or reject a quotation
//! - `POST /api/v1/contracts/auto-create`             — generate the draft contract
//! - `POST /api/v1/cashier-accounts`                  — register a cashier account
//! - `PATCH/DELETE /api/v1/cashier-accounts/{id}`     — update or remove an account
//! - `GET  /api/v1/cashier/accounts/daily-usage`      — live usage against daily limits
//! - `POST /api/v1/cashier-transactions`              — assign Bs funds to an account
//! - `PUT  /api/v1/cashier-transactions/{id}/settle`  — record the delivered USDT
//! - `GET  /api/v1/admin/cashier-reports`             — filtered report, JSON or CSV

pub mod cashier;
pub mod contracts;
pub mod quotations;
pub mod reports;
pub mod requests;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use puente_db::services::{CashierService, WorkflowService};
use puente_db::DbPool;

use crate::notify::{LogNotifier, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub utc_offset_minutes: i32,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(pool: DbPool, utc_offset_minutes: i32) -> Self {
        Self { pool, utc_offset_minutes, notifier: Arc::new(LogNotifier) }
    }

    pub fn workflow(&self) -> WorkflowService {
        WorkflowService::new(self.pool.clone())
    }

    pub fn cashier(&self) -> CashierService {
        CashierService::new(self.pool.clone(), self.utc_offset_minutes)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/requests", post(requests::create).get(requests::list))
        .route("/api/v1/requests/{id}", get(requests::detail))
        .route("/api/v1/requests/{id}/quotations", post(quotations::issue))
        .route("/api/v1/quotations/{id}", put(quotations::respond))
        .route("/api/v1/contracts/auto-create", post(contracts::auto_create))
        .route("/api/v1/cashier-accounts", post(cashier::create_account))
        .route(
            "/api/v1/cashier-accounts/{id}",
            patch(cashier::update_account).delete(cashier::delete_account),
        )
        .route("/api/v1/cashier/accounts/daily-usage", get(cashier::daily_usage))
        .route("/api/v1/cashier-transactions", post(cashier::assign_transaction))
        .route("/api/v1/cashier-transactions/{id}/settle", put(cashier::settle_transaction))
        .route("/api/v1/admin/cashier-reports", get(reports::cashier_reports))
        .with_state(state)
}
