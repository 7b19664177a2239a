use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use puente_core::domain::cashier::CashierTransactionStatus;
use puente_core::errors::{ApplicationError, DomainError};
use puente_db::{cashier_report, CashierReport, CashierReportFilter};
use serde::Deserialize;

use crate::api::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub status: Option<String>,
    pub quotation_id: Option<String>,
    pub company_id: Option<String>,
    /// RFC 3339 lower bound on `assigned_at`, inclusive.
    pub from: Option<String>,
    /// RFC 3339 upper bound on `assigned_at`, exclusive.
    pub to: Option<String>,
    /// `json` (default) or `csv`.
    pub format: Option<String>,
}

fn parse_status(raw: &str) -> Result<CashierTransactionStatus, ApiError> {
    match raw {
        "PENDING" => Ok(CashierTransactionStatus::Pending),
        "IN_PROGRESS" => Ok(CashierTransactionStatus::InProgress),
        "COMPLETED" => Ok(CashierTransactionStatus::Completed),
        other => Err(DomainError::Validation(format!(
            "status must be PENDING, IN_PROGRESS or COMPLETED, got `{other}`"
        ))
        .into()),
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            DomainError::Validation(format!("{field} must be an RFC 3339 timestamp, got `{raw}`"))
                .into()
        })
}

fn build_filter(query: &ReportQuery) -> Result<CashierReportFilter, ApiError> {
    Ok(CashierReportFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        quotation_id: query.quotation_id.clone(),
        company_id: query.company_id.clone(),
        from: query.from.as_deref().map(|raw| parse_bound("from", raw)).transpose()?,
        to: query.to.as_deref().map(|raw| parse_bound("to", raw)).transpose()?,
    })
}

fn render_csv(report: &CashierReport) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let serialization = |e: csv::Error| {
        ApiError(ApplicationError::Persistence(format!("csv serialization failed: {e}")))
    };

    writer
        .write_record([
            "transaction_id",
            "account_id",
            "account_name",
            "cashier_id",
            "quotation_id",
            "request_code",
            "company_id",
            "assigned_amount_bs",
            "expected_usdt",
            "delivered_usdt",
            "surplus_usdt",
            "status",
            "assigned_at",
            "completed_at",
        ])
        .map_err(serialization)?;

    for row in &report.rows {
        writer
            .write_record([
                row.transaction_id.clone(),
                row.account_id.clone(),
                row.account_name.clone(),
                row.cashier_id.clone(),
                row.quotation_id.clone(),
                row.request_code.clone(),
                row.company_id.clone(),
                row.assigned_amount_bs.to_string(),
                row.expected_usdt.to_string(),
                row.delivered_usdt.map(|d| d.to_string()).unwrap_or_default(),
                row.surplus_usdt.map(|d| d.to_string()).unwrap_or_default(),
                row.status.as_str().to_string(),
                row.assigned_at.to_rfc3339(),
                row.completed_at.map(|at| at.to_rfc3339()).unwrap_or_default(),
            ])
            .map_err(serialization)?;
    }

    writer.into_inner().map_err(|e| {
        ApiError(ApplicationError::Persistence(format!("csv serialization failed: {e}")))
    })
}

pub async fn cashier_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let filter = build_filter(&query)?;
    let report =
        cashier_report(&state.pool, &filter).await.map_err(ApplicationError::from)?;

    if query.format.as_deref() == Some("csv") {
        let body = render_csv(&report)?;
        return Ok(([(header::CONTENT_TYPE, "text/csv")], body).into_response());
    }

    Ok(Json(report).into_response())
}
