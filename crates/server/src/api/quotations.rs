use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use puente_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
use puente_core::domain::request::{Request, RequestId, RequestStatus};
use puente_core::errors::DomainError;
use puente_db::services::{NewQuotation, QuotationAction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::ApiError;
use crate::notify::{dispatch, WorkflowEvent};

#[derive(Debug, Deserialize)]
pub struct IssueQuotationBody {
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

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub action: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuotationResponseView {
    pub quotation: Quotation,
    pub request: Request,
}

fn parse_action(raw: &str) -> Result<QuotationAction, ApiError> {
    match raw {
        "ACCEPTED" => Ok(QuotationAction::Accepted),
        "REJECTED" => Ok(QuotationAction::Rejected),
        other => Err(DomainError::Validation(format!(
            "action must be ACCEPTED or REJECTED, got `{other}`"
        ))
        .into()),
    }
}

pub async fn issue(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<IssueQuotationBody>,
) -> Result<(StatusCode, Json<Quotation>), ApiError> {
    let quotation = state
        .workflow()
        .issue_quotation(
            &RequestId(request_id),
            NewQuotation {
                base_amount: body.base_amount,
                fees: body.fees,
                taxes: body.taxes,
                total_amount: body.total_amount,
                exchange_rate: body.exchange_rate,
                amount_in_bs: body.amount_in_bs,
                management_service_bs: body.management_service_bs,
                total_in_bs: body.total_in_bs,
                valid_until: body.valid_until,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(quotation)))
}

pub async fn respond(
    State(state): State<AppState>,
    Path(quotation_id): Path<String>,
    Json(body): Json<RespondBody>,
) -> Result<Json<QuotationResponseView>, ApiError> {
    let action = parse_action(&body.action)?;
    let response = state
        .workflow()
        .respond_to_quotation(&QuotationId(quotation_id), action, body.notes.as_deref())
        .await?;

    let event = match response.quotation.status {
        QuotationStatus::Accepted => WorkflowEvent::QuotationAccepted {
            quotation_id: response.quotation.id.0.clone(),
            request_id: response.request.id.0.clone(),
        },
        _ => WorkflowEvent::QuotationRejected {
            quotation_id: response.quotation.id.0.clone(),
            request_id: response.request.id.0.clone(),
            request_cancelled: response.request.status == RequestStatus::Cancelled,
        },
    };
    dispatch(state.notifier.clone(), event);

    Ok(Json(QuotationResponseView { quotation: response.quotation, request: response.request }))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use chrono::{Duration, Utc};
    use puente_core::domain::quotation::QuotationStatus;
    use puente_core::domain::request::RequestStatus;
    use rust_decimal::Decimal;

    use crate::api::requests::{create, CreateRequestBody, ProviderBody};
    use crate::api::testing::state_with_company;
    use crate::api::AppState;

    use super::{issue, respond, IssueQuotationBody, RespondBody};

    async fn seed_request(state: &AppState) -> String {
        let (_, Json(view)) = create(
            State(state.clone()),
            Json(CreateRequestBody {
                company_id: "CO-1".to_string(),
                amount: Decimal::new(2_000_000, 2),
                currency: "USD".to_string(),
                description: None,
                provider: ProviderBody {
                    name: "Hangzhou Pumps".to_string(),
                    bank_name: None,
                    bank_account: None,
                    country: Some("CN".to_string()),
                },
            }),
        )
        .await
        .expect("request");
        view.request.id.0
    }

    fn quotation_body() -> IssueQuotationBody {
        IssueQuotationBody {
            base_amount: Some(Decimal::new(2_000_000, 2)),
            fees: Some(Decimal::new(60_000, 2)),
            taxes: Some(Decimal::new(20_000, 2)),
            total_amount: Some(Decimal::new(2_080_000, 2)),
            exchange_rate: None,
            amount_in_bs: None,
            management_service_bs: None,
            total_in_bs: None,
            valid_until: Utc::now() + Duration::days(2),
        }
    }

    #[tokio::test]
    async fn issue_returns_201_with_a_sequenced_code() {
        let state = state_with_company().await;
        let request_id = seed_request(&state).await;

        let (status, Json(quotation)) =
            issue(State(state), Path(request_id), Json(quotation_body()))
                .await
                .expect("issue");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(quotation.status, QuotationStatus::Sent);
        assert!(quotation.code.ends_with("-Q1"));
    }

    #[tokio::test]
    async fn acceptance_advances_the_request_in_the_response() {
        let state = state_with_company().await;
        let request_id = seed_request(&state).await;
        let (_, Json(quotation)) =
            issue(State(state.clone()), Path(request_id), Json(quotation_body()))
                .await
                .expect("issue");

        let Json(view) = respond(
            State(state),
            Path(quotation.id.0),
            Json(RespondBody { action: "ACCEPTED".to_string(), notes: Some("fair".to_string()) }),
        )
        .await
        .expect("respond");

        assert_eq!(view.quotation.status, QuotationStatus::Accepted);
        assert_eq!(view.request.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn unknown_action_is_a_validation_error() {
        let state = state_with_company().await;
        let request_id = seed_request(&state).await;
        let (_, Json(quotation)) =
            issue(State(state.clone()), Path(request_id), Json(quotation_body()))
                .await
                .expect("issue");

        let error = respond(
            State(state),
            Path(quotation.id.0),
            Json(RespondBody { action: "MAYBE".to_string(), notes: None }),
        )
        .await
        .expect_err("unknown action");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn short_rejection_reason_is_a_validation_error() {
        let state = state_with_company().await;
        let request_id = seed_request(&state).await;
        let (_, Json(quotation)) =
            issue(State(state.clone()), Path(request_id), Json(quotation_body()))
                .await
                .expect("issue");

        let error = respond(
            State(state),
            Path(quotation.id.0),
            Json(RespondBody {
                action: "REJECTED".to_string(),
                notes: Some("too short".to_string()),
            }),
        )
        .await
        .expect_err("9 characters");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
