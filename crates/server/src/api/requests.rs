use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use puente_core::domain::contract::Contract;
use puente_core::domain::quotation::Quotation;
use puente_core::domain::request::{ProviderSnapshot, Request, RequestId};
use puente_core::domain::company::CompanyId;
use puente_core::workflow::{
    next_action, progress_pct, workflow_step, NextAction, RequestGraph, WorkflowStep,
};
use puente_db::services::{NewRequest, RequestDetail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::ApiError;
use crate::notify::{dispatch, WorkflowEvent};

#[derive(Debug, Deserialize)]
pub struct ProviderBody {
    pub name: String,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub company_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub provider: ProviderBody,
}

/// Derived workflow position, recomputed on every read.
#[derive(Debug, Serialize)]
pub struct WorkflowView {
    pub step: WorkflowStep,
    pub step_number: u8,
    pub progress_pct: u8,
    pub next_action: NextAction,
}

#[derive(Debug, Serialize)]
pub struct RequestDetailView {
    pub request: Request,
    pub quotations: Vec<Quotation>,
    pub contract: Option<Contract>,
    pub workflow: WorkflowView,
}

pub(crate) fn detail_view(detail: RequestDetail) -> RequestDetailView {
    let graph = RequestGraph {
        request: &detail.request,
        quotations: &detail.quotations,
        contract: detail.contract.as_ref(),
    };
    let step = workflow_step(&graph);
    let workflow = WorkflowView {
        step,
        step_number: step.number(),
        progress_pct: progress_pct(step),
        next_action: next_action(step, &detail.request.id.0),
    };

    RequestDetailView {
        request: detail.request,
        quotations: detail.quotations,
        contract: detail.contract,
        workflow,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<RequestDetailView>), ApiError> {
    let request = state
        .workflow()
        .create_request(NewRequest {
            company_id: CompanyId(body.company_id),
            amount: body.amount,
            currency: body.currency,
            description: body.description,
            provider: ProviderSnapshot {
                name: body.provider.name,
                bank_name: body.provider.bank_name,
                bank_account: body.provider.bank_account,
                country: body.provider.country,
            },
        })
        .await?;

    dispatch(
        state.notifier.clone(),
        WorkflowEvent::RequestCreated {
            request_id: request.id.0.clone(),
            code: request.code.clone(),
        },
    );

    let detail = state.workflow().request_detail(&request.id).await?;
    Ok((StatusCode::CREATED, Json(detail_view(detail))))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestDetailView>, ApiError> {
    let detail = state.workflow().request_detail(&RequestId(id)).await?;
    Ok(Json(detail_view(detail)))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestDetailView>>, ApiError> {
    let details = state.workflow().list_request_details().await?;
    Ok(Json(details.into_iter().map(detail_view).collect()))
}
