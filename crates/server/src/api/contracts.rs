use axum::{extract::State, http::StatusCode, Json};
use puente_core::domain::contract::Contract;
use puente_core::domain::request::RequestId;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::ApiError;
use crate::notify::{dispatch, WorkflowEvent};

#[derive(Debug, Deserialize)]
pub struct AutoCreateBody {
    pub request_id: String,
}

pub async fn auto_create(
    State(state): State<AppState>,
    Json(body): Json<AutoCreateBody>,
) -> Result<(StatusCode, Json<Contract>), ApiError> {
    let contract = state.workflow().auto_create_contract(&RequestId(body.request_id)).await?;

    dispatch(
        state.notifier.clone(),
        WorkflowEvent::ContractCreated {
            contract_id: contract.id.0.clone(),
            request_id: contract.request_id.0.clone(),
        },
    );

    Ok((StatusCode::CREATED, Json(contract)))
}
