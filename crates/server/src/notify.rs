//! Fire-and-forget workflow notifications. Delivery happens after the
//! database commit and a failure is logged, never propagated to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowEvent {
    RequestCreated { request_id: String, code: String },
    QuotationAccepted { quotation_id: String, request_id: String },
    QuotationRejected { quotation_id: String, request_id: String, request_cancelled: bool },
    ContractCreated { contract_id: String, request_id: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: WorkflowEvent) -> Result<(), String>;
}

/// Default notifier: structured log lines only. A real channel (email,
/// Telegram) slots in behind the same trait.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: WorkflowEvent) -> Result<(), String> {
        match event {
            WorkflowEvent::RequestCreated { request_id, code } => {
                info!(
                    event_name = "notify_request_created",
                    request_id = %request_id,
                    code = %code,
                    "request created notification"
                );
            }
            WorkflowEvent::QuotationAccepted { quotation_id, request_id } => {
                info!(
                    event_name = "notify_quotation_accepted",
                    quotation_id = %quotation_id,
                    request_id = %request_id,
                    "quotation accepted notification"
                );
            }
            WorkflowEvent::QuotationRejected { quotation_id, request_id, request_cancelled } => {
                info!(
                    event_name = "notify_quotation_rejected",
                    quotation_id = %quotation_id,
                    request_id = %request_id,
                    request_cancelled,
                    "quotation rejected notification"
                );
            }
            WorkflowEvent::ContractCreated { contract_id, request_id } => {
                info!(
                    event_name = "notify_contract_created",
                    contract_id = %contract_id,
                    request_id = %request_id,
                    "contract created notification"
                );
            }
        }
        Ok(())
    }
}

pub fn dispatch(notifier: Arc<dyn Notifier>, event: WorkflowEvent) {
    tokio::spawn(async move {
        if let Err(detail) = notifier.notify(event).await {
            warn!(
                event_name = "notification_delivery_failed",
                detail = %detail,
                "workflow notification dropped"
            );
        }
    });
}
