//! Derives the workflow position of a request from its entity graph.
//!
//! The step is a computed projection, never a stored column: the furthest
//! condition that holds wins, checked in explicit precedence order so a
//! contract existing always implies at least step 3 no matter what the
//! quotation collection looks like.

use serde::{Deserialize, Serialize};

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::quotation::{Quotation, QuotationStatus};
use crate::domain::request::{Request, RequestStatus};

/// Position of a request in the five-step import-payment workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    AwaitingQuotation,
    AwaitingContract,
    ContractActive,
    PayingProvider,
    Completed,
}

impl WorkflowStep {
    pub fn number(&self) -> u8 {
        match self {
            Self::AwaitingQuotation => 1,
            Self::AwaitingContract => 2,
            Self::ContractActive => 3,
            Self::PayingProvider => 4,
            Self::Completed => 5,
        }
    }
}

/// User-facing call to action for the current step. Step 1 has no `href`:
/// there is nothing the importer can do but wait for a quotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub label: String,
    pub href: Option<String>,
}

/// Everything the engine needs to place a request: the request itself, all
/// of its quotations, and the first (active) contract if one exists.
#[derive(Clone, Debug)]
pub struct RequestGraph<'a> {
    pub request: &'a Request,
    pub quotations: &'a [Quotation],
    pub contract: Option<&'a Contract>,
}

pub fn workflow_step(graph: &RequestGraph<'_>) -> WorkflowStep {
    // Later conditions supersede earlier ones; evaluate from the end.
    if graph.request.status == RequestStatus::Completed {
        return WorkflowStep::Completed;
    }

    if let Some(contract) = graph.contract {
        return match contract.status {
            ContractStatus::PaymentCompleted => WorkflowStep::Completed,
            status if status.is_paying_provider() => WorkflowStep::PayingProvider,
            _ => WorkflowStep::ContractActive,
        };
    }

    let has_accepted =
        graph.quotations.iter().any(|quotation| quotation.status == QuotationStatus::Accepted);
    if has_accepted {
        return WorkflowStep::AwaitingContract;
    }

    WorkflowStep::AwaitingQuotation
}

pub fn next_action(step: WorkflowStep, request_id: &str) -> NextAction {
    match step {
        WorkflowStep::AwaitingQuotation => NextAction {
            label: "Waiting for a quotation from the platform".to_string(),
            href: None,
        },
        WorkflowStep::AwaitingContract => NextAction {
            label: "Review and sign the generated contract".to_string(),
            href: Some(format!("/requests/{request_id}/contract")),
        },
        WorkflowStep::ContractActive => NextAction {
            label: "Upload your payment proof".to_string(),
            href: Some(format!("/requests/{request_id}/payments/new")),
        },
        WorkflowStep::PayingProvider => NextAction {
            label: "Track the provider payout".to_string(),
            href: Some(format!("/requests/{request_id}/payments")),
        },
        WorkflowStep::Completed => NextAction {
            label: "View the completed request".to_string(),
            href: Some(format!("/requests/{request_id}")),
        },
    }
}

/// Display-only completion percentage. Monotonic in the step and exactly
/// 100 at step 5.
pub fn progress_pct(step: WorkflowStep) -> u8 {
    step.number() * 20
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use crate::domain::company::CompanyId;
    use crate::domain::contract::{Contract, ContractId, ContractStatus};
    use crate::domain::quotation::{Quotation, QuotationId, QuotationStatus};
    use crate::domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};

    use super::{next_action, progress_pct, workflow_step, RequestGraph, WorkflowStep};

    fn request(status: RequestStatus) -> Request {
        let now = Utc::now();
        Request {
            id: RequestId("RQ-1".to_string()),
            company_id: CompanyId("CO-1".to_string()),
            code: "AT082601".to_string(),
            amount: Decimal::new(1_500_000, 2),
            currency: "USD".to_string(),
            status,
            rejection_count: 0,
            description: None,
            provider: ProviderSnapshot {
                name: "Shenzhen Electronics Ltd".to_string(),
                bank_name: None,
                bank_account: None,
                country: Some("CN".to_string()),
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn quotation(status: QuotationStatus) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: QuotationId("QT-1".to_string()),
            request_id: RequestId("RQ-1".to_string()),
            code: "AT082601-Q1".to_string(),
            status,
            base_amount: None,
            fees: None,
            taxes: None,
            total_amount: Some(Decimal::new(1_560_000, 2)),
            exchange_rate: None,
            amount_in_bs: None,
            management_service_bs: None,
            total_in_bs: None,
            valid_until: now + Duration::days(3),
            rejection_reason: None,
            response_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn contract(status: ContractStatus) -> Contract {
        let now = Utc::now();
        Contract {
            id: ContractId("CT-1".to_string()),
            request_id: RequestId("RQ-1".to_string()),
            quotation_id: QuotationId("QT-1".to_string()),
            code: "AT082601-C".to_string(),
            status,
            amount: Decimal::new(1_560_000, 2),
            currency: "USD".to_string(),
            start_date: None,
            end_date: None,
            additional_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn no_accepted_quotation_is_step_one() {
        let request = request(RequestStatus::Pending);
        let quotations = [quotation(QuotationStatus::Sent)];
        let graph = RequestGraph { request: &request, quotations: &quotations, contract: None };
        assert_eq!(workflow_step(&graph), WorkflowStep::AwaitingQuotation);
    }

    #[test]
    fn accepted_quotation_without_contract_is_step_two() {
        let request = request(RequestStatus::Approved);
        let quotations = [quotation(QuotationStatus::Rejected), quotation(QuotationStatus::Accepted)];
        let graph = RequestGraph { request: &request, quotations: &quotations, contract: None };
        assert_eq!(workflow_step(&graph), WorkflowStep::AwaitingContract);
    }

    #[test]
    fn draft_or_active_contract_is_step_three() {
        let request = request(RequestStatus::Approved);
        let quotations = [quotation(QuotationStatus::Accepted)];
        for status in [ContractStatus::Draft, ContractStatus::Active] {
            let contract = contract(status);
            let graph = RequestGraph {
                request: &request,
                quotations: &quotations,
                contract: Some(&contract),
            };
            assert_eq!(workflow_step(&graph), WorkflowStep::ContractActive);
        }
    }

    #[test]
    fn provider_payment_statuses_are_step_four() {
        let request = request(RequestStatus::Approved);
        let quotations = [quotation(QuotationStatus::Accepted)];
        for status in [
            ContractStatus::PaymentPending,
            ContractStatus::PaymentReviewed,
            ContractStatus::ProviderPaid,
        ] {
            let contract = contract(status);
            let graph = RequestGraph {
                request: &request,
                quotations: &quotations,
                contract: Some(&contract),
            };
            assert_eq!(workflow_step(&graph), WorkflowStep::PayingProvider);
        }
    }

    #[test]
    fn payment_completed_contract_is_step_five() {
        let request = request(RequestStatus::Approved);
        let quotations = [quotation(QuotationStatus::Accepted)];
        let contract = contract(ContractStatus::PaymentCompleted);
        let graph =
            RequestGraph { request: &request, quotations: &quotations, contract: Some(&contract) };
        assert_eq!(workflow_step(&graph), WorkflowStep::Completed);
    }

    #[test]
    fn completed_request_is_step_five_even_without_contract() {
        let request = request(RequestStatus::Completed);
        let graph = RequestGraph { request: &request, quotations: &[], contract: None };
        assert_eq!(workflow_step(&graph), WorkflowStep::Completed);
    }

    #[test]
    fn contract_presence_supersedes_quotation_state() {
        // Even with no accepted quotation recorded, an existing contract
        // places the request at step 3 or beyond.
        let request = request(RequestStatus::Approved);
        let quotations = [quotation(QuotationStatus::Sent)];
        let contract = contract(ContractStatus::Active);
        let graph =
            RequestGraph { request: &request, quotations: &quotations, contract: Some(&contract) };
        assert_eq!(workflow_step(&graph), WorkflowStep::ContractActive);
    }

    #[test]
    fn progress_is_monotonic_and_reaches_exactly_one_hundred() {
        let steps = [
            WorkflowStep::AwaitingQuotation,
            WorkflowStep::AwaitingContract,
            WorkflowStep::ContractActive,
            WorkflowStep::PayingProvider,
            WorkflowStep::Completed,
        ];
        let mut previous = 0;
        for step in steps {
            let pct = progress_pct(step);
            assert!(pct > previous, "progress must never decrease");
            previous = pct;
        }
        assert_eq!(progress_pct(WorkflowStep::Completed), 100);
    }

    #[test]
    fn step_one_action_has_no_href() {
        let action = next_action(WorkflowStep::AwaitingQuotation, "RQ-1");
        assert!(action.href.is_none());

        let action = next_action(WorkflowStep::AwaitingContract, "RQ-1");
        assert_eq!(action.href.as_deref(), Some("/requests/RQ-1/contract"));
    }
}
