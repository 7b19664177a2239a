//! Quotation lifecycle decisions.
//!
//! Pure functions: they inspect entities and produce a decision for the
//! persistence layer to apply atomically. State machine for a quotation:
//!
//! ```text
//! DRAFT --publish--> SENT --accept--> ACCEPTED
//!                         --reject--> REJECTED  (counts toward the cap)
//!                         --expiry--> EXPIRED   (derived from valid_until)
//! ```
//!
//! ACCEPTED, REJECTED, and EXPIRED are terminal.

use chrono::{DateTime, Utc};

use crate::domain::contract::Contract;
use crate::domain::quotation::{Quotation, QuotationStatus};
use crate::domain::request::{Request, RequestStatus};
use crate::errors::DomainError;

/// Hard business policy: the third rejection cancels the request outright.
pub const QUOTATION_REJECTION_CAP: u32 = 3;

/// Minimum length of a trimmed rejection reason. Input-validation contract,
/// not advisory.
pub const MIN_REJECTION_REASON_CHARS: usize = 10;

/// Checks that a quotation can still be responded to at `now`.
pub fn ensure_respondable(quotation: &Quotation, now: DateTime<Utc>) -> Result<(), DomainError> {
    if quotation.is_expired(now) {
        return Err(DomainError::State(format!(
            "quotation `{}` expired at {}",
            quotation.code,
            quotation.valid_until.to_rfc3339()
        )));
    }
    if !matches!(quotation.status, QuotationStatus::Draft | QuotationStatus::Sent) {
        return Err(DomainError::State(format!(
            "quotation `{}` is {} and can no longer be responded to",
            quotation.code,
            quotation.status.as_str()
        )));
    }
    Ok(())
}

/// Decide an acceptance. Fails if the quotation is not respondable or the
/// request already has an accepted quotation (at most one per request, ever).
pub fn decide_acceptance(
    quotation: &Quotation,
    siblings: &[Quotation],
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    ensure_respondable(quotation, now)?;

    let already_accepted = siblings
        .iter()
        .any(|other| other.id != quotation.id && other.status == QuotationStatus::Accepted);
    if already_accepted {
        return Err(DomainError::Conflict(format!(
            "request `{}` already has an accepted quotation",
            quotation.request_id.0
        )));
    }

    Ok(())
}

/// Result of a rejection decision: the new counter value and whether the
/// cascade rule forces the request into CANCELLED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RejectionOutcome {
    pub new_rejection_count: u32,
    pub cancel_request: bool,
}

/// Decide a rejection. The reason is validated before any state is touched;
/// the caller applies the quotation update, the counter increment, and (when
/// `cancel_request` is set) the CANCELLED status in one transaction.
pub fn decide_rejection(
    quotation: &Quotation,
    request: &Request,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<RejectionOutcome, DomainError> {
    if reason.trim().chars().count() < MIN_REJECTION_REASON_CHARS {
        return Err(DomainError::Validation(format!(
            "rejection reason must be at least {MIN_REJECTION_REASON_CHARS} characters"
        )));
    }
    ensure_respondable(quotation, now)?;

    let new_rejection_count = request.rejection_count + 1;
    Ok(RejectionOutcome {
        new_rejection_count,
        cancel_request: new_rejection_count >= QUOTATION_REJECTION_CAP,
    })
}

/// Guard for issuing a fresh quotation against a request.
pub fn ensure_quotable(request: &Request, quotations: &[Quotation]) -> Result<(), DomainError> {
    if request.status.is_terminal() {
        return Err(DomainError::State(format!(
            "request `{}` is {} and accepts no further quotations",
            request.code,
            request.status.as_str()
        )));
    }
    if quotations.iter().any(|quotation| quotation.status == QuotationStatus::Accepted) {
        return Err(DomainError::Conflict(format!(
            "request `{}` already has an accepted quotation",
            request.code
        )));
    }
    Ok(())
}

/// Guard for generating the contract once a quotation has been accepted:
/// exactly one accepted quotation must exist and no contract may yet exist.
/// Returns the accepted quotation whose totals seed the contract.
pub fn decide_contract_creation<'a>(
    request: &Request,
    quotations: &'a [Quotation],
    existing_contract: Option<&Contract>,
) -> Result<&'a Quotation, DomainError> {
    if existing_contract.is_some() {
        return Err(DomainError::Conflict(format!(
            "request `{}` already has a contract",
            request.code
        )));
    }

    let accepted = quotations
        .iter()
        .find(|quotation| quotation.status == QuotationStatus::Accepted)
        .ok_or_else(|| {
            DomainError::Conflict(format!(
                "request `{}` has no accepted quotation to contract against",
                request.code
            ))
        })?;

    if accepted.total().is_none() {
        return Err(DomainError::State(format!(
            "accepted quotation `{}` carries no total amount",
            accepted.code
        )));
    }

    Ok(accepted)
}

/// Request status after a successful quotation acceptance.
pub fn request_status_after_acceptance(request: &Request) -> RequestStatus {
    match request.status {
        RequestStatus::Pending | RequestStatus::InReview => RequestStatus::Approved,
        other => other,
    }
}
