use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::company::CompanyId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    InReview,
    Approved,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InReview => "IN_REVIEW",
            Self::Approved => "APPROVED",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "IN_REVIEW" => Self::InReview,
            "APPROVED" => Self::Approved,
            "COMPLETED" => Self::Completed,
            "REJECTED" => Self::Rejected,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Terminal requests accept no further quotations or transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }
}

/// Banking details of the foreign payee, snapshotted onto the request at
/// creation time so later provider edits do not rewrite history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub name: String,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub company_id: CompanyId,
    pub code: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: RequestStatus,
    pub rejection_count: u32,
    pub description: Option<String>,
    pub provider: ProviderSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::RequestStatus;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InReview,
            RequestStatus::Approved,
            RequestStatus::Completed,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn cancelled_requests_are_terminal() {
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::InReview.is_terminal());
    }
}
