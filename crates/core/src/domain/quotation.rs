use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::request::RequestId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "SENT" => Self::Sent,
            "ACCEPTED" => Self::Accepted,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            _ => Self::Draft,
        }
    }
}

/// Priced proposal for a request. Carries either an invoice-style breakdown
/// (`base_amount`/`fees`/`taxes`/`total_amount`) or an exchange-rate
/// breakdown in Bs, depending on how the quotation was issued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub request_id: RequestId,
    pub code: String,
    pub status: QuotationStatus,
    pub base_amount: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub taxes: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub amount_in_bs: Option<Decimal>,
    pub management_service_bs: Option<Decimal>,
    pub total_in_bs: Option<Decimal>,
    pub valid_until: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub response_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    /// Expiry is derived, never stored: the instant `now` passes
    /// `valid_until` the quotation stops being respondable, whatever the
    /// stored status still says. Every respond-ability check goes through
    /// here so UI and API can never disagree.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    /// A quotation can be accepted or rejected only while it is still DRAFT
    /// or SENT and not past its validity window.
    pub fn is_respondable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, QuotationStatus::Draft | QuotationStatus::Sent)
            && !self.is_expired(now)
    }

    /// Grand total of whichever breakdown the quotation carries.
    pub fn total(&self) -> Option<Decimal> {
        self.total_amount.or(self.total_in_bs)
    }
}
