use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quotation::QuotationId;
use crate::domain::request::RequestId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Draft,
    Active,
    PaymentPending,
    PaymentReviewed,
    ProviderPaid,
    PaymentCompleted,
    Cancelled,
    Expired,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::PaymentReviewed => "PAYMENT_REVIEWED",
            Self::ProviderPaid => "PROVIDER_PAID",
            Self::PaymentCompleted => "PAYMENT_COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "ACTIVE" => Self::Active,
            "PAYMENT_PENDING" => Self::PaymentPending,
            "PAYMENT_REVIEWED" => Self::PaymentReviewed,
            "PROVIDER_PAID" => Self::ProviderPaid,
            "PAYMENT_COMPLETED" => Self::PaymentCompleted,
            "CANCELLED" => Self::Cancelled,
            "EXPIRED" => Self::Expired,
            _ => Self::Draft,
        }
    }

    /// Payment to the provider has started but not yet finished.
    pub fn is_paying_provider(&self) -> bool {
        matches!(self, Self::PaymentPending | Self::PaymentReviewed | Self::ProviderPaid)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub request_id: RequestId,
    pub quotation_id: QuotationId,
    pub code: String,
    pub status: ContractStatus,
    pub amount: Decimal,
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Free-form fields consumed only by document assembly, never by
    /// decision logic.
    pub additional_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
