use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quotation::QuotationId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CashierAccountId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CashierTransactionId(pub String);

/// A bank account a cashier receives Bs funds into. The daily limit is a
/// soft cap: accounting reports usage against it but never blocks an
/// assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashierAccount {
    pub id: CashierAccountId,
    pub cashier_id: String,
    pub name: String,
    pub daily_limit_bs: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashierTransactionStatus {
    Pending,
    InProgress,
    Completed,
}

impl CashierTransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETED" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

/// One assignment of Bs funds against a quotation, expected to be converted
/// to USDT and delivered to the provider. Counts toward the owning account's
/// daily usage for the calendar day of `assigned_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashierTransaction {
    pub id: CashierTransactionId,
    pub account_id: CashierAccountId,
    pub cashier_id: String,
    pub quotation_id: QuotationId,
    pub assigned_amount_bs: Decimal,
    pub suggested_exchange_rate: Decimal,
    pub expected_usdt: Decimal,
    pub delivered_usdt: Option<Decimal>,
    pub status: CashierTransactionStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
