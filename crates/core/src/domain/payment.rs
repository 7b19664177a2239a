use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contract::ContractId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Reviewed,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "REVIEWED" => Self::Reviewed,
            "COMPLETED" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

/// Direction of the money movement the payment evidences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    ImporterToPlatform,
    PlatformToProvider,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImporterToPlatform => "IMPORTER_TO_PLATFORM",
            Self::PlatformToProvider => "PLATFORM_TO_PROVIDER",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "PLATFORM_TO_PROVIDER" => Self::PlatformToProvider,
            _ => Self::ImporterToPlatform,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub contract_id: ContractId,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
    /// References into external file storage for the uploaded proof.
    pub documents: Vec<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
