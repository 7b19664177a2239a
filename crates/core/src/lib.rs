pub mod accounting;
pub mod codegen;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod workflow;

pub use accounting::{compute_daily_usage, day_bounds, local_date, usage_from_totals, DailyUsage};
pub use codegen::{company_prefix, month_year_suffix, next_sequence, request_code, SEQUENCE_CAP};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::cashier::{
    CashierAccount, CashierAccountId, CashierTransaction, CashierTransactionId,
    CashierTransactionStatus,
};
pub use domain::company::{Company, CompanyId};
pub use domain::contract::{Contract, ContractId, ContractStatus};
pub use domain::payment::{Payment, PaymentId, PaymentKind, PaymentStatus};
pub use domain::quotation::{Quotation, QuotationId, QuotationStatus};
pub use domain::request::{ProviderSnapshot, Request, RequestId, RequestStatus};
pub use errors::{ApplicationError, DomainError};
pub use lifecycle::{
    decide_acceptance, decide_contract_creation, decide_rejection, ensure_quotable,
    ensure_respondable, request_status_after_acceptance, RejectionOutcome,
    MIN_REJECTION_REASON_CHARS, QUOTATION_REJECTION_CAP,
};
pub use workflow::{next_action, progress_pct, workflow_step, NextAction, RequestGraph, WorkflowStep};
