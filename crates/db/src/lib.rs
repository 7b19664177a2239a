pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod reports;
pub mod repositories;
pub mod services;

pub use connection::{connect, connect_from_config, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, SeedVerification};
pub use reports::{cashier_report, CashierReport, CashierReportFilter, CashierReportRow, CashierReportSummary};
pub use services::{
    AccountDailyUsage, CashierAccountPatch, CashierService, NewCashierAccount,
    NewCashierTransaction, NewQuotation, NewRequest, QuotationAction, QuotationResponse,
    RequestDetail, WorkflowService,
};
