pub mod cashier;
pub mod company;
pub mod contract;
pub mod payment;
pub mod quotation;
pub mod request;
