//! BankTech back-office suite: reconciliation, credit risk, transactions,
//! bulk payroll and dashboard desks over per-session state.

pub mod charts;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod event;
pub mod name_generator;
pub mod payroll;
pub mod reconciliation;
pub mod report;
pub mod risk;
pub mod rng;
pub mod sample;
pub mod session;
pub mod store;
pub mod table;
pub mod transactions;
pub mod types;
