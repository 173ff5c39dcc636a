pub mod aggregate;
pub mod audit;
pub mod cashflow;
pub mod ledger;
pub mod metrics;
