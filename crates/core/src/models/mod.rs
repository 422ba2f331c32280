pub mod account;
pub mod performance;
pub mod price;
pub mod report;
pub mod settings;
