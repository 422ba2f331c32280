pub mod account_service;
pub mod performance_service;
pub mod price_service;
pub mod report_service;
