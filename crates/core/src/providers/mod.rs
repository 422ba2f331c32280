pub mod registry;
pub mod traits;

// Market data
pub mod alphavantage;
pub mod yahoo_finance;

// Report collaborators
pub mod openai;
pub mod smtp;
