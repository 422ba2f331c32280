use thiserror::Error;

/// Unified error type for the entire stock-report-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration / Account data ────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O ────────────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out waiting for {provider} to answer for {symbol}")]
    Timeout {
        provider: String,
        symbol: String,
    },

    #[error("No price provider registered")]
    NoProvider,

    #[error("Price data unavailable for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    // ── Account editing ─────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Stock {ticker} not found in account {account}")]
    StockNotFound {
        account: String,
        ticker: String,
    },

    // ── Collaborators ───────────────────────────────────────────────
    #[error("Report delivery failed: {0}")]
    Delivery(String),

    #[error("Summarizer failed: {0}")]
    Summarizer(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<lettre::transport::smtp::Error> for CoreError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        CoreError::Delivery(e.to_string())
    }
}

impl From<lettre::address::AddressError> for CoreError {
    fn from(e: lettre::address::AddressError) -> Self {
        CoreError::Configuration(format!("Invalid email address: {e}"))
    }
}

impl From<lettre::error::Error> for CoreError {
    fn from(e: lettre::error::Error) -> Self {
        CoreError::Delivery(format!("Failed to build message: {e}"))
    }
}
