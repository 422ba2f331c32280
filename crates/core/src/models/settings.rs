use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::CoreError;

pub const DEFAULT_ACCOUNTS_FILE: &str = "investment_accounts.json";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;
pub const DEFAULT_REPORT_TITLE: &str = "Investment Report";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-nano";

/// SMTP login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

/// Delivery settings. Every field is optional at load time; a missing value
/// only fails the delivery call itself (see [`MailSettings::require`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailSettings {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub credentials: Option<SmtpCredentials>,
}

/// Mail settings with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMailSettings {
    pub from_address: String,
    pub to_address: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub credentials: SmtpCredentials,
}

impl MailSettings {
    /// Check that everything needed to send is configured.
    pub fn require(&self) -> Result<ResolvedMailSettings, CoreError> {
        fn field(value: &Option<String>, name: &str) -> Result<String, CoreError> {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| CoreError::Configuration(format!("{name} is not set")))
        }

        let credentials = self
            .credentials
            .clone()
            .ok_or_else(|| CoreError::Configuration("SMTP_USER / SMTP_PASS are not set".into()))?;

        Ok(ResolvedMailSettings {
            from_address: field(&self.from_address, "EMAIL_FROM")?,
            to_address: field(&self.to_address, "EMAIL_TO")?,
            smtp_host: field(&self.smtp_host, "SMTP_SERVER")?,
            smtp_port: self.smtp_port,
            credentials,
        })
    }
}

/// Settings for the chat-completions summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub request_timeout: Duration,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 1.0,
            max_tokens: 2000,
            top_p: 0.95,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Everything the report pipeline needs, resolved once at startup and passed
/// into the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Path of the JSON account document
    pub accounts_file: PathBuf,

    /// Heading of the rendered report (e.g., "Investment Report")
    pub report_title: String,

    pub mail: MailSettings,
    pub summarizer: SummarizerSettings,

    /// Per-provider timeout for a single price lookup
    pub lookup_timeout: Duration,

    /// How many price lookups may be in flight at once
    pub lookup_concurrency: usize,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accounts_file: PathBuf::from(DEFAULT_ACCOUNTS_FILE),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            mail: MailSettings {
                smtp_port: DEFAULT_SMTP_PORT,
                ..MailSettings::default()
            },
            summarizer: SummarizerSettings::default(),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    /// Blank values are treated as unset. Malformed numbers are rejected.
    pub fn from_vars<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(title) = var("REPORT_TITLE") {
            settings.report_title = title;
        }

        settings.mail.from_address = var("EMAIL_FROM");
        settings.mail.to_address = var("EMAIL_TO");
        settings.mail.smtp_host = var("SMTP_SERVER");
        if let Some(port) = var("SMTP_PORT") {
            settings.mail.smtp_port = parse_number("SMTP_PORT", &port)?;
        }
        settings.mail.credentials = match (var("SMTP_USER"), var("SMTP_PASS")) {
            (Some(username), Some(password)) => Some(SmtpCredentials { username, password }),
            _ => None,
        };

        settings.summarizer.api_key = var("OPENAI_API_KEY");
        if let Some(url) = var("OPENAI_BASE_URL") {
            settings.summarizer.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = var("OPENAI_MODEL") {
            settings.summarizer.model = model;
        }

        if let Some(secs) = var("PRICE_LOOKUP_TIMEOUT_SECS") {
            let secs: u64 = parse_number("PRICE_LOOKUP_TIMEOUT_SECS", &secs)?;
            settings.lookup_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = var("PRICE_LOOKUP_CONCURRENCY") {
            let n: usize = parse_number("PRICE_LOOKUP_CONCURRENCY", &n)?;
            settings.lookup_concurrency = n.max(1);
        }

        if let Some(key) = var("ALPHAVANTAGE_API_KEY") {
            settings.api_keys.insert("alphavantage".into(), key);
        }

        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Configuration(format!("{key} must be a number, got '{raw}'")))
}
