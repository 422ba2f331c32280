pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use tracing::{info, warn};

use models::{
    account::AccountBook,
    performance::PortfolioResult,
    report::ReportDocument,
    settings::Settings,
};
use providers::{
    openai::OpenAiSummarizer,
    registry::PriceProviderRegistry,
    smtp::SmtpMailer,
    traits::{PriceLookup, ReportDelivery, Summarizer},
};
use services::{
    performance_service::PerformanceService, price_service::PriceService,
    report_service::ReportRenderer,
};

/// Instructions handed to the summarizer along with the rendered report.
pub const ANALYST_SYSTEM_PROMPT: &str = "You are an expert stock analyst. When given a list of stocks with their daily price changes across multiple accounts, analyze all available data and provide a comprehensive summary of insights.
Identify which accounts and which individual stocks contributed most to gains or losses for the day.
Highlight notable trends, unusual movements, significant contributors, and any patterns that may help explain overall performance.
Present your analysis clearly, concisely, and in a way that is easy to act on.";

/// Heading of the section the summary is appended under.
pub const SUMMARY_HEADING: &str = "AI Generated Portfolio Analysis";

/// Whether the assembled report is handed to the delivery collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Send,
    /// Compute and render only (dry run)
    Skip,
}

/// What the summarizer contributed to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Generated(String),
    /// The failure text that was placed in the report instead
    Failed(String),
    /// No summarizer configured for this run
    Skipped,
}

impl SummaryOutcome {
    /// The text that ends up in the report, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryOutcome::Generated(text) | SummaryOutcome::Failed(text) => Some(text),
            SummaryOutcome::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Skipped,
    Failed(String),
}

/// Everything a report cycle produced. Collaborator failures are recorded
/// here instead of aborting the run.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub result: PortfolioResult,
    pub document: ReportDocument,
    pub subject: String,
    pub summary: SummaryOutcome,
    pub delivery: DeliveryOutcome,
}

/// Main entry point for the report pipeline.
///
/// Runs Calculator → Renderer → Summarizer → Delivery in that fixed order.
/// The calculator and renderer never fail; summarizer and delivery failures
/// are contained and turned into a degraded report.
pub struct ReportAssembler {
    performance_service: PerformanceService,
    renderer: ReportRenderer,
    lookup: Box<dyn PriceLookup>,
    summarizer: Option<Box<dyn Summarizer>>,
    delivery: Box<dyn ReportDelivery>,
}

impl std::fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("summarizer", &self.summarizer.as_ref().map(|s| s.name()))
            .field("delivery", &self.delivery.name())
            .finish()
    }
}

impl ReportAssembler {
    /// Wire up the default collaborators: Yahoo Finance (plus Alpha Vantage
    /// when a key is configured), the OpenAI summarizer and SMTP delivery.
    pub fn from_settings(settings: &Settings) -> Self {
        let registry = PriceProviderRegistry::new_with_defaults(&settings.api_keys);
        let price_service = PriceService::new(registry, settings.lookup_timeout);
        Self::new(
            settings,
            Box::new(price_service),
            Some(Box::new(OpenAiSummarizer::new(settings.summarizer.clone()))),
            Box::new(SmtpMailer::new(settings.mail.clone())),
        )
    }

    /// Build an assembler from explicit collaborators.
    pub fn new(
        settings: &Settings,
        lookup: Box<dyn PriceLookup>,
        summarizer: Option<Box<dyn Summarizer>>,
        delivery: Box<dyn ReportDelivery>,
    ) -> Self {
        Self {
            performance_service: PerformanceService::new(settings.lookup_concurrency),
            renderer: ReportRenderer::new(settings.report_title.clone()),
            lookup,
            summarizer,
            delivery,
        }
    }

    /// Drop the summarizer; reports go out without an analysis section.
    #[must_use]
    pub fn without_summary(mut self) -> Self {
        self.summarizer = None;
        self
    }

    /// Date as shown in the report header (e.g., "January 16, 2025").
    pub fn header_date(date: NaiveDate) -> String {
        date.format("%B %d, %Y").to_string()
    }

    /// Email subject for a report date.
    pub fn subject_for(date: NaiveDate) -> String {
        format!("Daily Stock Closing Prices for {}", date.format("%Y-%m-%d"))
    }

    // ── Pipeline stages ─────────────────────────────────────────────

    pub async fn compute(&self, accounts: &AccountBook) -> PortfolioResult {
        self.performance_service
            .compute(accounts, self.lookup.as_ref())
            .await
    }

    #[must_use]
    pub fn render(&self, result: &PortfolioResult, report_date: NaiveDate) -> ReportDocument {
        self.renderer.render(result, &Self::header_date(report_date))
    }

    #[must_use]
    pub fn render_text(&self, result: &PortfolioResult, report_date: NaiveDate) -> String {
        self.renderer
            .render_text(result, &Self::header_date(report_date))
    }

    /// Ask the summarizer for an analysis. Never fails: an error becomes the
    /// text that goes into the report.
    pub async fn summarize(&self, document: &ReportDocument) -> SummaryOutcome {
        let Some(summarizer) = &self.summarizer else {
            return SummaryOutcome::Skipped;
        };
        match summarizer
            .summarize(ANALYST_SYSTEM_PROMPT, document.as_str())
            .await
        {
            Ok(text) => {
                info!(summarizer = summarizer.name(), "Analysis generated");
                SummaryOutcome::Generated(text)
            }
            Err(e) => {
                let message =
                    format!("Skipping AI analysis due to error (likely missing credentials): {e}");
                warn!("{message}");
                SummaryOutcome::Failed(message)
            }
        }
    }

    /// Run one full report cycle.
    pub async fn run(
        &self,
        accounts: &AccountBook,
        report_date: NaiveDate,
        mode: DeliveryMode,
    ) -> ReportOutcome {
        info!(
            accounts = accounts.len(),
            positions = accounts.position_count(),
            date = %report_date,
            "Generating report"
        );

        let result = self.compute(accounts).await;
        let mut document = self.render(&result, report_date);

        let summary = self.summarize(&document).await;
        if let Some(text) = summary.text() {
            document.append_section(SUMMARY_HEADING, text);
        }

        let subject = Self::subject_for(report_date);
        let delivery = match mode {
            DeliveryMode::Skip => DeliveryOutcome::Skipped,
            DeliveryMode::Send => match self.delivery.send(&subject, document.as_str()).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(e) => {
                    warn!(delivery = self.delivery.name(), error = %e, "Error sending report");
                    DeliveryOutcome::Failed(e.to_string())
                }
            },
        };

        ReportOutcome {
            result,
            document,
            subject,
            summary,
            delivery,
        }
    }
}
