use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

use crate::models::performance::{AccountResult, PortfolioResult, StockResult};
use crate::models::report::{escape_html, ReportDocument};

/// Shown in place of every derived field of a stock without price data.
pub const NO_DATA: &str = "No data";

pub const DISCLAIMER_LINES: [&str; 2] = [
    "Stock prices and changes are based on closing prices and may contain discrepancies.",
    "After-hours trading may result in different current prices. Please verify all information before making any decisions.",
];

const COLUMNS: [&str; 5] = [
    "Symbol",
    "Stock Price",
    "# of Stocks",
    "Today's % Gain/Loss",
    "Day's Change",
];

/// Round to cents, half away from zero, always two fractional digits.
/// A value that rounds to zero prints as "0.00", never "-0.00".
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{rounded:.2}")
}

/// Two fractional digits followed by "%".
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_money(value))
}

/// Renders a [`PortfolioResult`] as the HTML email body or as a console table.
///
/// Both renderings are pure: the same result and date always produce the
/// same bytes.
pub struct ReportRenderer {
    title: String,
}

impl ReportRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn render(&self, result: &PortfolioResult, report_date: &str) -> ReportDocument {
        let mut html = String::new();

        let _ = writeln!(html, "<h2>{}</h2>", escape_html(&self.title));
        let _ = writeln!(
            html,
            "<p><strong>Report Generated on {}</strong></p>",
            escape_html(report_date)
        );
        html.push_str("<br>\n");

        for account in &result.accounts {
            Self::render_account_html(&mut html, account);
        }

        let _ = writeln!(
            html,
            "<h3>Overall Change Across all Accounts: {}</h3>",
            format_money(result.total_change)
        );
        html.push_str("<br>\n");
        let _ = writeln!(
            html,
            "<p><em><strong>Disclaimer:</strong> {}<br>\n{}</em></p>",
            DISCLAIMER_LINES[0], DISCLAIMER_LINES[1]
        );

        ReportDocument::new(html)
    }

    fn render_account_html(html: &mut String, account: &AccountResult) {
        let _ = writeln!(html, "<h3>Account: {}</h3>", escape_html(&account.name));
        html.push_str("<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\n  <tr>\n");
        for column in COLUMNS {
            let _ = writeln!(html, "    <th>{column}</th>");
        }
        html.push_str("  </tr>\n");

        for stock in &account.stocks {
            let cells = Self::cells(stock);
            html.push_str("  <tr>");
            for cell in &cells {
                let _ = write!(html, "<td>{}</td>", escape_html(cell));
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</table>\n");
        let _ = writeln!(
            html,
            "<p><b>Today's Change: {}</b></p>",
            format_money(account.total_change)
        );
        html.push_str("<br>\n");
    }

    /// Row cells: ticker, price, quantity, percent, money change.
    fn cells(stock: &StockResult) -> [String; 5] {
        if stock.available {
            [
                stock.ticker.clone(),
                format_money(stock.current_close),
                stock.quantity.to_string(),
                format_percent(stock.percent_change),
                format_money(stock.money_change),
            ]
        } else {
            [
                stock.ticker.clone(),
                NO_DATA.to_string(),
                stock.quantity.to_string(),
                NO_DATA.to_string(),
                NO_DATA.to_string(),
            ]
        }
    }

    /// Plain-text rendering for the console, one aligned table per account.
    pub fn render_text(&self, result: &PortfolioResult, report_date: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "Report Generated for {report_date}");

        for account in &result.accounts {
            let _ = writeln!(out, "\nAccount: {}", account.name);
            Self::push_text_row(&mut out, &COLUMNS.map(str::to_string));
            for stock in &account.stocks {
                Self::push_text_row(&mut out, &Self::cells(stock));
            }
            let _ = writeln!(
                out,
                "Account Total Change: {}",
                format_money(account.total_change)
            );
        }

        let _ = writeln!(
            out,
            "\nOverall Change Across all Accounts: {}",
            format_money(result.total_change)
        );
        let _ = writeln!(out, "\nDisclaimer: {}", DISCLAIMER_LINES[0]);
        let _ = writeln!(out, "{}", DISCLAIMER_LINES[1]);
        out
    }

    fn push_text_row(out: &mut String, cells: &[String; 5]) {
        let line = format!(
            "{:<10} {:<14} {:<12} {:<20} {}",
            cells[0], cells[1], cells[2], cells[3], cells[4]
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(crate::models::settings::DEFAULT_REPORT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(format_money(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_money(Decimal::new(-12345, 3)), "-12.35");
        assert_eq!(format_money(Decimal::new(5, 0)), "5.00");
    }

    #[test]
    fn tiny_negative_prints_as_zero() {
        assert_eq!(format_money(Decimal::new(-1, 3)), "0.00");
    }

    #[test]
    fn percent_has_marker() {
        assert_eq!(format_percent(Decimal::new(-250, 2)), "-2.50%");
    }
}
