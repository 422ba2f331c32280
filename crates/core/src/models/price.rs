use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily close (date → price) as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// The two most recent session closes for a ticker, or the fact that they
/// could not be obtained. Produced once per position per report cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub ticker: String,
    pub previous_close: Decimal,
    pub current_close: Decimal,
    pub available: bool,
}

impl PriceSample {
    pub fn available(ticker: impl Into<String>, previous_close: Decimal, current_close: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            previous_close,
            current_close,
            available: true,
        }
    }

    pub fn unavailable(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            previous_close: Decimal::ZERO,
            current_close: Decimal::ZERO,
            available: false,
        }
    }

    /// Build a sample from a provider history.
    ///
    /// Points may arrive unsorted and may repeat the last session (intraday
    /// rows). They are ordered by date, and for a repeated date the later row
    /// wins. The last two distinct dates give previous/current; fewer than two
    /// yields an unavailable sample.
    pub fn from_history(ticker: impl Into<String>, history: &[PricePoint]) -> Self {
        let mut points: Vec<&PricePoint> = history.iter().collect();
        // Stable sort keeps provider order for equal dates
        points.sort_by_key(|p| p.date);

        let mut sessions: Vec<&PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match sessions.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => sessions.push(point),
            }
        }

        match sessions.as_slice() {
            [.., previous, current] => Self::available(ticker, previous.close, current.close),
            _ => Self::unavailable(ticker),
        }
    }
}
