//! Summary Formatter
//!
//! Renders summaries, account details and failures as chat attachments.

use crate::chat::Attachment;
use crate::model::{Account, Summary};

/// Accent for a portfolio worth more than was invested
pub const POSITIVE_COLOR: &str = "#36a64f";

/// Accent for a portfolio at or below what was invested
pub const NEGATIVE_COLOR: &str = "#d90f0f";

/// Builds chat attachments from portfolio data
#[derive(Clone, Debug)]
pub struct SummaryFormatter {
    positive_color: String,
    negative_color: String,
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self {
            positive_color: POSITIVE_COLOR.into(),
            negative_color: NEGATIVE_COLOR.into(),
        }
    }
}

impl SummaryFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color-coded attachment with the four summary fields
    pub fn summary_attachment(&self, summary: &Summary) -> Attachment {
        let color = if summary.gained() {
            &self.positive_color
        } else {
            &self.negative_color
        };

        Attachment::new()
            .with_color(color.clone())
            .with_field("Total Invested", format!("${}", summary.invested))
            .with_field("Current Balance", format!("${}", summary.balance))
            .with_field("Total Profit", format!("${}", summary.diff))
            .with_field("Percent Change", format_percent(summary.percent_change))
            .with_footer(format!("Updated {}", summary.computed_at.format("%Y-%m-%d %H:%M:%S UTC")))
    }

    /// One attachment describing a single account
    pub fn account_attachment(&self, account: &Account) -> Attachment {
        Attachment::new()
            .with_text(account.name.clone())
            .with_field("Currency", account.currency.clone())
            .with_field("Native Balance", account.native_balance.to_string())
            .with_field("Balance", account.balance.to_string())
    }

    /// Error report: a short headline plus the full cause chain
    pub fn error_attachment(&self, err: &(dyn std::error::Error + 'static)) -> Attachment {
        Attachment::new()
            .with_color(self.negative_color.clone())
            .with_text(format!("```{}\n\n{err:?}```", error_trace(err)))
    }
}

/// Percent rounded to two places, or "n/a" when undefined
pub fn format_percent(percent: Option<f64>) -> String {
    percent.map_or_else(|| "n/a".into(), |p| format!("{p:.2}%"))
}

/// The error followed by every `source()` beneath it, one per line
pub fn error_trace(err: &(dyn std::error::Error + 'static)) -> String {
    let mut trace = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}
