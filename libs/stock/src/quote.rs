use anyhow::{Error, ensure};
use async_trait::async_trait;

// Positions in the whitespace-split exchange report title,
// e.g. "107年12月 2330 台積電 各日成交資訊".
const TITLE_INDEX_NUMBER: usize = 1;
const TITLE_INDEX_NAME: usize = 2;

/// Result of a ticker lookup. An unlisted ticker is a normal outcome,
/// distinct from an upstream failure.
#[derive(Debug, Clone)]
pub enum Quote {
    Found(QuoteData),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct QuoteData {
    title_fields: Vec<String>,
    latest_close: String,
    chart_url: String,
}

impl QuoteData {
    pub fn new(
        title_fields: Vec<String>,
        latest_close: impl Into<String>,
        chart_url: impl Into<String>,
    ) -> Result<Self, Error> {
        ensure!(
            title_fields.len() > TITLE_INDEX_NAME,
            "report title has {} fields, need at least {}",
            title_fields.len(),
            TITLE_INDEX_NAME + 1
        );

        Ok(Self {
            title_fields,
            latest_close: latest_close.into(),
            chart_url: chart_url.into(),
        })
    }

    /// Exchange listing number, e.g. "2330".
    pub fn listing_number(&self) -> &str {
        &self.title_fields[TITLE_INDEX_NUMBER]
    }

    /// Listed company name, e.g. "台積電".
    pub fn listing_name(&self) -> &str {
        &self.title_fields[TITLE_INDEX_NAME]
    }

    /// Most recent closing price, as displayed by the exchange.
    pub fn latest_close(&self) -> &str {
        &self.latest_close
    }

    pub fn chart_url(&self) -> &str {
        &self.chart_url
    }

    /// One-line summary: "{number} {name} {close}".
    pub fn summary_line(&self) -> String {
        format!(
            "{} {} {}",
            self.listing_number(),
            self.listing_name(),
            self.latest_close
        )
    }
}

#[async_trait]
pub trait QuoteLookup: Send + Sync {
    async fn lookup(&self, ticker: &str) -> Result<Quote, Error>;
}
