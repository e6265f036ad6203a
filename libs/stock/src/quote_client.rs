use std::time::Duration;

use anyhow::{Context as _, Error, Result, ensure};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Taipei;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::chart;
use crate::imgur::ImgurClient;
use crate::quote::{Quote, QuoteData, QuoteLookup};

/// Column of the closing price in a STOCK_DAY data row.
const INDEX_CLOSING_PRICE: usize = 6;

const DEFAULT_BASE_API: &str = "https://www.twse.com.tw";

/// Daily-quotes client for the TWSE exchange report. A successful lookup
/// also renders the month's trend chart and uploads it to the image host.
pub struct QuoteClient {
    client: Client,
    base_api: String,
    imgur: ImgurClient,
}

impl QuoteClient {
    pub fn new(base_api: String, imgur: ImgurClient) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_api,
            imgur,
        })
    }

    /// Expects IMGUR_CLIENT_ID to be set; TWSE_API_BASE_URL overrides the
    /// exchange host.
    pub fn from_env() -> Result<Self> {
        let base_api = std::env::var("TWSE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_API.to_string());

        Self::new(base_api, ImgurClient::from_env()?)
    }

    async fn fetch_month(&self, ticker: &str, date: NaiveDate) -> Result<StockDayResponse> {
        let url = format!(
            "{}/exchangeReport/STOCK_DAY",
            self.base_api.trim_end_matches('/')
        );

        let res: StockDayResponse = self
            .client
            .get(url)
            .query(&[
                ("date", date.format("%Y%m%d").to_string()),
                ("stockNo", ticker.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(res)
    }
}

#[async_trait]
impl QuoteLookup for QuoteClient {
    async fn lookup(&self, ticker: &str) -> Result<Quote, Error> {
        let today = Utc::now().with_timezone(&Taipei).date_naive();
        let res = self.fetch_month(ticker, today).await?;

        let Some(month) = res.into_month_log()? else {
            return Ok(Quote::NotFound);
        };
        debug!(ticker, days = month.days.len(), "fetched monthly quotes");

        let title_fields = month.title_fields.clone();
        let latest_close = month.latest_close().to_string();

        let png = tokio::task::spawn_blocking(move || chart::render_trend(&month)).await??;
        let link = self.imgur.upload(&png, "stock").await?;

        Ok(Quote::Found(QuoteData::new(title_fields, latest_close, link)?))
    }
}

//
// Match TWSE exchange report JSON
// https://www.twse.com.tw/exchangeReport/STOCK_DAY
//
#[derive(Debug, Deserialize, Clone)]
pub struct StockDayResponse {
    pub stat: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub data: Option<Vec<Vec<String>>>,
}

impl StockDayResponse {
    /// `stat` is anything but "OK" for unlisted tickers; that case is the
    /// normal NotFound, represented as `None`.
    pub fn into_month_log(self) -> Result<Option<MonthLog>> {
        if self.stat != "OK" {
            return Ok(None);
        }

        let title = self.title.context("report has no title")?;
        let title_fields: Vec<String> = title.split_whitespace().map(str::to_string).collect();

        let rows = self.data.context("report has no data rows")?;
        ensure!(!rows.is_empty(), "report has no trading days");

        let mut days = Vec::with_capacity(rows.len());
        for row in rows {
            let date = row.first().context("data row has no date")?.clone();
            let close = row
                .get(INDEX_CLOSING_PRICE)
                .with_context(|| format!("data row for {} has no closing price", date))?
                .clone();
            days.push(DailyClose { date, close });
        }

        Ok(Some(MonthLog { title_fields, days }))
    }
}

/// One month of daily closing prices, as reported by the exchange.
#[derive(Debug, Clone)]
pub struct MonthLog {
    pub title_fields: Vec<String>,
    pub days: Vec<DailyClose>,
}

#[derive(Debug, Clone)]
pub struct DailyClose {
    /// Exchange-local date, e.g. "107/12/03" (ROC year).
    pub date: String,

    /// Closing price as displayed, possibly comma-grouped, e.g. "1,226.00".
    pub close: String,
}

impl DailyClose {
    pub fn close_value(&self) -> Result<f64> {
        self.close
            .replace(',', "")
            .parse()
            .with_context(|| format!("unparseable closing price: {}", self.close))
    }
}

impl MonthLog {
    /// Most recent closing price, as displayed.
    pub fn latest_close(&self) -> &str {
        self.days.last().map(|day| day.close.as_str()).unwrap_or_default()
    }

    pub fn closes(&self) -> Result<Vec<f64>> {
        self.days.iter().map(DailyClose::close_value).collect()
    }
}
