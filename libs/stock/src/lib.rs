mod chart;
mod imgur;
mod quote;
mod quote_client;
mod subscription_store;

pub use chart::render_trend;
pub use imgur::ImgurClient;
pub use quote::{Quote, QuoteData, QuoteLookup};
pub use quote_client::{DailyClose, MonthLog, QuoteClient, StockDayResponse};
pub use subscription_store::{
    RedisSubscriptionStore, RemoveOutcome, SubscriptionStore, UpsertOutcome,
};
