//! In-memory collaborator doubles for the interpreter and push-path tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use stock::{Quote, QuoteData, QuoteLookup, RemoveOutcome, SubscriptionStore, UpsertOutcome};

use crate::delivery::Delivery;

pub(crate) fn tsmc_quote() -> QuoteData {
    QuoteData::new(
        vec!["107年12月".into(), "2330".into(), "台積電".into()],
        "500",
        "https://i.imgur.com/a.png",
    )
    .unwrap()
}

/// Subscription store over a plain set of (user, ticker) pairs.
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<BTreeSet<(String, String)>>,
    fail: bool,
}

impl MemoryStore {
    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub(crate) fn insert(&self, user_id: &str, ticker: &str) {
        self.rows
            .lock()
            .unwrap()
            .insert((user_id.into(), ticker.into()));
    }

    pub(crate) fn contains(&self, user_id: &str, ticker: &str) -> bool {
        self.rows
            .lock()
            .unwrap()
            .contains(&(user_id.into(), ticker.into()))
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail {
            Err(anyhow!("storage unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn upsert(&self, user_id: &str, ticker: &str) -> Result<UpsertOutcome, Error> {
        self.check()?;
        let inserted = self
            .rows
            .lock()
            .unwrap()
            .insert((user_id.into(), ticker.into()));

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::AlreadyExists
        })
    }

    async fn remove(&self, user_id: &str, ticker: &str) -> Result<RemoveOutcome, Error> {
        self.check()?;
        let removed = self
            .rows
            .lock()
            .unwrap()
            .remove(&(user_id.into(), ticker.into()));

        Ok(if removed {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        })
    }

    async fn list_for(&self, user_id: &str) -> Result<Vec<String>, Error> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, ticker)| ticker.clone())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<(String, String)>, Error> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().cloned().collect())
    }
}

/// Canned quote lookups with a call counter.
#[derive(Default)]
pub(crate) struct StubQuotes {
    found: HashMap<String, QuoteData>,
    failing: BTreeSet<String>,
    calls: AtomicUsize,
}

impl StubQuotes {
    pub(crate) fn with(mut self, ticker: &str, data: QuoteData) -> Self {
        self.found.insert(ticker.to_string(), data);
        self
    }

    pub(crate) fn failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteLookup for StubQuotes {
    async fn lookup(&self, ticker: &str) -> Result<Quote, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(ticker) {
            return Err(anyhow!("upstream unavailable"));
        }

        Ok(match self.found.get(ticker) {
            Some(data) => Quote::Found(data.clone()),
            None => Quote::NotFound,
        })
    }
}

/// Records every outbound message.
#[derive(Default)]
pub(crate) struct RecordingDelivery {
    sent: Mutex<Vec<(String, String, Option<String>)>>,
}

impl RecordingDelivery {
    pub(crate) fn pushes(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn pushed(&self) -> Vec<(String, String, Option<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn reply(&self, reply_token: &str, text: &str, image_url: Option<&str>) -> Result<()> {
        self.sent.lock().unwrap().push((
            reply_token.into(),
            text.into(),
            image_url.map(Into::into),
        ));
        Ok(())
    }

    async fn push(&self, to: &str, text: &str, image_url: Option<&str>) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.into(), text.into(), image_url.map(Into::into)));
        Ok(())
    }
}
