use std::sync::Arc;

use stock::{QuoteLookup, SubscriptionStore};

pub mod command;
pub mod config;
pub mod delivery;
pub mod error;
pub mod push;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

use command::Interpreter;
use delivery::LineClient;

/// Shared handles for the webhook and push paths.
#[derive(Clone)]
pub struct Data {
    pub interpreter: Interpreter,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub quotes: Arc<dyn QuoteLookup>,
    pub line: Arc<LineClient>,
}

impl Data {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        quotes: Arc<dyn QuoteLookup>,
        line: Arc<LineClient>,
    ) -> Self {
        Self {
            interpreter: Interpreter::new(Arc::clone(&subscriptions), Arc::clone(&quotes)),
            subscriptions,
            quotes,
            line,
        }
    }
}

pub type Error = anyhow::Error;
