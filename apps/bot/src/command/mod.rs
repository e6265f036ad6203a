mod delete;
mod help;
mod lookup;
mod query;
mod register;

use std::sync::Arc;

use stock::{QuoteLookup, SubscriptionStore};

use crate::error::HandlerError;

/// A parsed chat command. The first whitespace-separated token selects the
/// command; any unrecognized token is a direct ticker lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Register { ticker: &'a str },
    Delete { ticker: &'a str },
    Query,
    Help,
    Lookup { ticker: &'a str },
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Result<Self, HandlerError> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next().ok_or(HandlerError::EmptyInput)?;

        match head {
            "r" => match tokens.next() {
                Some(ticker) => Ok(Command::Register { ticker }),
                None => Err(HandlerError::MissingTicker("r")),
            },
            "d" => match tokens.next() {
                Some(ticker) => Ok(Command::Delete { ticker }),
                None => Err(HandlerError::MissingTicker("d")),
            },
            "q" => Ok(Command::Query),
            "h" => Ok(Command::Help),
            ticker => Ok(Command::Lookup { ticker }),
        }
    }
}

/// A finished reply. The text always starts with the greeting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub image_url: Option<String>,
}

/// Turns one line of chat text into store/lookup calls and a reply.
#[derive(Clone)]
pub struct Interpreter {
    subscriptions: Arc<dyn SubscriptionStore>,
    quotes: Arc<dyn QuoteLookup>,
}

impl Interpreter {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, quotes: Arc<dyn QuoteLookup>) -> Self {
        Self {
            subscriptions,
            quotes,
        }
    }

    pub async fn handle(
        &self,
        user_id: &str,
        display_name: &str,
        text: &str,
    ) -> Result<Reply, HandlerError> {
        let command = Command::parse(text)?;

        let (body, image_url) = match command {
            Command::Register { ticker } => (
                register::run(self.subscriptions.as_ref(), user_id, ticker).await?,
                None,
            ),
            Command::Delete { ticker } => (
                delete::run(self.subscriptions.as_ref(), user_id, ticker).await?,
                None,
            ),
            Command::Query => (query::run(self.subscriptions.as_ref(), user_id).await?, None),
            Command::Help => (help::usage().to_string(), None),
            Command::Lookup { ticker } => lookup::run(self.quotes.as_ref(), ticker).await?,
        };

        Ok(Reply {
            text: format!("{display_name} 您好!\n{body}"),
            image_url,
        })
    }
}
