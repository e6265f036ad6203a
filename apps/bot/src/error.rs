use thiserror::Error;

/// Failure taxonomy for one inbound message. User-input variants are
/// recovered into a usage fallback; everything else into a generic
/// failure reply.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("empty message")]
    EmptyInput,

    #[error("ticker argument is required for `{0}`")]
    MissingTicker(&'static str),

    #[error("quote lookup failed")]
    Quote(#[source] anyhow::Error),

    #[error("subscription store failed")]
    Store(#[source] anyhow::Error),
}

impl HandlerError {
    /// True for malformed input the sender can fix themselves.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            HandlerError::EmptyInput | HandlerError::MissingTicker(_)
        )
    }
}
