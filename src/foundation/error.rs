pub type PlayoffResult<T> = Result<T, PlayoffError>;

#[derive(thiserror::Error, Debug)]
pub enum PlayoffError {
    #[error("validation error: {0}")]
    Validation(String),

    /// Sequencer misuse: negative/backward advances, exhausted photo
    /// timers, out-of-order lifecycle calls. Always a bug in the driving
    /// script, never a runtime condition to recover from.
    #[error("sequence error: {0}")]
    Sequence(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayoffError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn sequence(msg: impl Into<String>) -> Self {
        Self::Sequence(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
