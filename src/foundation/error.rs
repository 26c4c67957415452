/// Convenience result type used across uniflash.
pub type UniflashResult<T> = Result<T, UniflashError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum UniflashError {
    /// Invalid user-provided configuration or input values.
    #[error("config error: {0}")]
    Config(String),

    /// Reference-data load or integrity failures. Integrity violations are
    /// fatal: the tables are built to partition the code-point space.
    #[error("data error: {0}")]
    Data(String),

    /// Unreadable or unparseable font files.
    #[error("font error: {0}")]
    Font(String),

    /// Errors while composing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding frames into the output container.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UniflashError {
    /// Build a [`UniflashError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`UniflashError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`UniflashError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`UniflashError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`UniflashError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
