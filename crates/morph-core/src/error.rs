use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Animation target is gone")]
    TargetGone,

    #[error("Failed to dispatch to owner thread: {0}")]
    Dispatch(String),

    #[error("Animation handler is disposed")]
    Disposed,

    #[error("Animation already started")]
    AlreadyStarted,

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("No tokio runtime available to drive the animation timer")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, Error>;
