use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown challenge `{0}`")]
    UnknownChallenge(String),
}

pub type Result<T> = std::result::Result<T, Error>;
