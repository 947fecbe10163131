use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompletionError>;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion server unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Completion API error: {status}")]
    Api { status: u16 },

    #[error("Empty completion")]
    EmptyResponse,
}
