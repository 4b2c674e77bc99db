use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("chat API returned no candidates")]
    EmptyResponse,
}
