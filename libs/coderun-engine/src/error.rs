use std::error::Error as StdError;
use thiserror::Error;

/// Failures talking to the execution service
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered, but with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("{}", describe_chain(.0))]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from execution service: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_api(&self) -> bool {
        matches!(self, ClientError::Api { .. })
    }
}

/// Failures of a single execution before a usable response exists
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Language '{label}' (resolved as '{resolved}') is not supported by the execution service")]
    UnsupportedLanguage { label: String, resolved: String },

    #[error("Source code exceeds maximum size of {0} bytes")]
    SourceTooLarge(usize),

    #[error("Input exceeds maximum size of {0} bytes")]
    InputTooLarge(usize),

    #[error("Invalid response from execution service: {0}")]
    MalformedResponse(&'static str),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// reqwest hides the interesting part (refused, reset, dns) in the source chain
fn describe_chain(err: &dyn StdError) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !description.contains(&cause_text) {
            description.push_str(": ");
            description.push_str(&cause_text);
        }
        source = cause.source();
    }
    description
}
