use thiserror::Error;

use crate::{art_object::ErrorResponse, config::ConfigError, schema::ValidationError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("got HTTP {status} from {url}{}", describe_error_body(.error))]
    Status {
        status: u16,
        url: String,
        error: Option<ErrorResponse>,
    },

    #[error("timed out waiting for {url}")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unable to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unable to start worker pool: {0}")]
    WorkerPool(String),
}

impl Error {
    /// The HTTP status code, if the upstream actually answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

fn describe_error_body(error: &Option<ErrorResponse>) -> String {
    match error {
        Some(ErrorResponse {
            error,
            message: Some(message),
            ..
        }) => format!(" ({error}: {message})"),
        Some(ErrorResponse { error, .. }) => format!(" ({error})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
