use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Background image could not be fetched or decoded.
    #[error("background image '{source_ref}' could not be loaded: {reason}")]
    BackgroundLoad { source_ref: String, reason: String },

    #[error("the pen needs a palette color")]
    MissingPenColor,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("cannot move export from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("{sink} sink failed: {source}")]
    Sink {
        sink: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Error payload returned by a remote service.
    #[error("{0}")]
    Service(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid settings: {0}")]
    Settings(String),
}

impl Error {
    pub fn sink(sink: &'static str, source: Error) -> Self {
        Error::Sink {
            sink,
            source: Box::new(source),
        }
    }
}
