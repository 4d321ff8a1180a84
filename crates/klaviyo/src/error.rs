use klaviyo_core::DispatchError;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Klaviyo API error [{status}]: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Item {index} failed: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}
