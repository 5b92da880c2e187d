use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("XML parse error: {message}")]
    Parse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid query parameter '{field}' ({value}): {reason}")]
    InvalidQuery {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unrecognized trade field: {name}")]
    UnknownField { name: String },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },
}

impl TradeError {
    pub fn parse(message: impl std::fmt::Display) -> Self {
        TradeError::Parse {
            message: message.to_string(),
        }
    }

    /// Errors caused by what the caller asked for rather than by the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TradeError::InvalidQuery { .. }
                | TradeError::UnknownField { .. }
                | TradeError::MalformedRequest { .. }
        )
    }
}

impl From<quick_xml::Error> for TradeError {
    fn from(err: quick_xml::Error) -> Self {
        TradeError::parse(err)
    }
}

impl From<quick_xml::events::attributes::AttrError> for TradeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        TradeError::parse(err)
    }
}

pub type Result<T> = std::result::Result<T, TradeError>;
