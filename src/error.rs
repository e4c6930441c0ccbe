/// Failures of one analysis channel. These never leave the controller: they
/// are folded into the `Error` label of the affected signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel connect failed: {0}")]
    Connect(String),
    #[error("channel transport failed: {0}")]
    Transport(String),
}

/// Terminal outcome of a failed recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Non-success status, an explicit `error` field, or a transport failure.
    #[error("{0}")]
    Failed(String),
    /// The body did not have the expected shape. The detail is kept for logs only.
    #[error("Unexpected response from the recommendation service")]
    MalformedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}
