/// Result alias that carries the custom [`SacredGeoError`] type.
pub type Result<T> = std::result::Result<T, SacredGeoError>;

/// Common error type for the core crate.
///
/// Only the configuration, file and FFT boundaries produce errors. Geometry
/// generation and rendering degrade to empty output instead.
#[derive(Debug, thiserror::Error)]
pub enum SacredGeoError {
    /// Free-form message surfaced to the command line front end.
    #[error("{0}")]
    Message(String),
    /// Input rejected before any work was done.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Settings or configuration JSON that failed to parse.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// FFT planning or processing failure in the audio front end.
    #[error("fft: {0}")]
    Fft(#[from] realfft::FftError),
}

impl SacredGeoError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SacredGeoError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SacredGeoError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_invalid_input() {
        let err = SacredGeoError::InvalidInput("block is empty");
        assert_eq!(err.to_string(), "invalid input: block is empty");
    }

    #[test]
    fn wraps_json_errors() {
        let parse = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: SacredGeoError = parse.into();
        assert!(err.to_string().starts_with("json:"));
    }
}
