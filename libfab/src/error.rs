use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libfab` errors
pub enum Error {
    /// Error returned if the raster header is missing, has non-numeric fields, or carries a
    /// magic other than `P4`
    #[error("malformed PBM header: {0}")]
    MalformedHeader(String),
    /// Error returned if the stream ends before a row the header declared
    #[error("truncated input: row {row} needs {expected} bytes, only {actual} available")]
    TruncatedInput {
        /// zero-based index of the incomplete row
        row: usize,
        /// row stride in bytes
        expected: usize,
        /// bytes that could be read
        actual: usize,
    },
    /// Error returned if the head configuration cannot describe real hardware
    #[error("invalid head configuration: {0}")]
    InvalidConfig(String),
    /// Error returned if a packed firing payload cannot be decoded
    #[error("invalid packed payload: {0}")]
    InvalidPayload(String),
    /// Underlying read or write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<base64::DecodeError> for Error {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidPayload(value.to_string())
    }
}
