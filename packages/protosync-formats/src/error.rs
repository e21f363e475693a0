use std::sync::Arc;

#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] Arc<std::io::Error>),

    #[error(transparent)]
    Utf8Conversion(#[from] std::str::Utf8Error),

    #[error("Invalid zip file ({0})")]
    InvalidZipFile(String),

    #[error("Unsupported compression method {method} for {name}")]
    UnsupportedCompression {
        name: String,
        method: u16,
    },

    #[error("Checksum mismatch for {0}; the archive is corrupted")]
    ChecksumMismatch(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}
