use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("row width {0} exceeds the maximum run length of 16383")]
    RowTooWide(usize),

    #[error("pixel buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("row {row} holds {actual} pixels, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("encoder finalized in the middle of a row ({0} pixels pending)")]
    IncompleteRow(usize),

    #[error("stream ended inside a code (decoder state {0})")]
    TruncatedCode(&'static str),

    #[error("stream ended with {0} pixels after the last end-of-line marker")]
    UnterminatedRow(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
