use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors (CLI file plumbing only; the codecs work on slices)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Size limits
    #[error("Input too large: {size} bytes exceeds maximum {max}")]
    InputTooLarge { size: usize, max: usize },

    // Decoder errors
    #[error("Compressed stream truncated mid-token")]
    TruncatedStream,

    #[error("Invalid stream header: {0}")]
    InvalidHeader(&'static str),

    #[error("Back-reference offset {offset} exceeds available output {available}")]
    InvalidBackReference { offset: usize, available: usize },

    #[error("Invalid Pletter q value: {0} (must be 1..=7)")]
    InvalidQValue(u8),

    // Verification harness
    #[error("Round-trip mismatch: decompressed output differs from input")]
    RoundTripMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;
