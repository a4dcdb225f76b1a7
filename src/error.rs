//! Errors for writing and reading dada files

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DadaError {
    #[error("Cannot accept arrays with {0} dimensions, only 1 or 2 are supported")]
    UnsupportedDimensionality(usize),
    #[error("{0} nbit is unknown. Only 8 (int), 16 (int) and 32 (float) are supported")]
    UnsupportedBitDepth(u32),
    #[error("npol = {0} is not supported, only npol = 1 is")]
    UnsupportedPolarizations(u32),
    #[error("Only FT and TF orders are understood. Given: {0}")]
    UnsupportedOrder(String),
    #[error("Header value for {key} must be a single line of text, got {value:?}")]
    InvalidHeaderValue { key: &'static str, value: String },
    /// The serialized header text doesn't fit in HDR_SIZE
    #[error("Header needs {needed} bytes but the header size is {header_size}")]
    HeaderOverflow { needed: usize, header_size: usize },
    #[error("Malformed dada file: {0}")]
    MalformedHeader(String),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
