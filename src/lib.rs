//! Fake-data tooling for dada pipelines: a rejection sampler for arbitrary
//! one-dimensional densities and a writer (and reader) for dada files.

pub mod dada;
pub mod error;
pub mod reader;
pub mod sampler;
pub mod writer;

pub use dada::{DadaConfig, DadaHeader, Layout, Nbit, Order, DEFAULT_HEADER_SIZE};
pub use error::DadaError;
pub use reader::{read_dada, DadaFile};
pub use sampler::{generate, generate_with, Cosine, Density, RejectionSampler};
pub use writer::{write_dada, write_dada_to};
