use std::io;

use thiserror::Error;

use crate::registry::AlgorithmName;

pub type Result<T> = std::result::Result<T, HashWriterError>;

#[derive(Error, Debug)]
pub enum HashWriterError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("an accumulator is already registered for '{0}' algorithm")]
    DuplicateAlgorithm(AlgorithmName),

    #[error("an empty string was passed as hash algorithm name")]
    InvalidAlgorithm,

    #[error("no accumulator was provided for '{0}' algorithm")]
    NilAccumulator(AlgorithmName),

    #[error("could not write to underlying sink: {source}")]
    SinkWriteFailed {
        #[source]
        source: io::Error,
    },

    #[error("could not calculate hash of the written data for '{algorithm}' algorithm: {source}")]
    HashConsumeFailed {
        algorithm: AlgorithmName,
        #[source]
        source: io::Error,
    },

    #[error("could not read from source: {source}")]
    SourceReadFailed {
        #[source]
        source: io::Error,
    },

    #[error("no accumulator registered for '{0}' algorithm")]
    UnknownAlgorithm(AlgorithmName),

    #[error("could not decode digest: {0}")]
    Decode(String),
}

impl HashWriterError {
    /// Whether the writer that produced this error has to be discarded.
    ///
    /// After a failed fan-out the accumulators disagree about which bytes they
    /// have seen, so the writer and its registry must be rebuilt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HashWriterError::HashConsumeFailed { .. })
    }
}

impl From<HashWriterError> for io::Error {
    fn from(err: HashWriterError) -> Self {
        match err {
            // keep the sink's own error kind visible to io::copy and friends
            HashWriterError::SinkWriteFailed { source } => {
                io::Error::new(source.kind(), HashWriterError::SinkWriteFailed { source })
            }
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
