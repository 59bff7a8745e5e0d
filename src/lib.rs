//! Write-through sink that hashes every byte with several named accumulators.
//!
//! A [`MultiplexWriter`] forwards writes to an underlying [`std::io::Write`]
//! sink and replicates the accepted bytes to each registered
//! [`HashAccumulator`], so MD5, SHA-256 and friends can be computed in a
//! single pass over streamed data.

pub mod algorithms;
pub mod builder;
pub mod config;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod pool;
pub mod registry;
pub mod report;
pub mod writer;

pub use algorithms::Algorithm;
pub use builder::HashWriterBuilder;
pub use config::{load_runtime_config, RuntimeConfig};
pub use encoding::{Digest, DigestEncoding};
pub use error::{HashWriterError, Result};
pub use hash::HashAccumulator;
pub use pool::{FanOut, HashingPool};
pub use registry::{AlgorithmName, Registry, MD5, SHA256};
pub use report::{DigestEntry, DigestReport};
pub use writer::MultiplexWriter;
