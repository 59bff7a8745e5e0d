use std::fmt;

use crate::algorithms::{
    Blake2bAccumulator, Blake3Accumulator, Md5Accumulator, Sha256Accumulator, Sha3_256Accumulator,
    Sha512Accumulator, Xxh3Accumulator,
};
use crate::hash::HashAccumulator;
use crate::registry::{MD5, SHA256};

/// Built-in accumulators that can be created by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha256,
    Sha512,
    Sha3_256,
    Blake3,
    Blake2b,
    Xxh3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Md5,
        Algorithm::Sha256,
        Algorithm::Sha512,
        Algorithm::Sha3_256,
        Algorithm::Blake3,
        Algorithm::Blake2b,
        Algorithm::Xxh3,
    ];

    pub fn list() -> Vec<&'static str> {
        Self::ALL.iter().map(|a| a.name()).collect()
    }

    /// Case-insensitive; `-` and `_` are ignored so "sha-256" and "SHA_256"
    /// both resolve to [`Algorithm::Sha256`].
    pub fn from_name(name: &str) -> Option<Algorithm> {
        let folded: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "md5" => Some(Algorithm::Md5),
            "sha256" => Some(Algorithm::Sha256),
            "sha512" => Some(Algorithm::Sha512),
            "sha3256" => Some(Algorithm::Sha3_256),
            "blake3" => Some(Algorithm::Blake3),
            "blake2b" => Some(Algorithm::Blake2b),
            "xxh3" | "xxh364" => Some(Algorithm::Xxh3),
            _ => None,
        }
    }

    /// Canonical registry name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => MD5,
            Algorithm::Sha256 => SHA256,
            Algorithm::Sha512 => "SHA512",
            Algorithm::Sha3_256 => "SHA3-256",
            Algorithm::Blake3 => "BLAKE3",
            Algorithm::Blake2b => "BLAKE2b",
            Algorithm::Xxh3 => "XXH3",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha256 | Algorithm::Sha3_256 | Algorithm::Blake3 => 32,
            Algorithm::Sha512 | Algorithm::Blake2b => 64,
            Algorithm::Xxh3 => 8,
        }
    }

    pub fn create(&self) -> Box<dyn HashAccumulator> {
        match self {
            Algorithm::Md5 => Box::new(Md5Accumulator::new()),
            Algorithm::Sha256 => Box::new(Sha256Accumulator::new()),
            Algorithm::Sha512 => Box::new(Sha512Accumulator::new()),
            Algorithm::Sha3_256 => Box::new(Sha3_256Accumulator::new()),
            Algorithm::Blake3 => Box::new(Blake3Accumulator::new()),
            Algorithm::Blake2b => Box::new(Blake2bAccumulator::new()),
            Algorithm::Xxh3 => Box::new(Xxh3Accumulator::new()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
