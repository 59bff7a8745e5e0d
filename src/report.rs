use std::io::Write;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::encoding::{Digest, DigestEncoding};
use crate::registry::AlgorithmName;
use crate::writer::MultiplexWriter;

/// One algorithm's digest, already encoded as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestEntry {
    pub algorithm: AlgorithmName,
    pub encoding: DigestEncoding,
    pub digest: String,
}

impl DigestEntry {
    pub fn new(algorithm: AlgorithmName, digest: &Digest, encoding: DigestEncoding) -> Self {
        Self {
            algorithm,
            encoding,
            digest: digest.encode(encoding),
        }
    }

    /// Decode the text digest back into bytes.
    pub fn to_digest(&self) -> crate::Result<Digest> {
        Digest::decode(&self.digest, self.encoding)
    }
}

/// Digests of every algorithm on `writer` together with the hashed length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestReport {
    pub bytes: u64,
    pub entries: Vec<DigestEntry>,
}

impl DigestReport {
    pub fn from_writer<W>(writer: &MultiplexWriter<W>, encoding: DigestEncoding) -> Self {
        Self {
            bytes: writer.bytes_written(),
            entries: writer.report(encoding),
        }
    }

    pub fn get(&self, algorithm: &str) -> Option<&DigestEntry> {
        self.entries
            .iter()
            .find(|e| e.algorithm.as_str() == algorithm)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize digest report")
    }

    pub fn write_json<O: Write>(&self, out: O) -> Result<()> {
        serde_json::to_writer_pretty(out, self).context("write digest report")
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse digest report")
    }
}
