use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::Digest;
use crate::error::{HashWriterError, Result};
use crate::hash::HashAccumulator;

/// Convenience name for SHA-256 accumulators.
pub const SHA256: &str = "SHA256";
/// Convenience name for MD5 accumulators.
pub const MD5: &str = "MD5";

/// Caller-chosen key an accumulator is registered under. Compared by exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmName(String);

impl AlgorithmName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlgorithmName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AlgorithmName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for AlgorithmName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AlgorithmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) struct Entry {
    pub(crate) name: AlgorithmName,
    pub(crate) accumulator: Box<dyn HashAccumulator>,
}

/// Owns the accumulators of one writer, keyed by algorithm name.
///
/// Entries are kept in registration order; fan-out and error reporting follow
/// that order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `accumulator` under `name`.
    ///
    /// A name can only be registered once; a second registration is rejected
    /// rather than replacing the first.
    pub fn register(
        &mut self,
        name: impl Into<AlgorithmName>,
        accumulator: Option<Box<dyn HashAccumulator>>,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(HashWriterError::InvalidAlgorithm);
        }
        let accumulator = accumulator.ok_or_else(|| HashWriterError::NilAccumulator(name.clone()))?;
        if self.contains(name.as_str()) {
            return Err(HashWriterError::DuplicateAlgorithm(name));
        }
        log::debug!("registered accumulator for '{}'", name);
        self.entries.push(Entry { name, accumulator });
        Ok(())
    }

    /// Shorthand for [`Registry::register`] with a concrete accumulator.
    pub fn add<A: HashAccumulator>(
        &mut self,
        name: impl Into<AlgorithmName>,
        accumulator: A,
    ) -> Result<()> {
        self.register(name, Some(Box::new(accumulator)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &AlgorithmName> {
        self.entries.iter().map(|e| &e.name)
    }

    /// Every registered name with its current digest, in registration order.
    pub fn digests(&self) -> impl Iterator<Item = (&AlgorithmName, Digest)> {
        self.entries
            .iter()
            .map(|e| (&e.name, Digest::new(e.accumulator.finalize())))
    }

    fn lookup(&self, name: &str) -> Result<&dyn HashAccumulator> {
        self.entries
            .iter()
            .find(|e| e.name.as_str() == name)
            .map(|e| e.accumulator.as_ref())
            .ok_or_else(|| HashWriterError::UnknownAlgorithm(name.into()))
    }

    /// Finalized digest of everything `name` has consumed so far.
    pub fn digest(&self, name: &str) -> Result<Digest> {
        self.lookup(name).map(|acc| Digest::new(acc.finalize()))
    }

    pub fn hex_digest(&self, name: &str) -> Result<String> {
        self.digest(name).map(|d| d.to_hex())
    }

    pub fn base64_digest(&self, name: &str) -> Result<String> {
        self.digest(name).map(|d| d.to_base64())
    }

    /// Reset every accumulator to its initial state.
    pub fn reset_all(&mut self) {
        for entry in &mut self.entries {
            entry.accumulator.reset();
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
