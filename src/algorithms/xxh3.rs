use std::io;

use xxhash_rust::xxh3::Xxh3;

use crate::hash::HashAccumulator;

/// 64-bit XXH3, big-endian output.
/// Non-cryptographic: meant for fast integrity checks only.
pub struct Xxh3Accumulator {
    state: Xxh3,
}

impl Xxh3Accumulator {
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }
}

impl Default for Xxh3Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAccumulator for Xxh3Accumulator {
    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        self.state.update(data);
        Ok(())
    }

    fn finalize(&self) -> Vec<u8> {
        self.state.digest().to_be_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
