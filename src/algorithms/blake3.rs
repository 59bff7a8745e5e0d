use std::io;

use blake3::Hasher;

use crate::hash::HashAccumulator;

pub struct Blake3Accumulator {
    hasher: Hasher,
}

impl Blake3Accumulator {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }
}

impl Default for Blake3Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAccumulator for Blake3Accumulator {
    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        self.hasher.update(data);
        Ok(())
    }

    fn finalize(&self) -> Vec<u8> {
        // blake3::Hasher::finalize takes &self and leaves the state intact
        self.hasher.finalize().as_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }
}
