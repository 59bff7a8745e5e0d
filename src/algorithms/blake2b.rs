use std::io;

use blake2b_simd::{Params, State};

use crate::hash::HashAccumulator;

/// BLAKE2b with the full 64-byte output.
pub struct Blake2bAccumulator {
    state: State,
}

impl Blake2bAccumulator {
    pub fn new() -> Self {
        Self {
            state: Self::params().to_state(),
        }
    }

    fn params() -> Params {
        let mut params = Params::new();
        params.hash_length(64);
        params
    }
}

impl Default for Blake2bAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAccumulator for Blake2bAccumulator {
    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        self.state.update(data);
        Ok(())
    }

    fn finalize(&self) -> Vec<u8> {
        self.state.finalize().as_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.state = Self::params().to_state();
    }
}
