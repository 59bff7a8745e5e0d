use std::io;

use crate::hash::HashAccumulator;

/// Adapter for any RustCrypto `digest::Digest` implementation.
#[derive(Clone, Default)]
pub struct DigestAccumulator<D> {
    state: D,
}

impl<D: digest::Digest> DigestAccumulator<D> {
    pub fn new() -> Self {
        Self { state: D::new() }
    }
}

impl<D> HashAccumulator for DigestAccumulator<D>
where
    D: digest::Digest + Clone + Send + 'static,
{
    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        digest::Digest::update(&mut self.state, data);
        Ok(())
    }

    fn finalize(&self) -> Vec<u8> {
        digest::Digest::finalize(self.state.clone()).to_vec()
    }

    fn reset(&mut self) {
        self.state = D::new();
    }
}

pub type Md5Accumulator = DigestAccumulator<md5::Md5>;
pub type Sha256Accumulator = DigestAccumulator<sha2::Sha256>;
pub type Sha512Accumulator = DigestAccumulator<sha2::Sha512>;
pub type Sha3_256Accumulator = DigestAccumulator<sha3::Sha3_256>;
