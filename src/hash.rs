use std::io::{self, Read};

/// A streaming hash computation that can be fed through a [`MultiplexWriter`].
///
/// Implementations keep their running state between `consume` calls.
/// `finalize` must not disturb that state: calling it twice without consuming
/// anything in between returns the same digest.
///
/// [`MultiplexWriter`]: crate::MultiplexWriter
pub trait HashAccumulator: Send + 'static {
    /// Append `data` to the running digest computation.
    fn consume(&mut self, data: &[u8]) -> io::Result<()>;

    /// Digest of every byte consumed since creation or the last `reset`.
    fn finalize(&self) -> Vec<u8>;

    /// Return to the "nothing consumed" state.
    fn reset(&mut self);

    fn consume_reader(&mut self, r: &mut dyn Read) -> io::Result<u64> {
        let mut buf = [0u8; 8192];
        let mut total = 0u64;
        loop {
            let n = r.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.consume(&buf[..n])?;
            total += n as u64;
        }
        Ok(total)
    }
}

impl<A: HashAccumulator + ?Sized> HashAccumulator for Box<A> {
    fn consume(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).consume(data)
    }

    fn finalize(&self) -> Vec<u8> {
        (**self).finalize()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
