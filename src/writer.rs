use std::io::{self, Read, Write};

use crate::encoding::{Digest, DigestEncoding};
use crate::error::{HashWriterError, Result};
use crate::pool::FanOut;
use crate::registry::{AlgorithmName, Registry};
use crate::report::DigestEntry;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Forwards everything written to a sink and hashes it with every registered
/// accumulator.
///
/// Each `write` goes to the sink first. Only bytes the sink accepted in full
/// are handed to the accumulators, so every digest always covers a prefix of
/// what the sink committed. The accumulators are then fed (in parallel by
/// default) and the call returns after all of them finished.
///
/// Digest retrieval and [`reset`](Self::reset) are meant to be called between
/// writes from the thread driving the writer. There is no timeout: an
/// accumulator that blocks in `consume` blocks the write.
///
/// After a [`HashWriterError::HashConsumeFailed`] the accumulators no longer
/// agree on what they have seen and the writer should be discarded.
pub struct MultiplexWriter<W> {
    sink: W,
    registry: Registry,
    fan_out: FanOut,
    bytes_written: u64,
}

impl<W: Write> MultiplexWriter<W> {
    /// Wrap `sink` with an already populated registry.
    pub fn new(sink: W, registry: Registry) -> Result<Self> {
        Self::with_fan_out(sink, registry, FanOut::default())
    }

    pub fn with_fan_out(sink: W, registry: Registry, fan_out: FanOut) -> Result<Self> {
        if registry.is_empty() {
            return Err(HashWriterError::InvalidConfiguration(
                "no underlying hash functions were provided".to_string(),
            ));
        }
        log::debug!(
            "multiplex writer created for {:?} ({:?} fan-out)",
            registry,
            fan_out
        );
        Ok(Self {
            sink,
            registry,
            fan_out,
            bytes_written: 0,
        })
    }

    /// Write `buf` to the sink and hash it.
    ///
    /// Empty input returns `Ok(0)` without touching the sink. A sink error
    /// or short write fails with [`HashWriterError::SinkWriteFailed`] and
    /// nothing is hashed.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let n = match self.sink.write(buf) {
            Ok(n) if n == buf.len() => n,
            Ok(n) => {
                log::warn!("sink accepted {} of {} bytes", n, buf.len());
                return Err(HashWriterError::SinkWriteFailed {
                    source: io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("short write: {} of {} bytes accepted", n, buf.len()),
                    ),
                });
            }
            Err(source) => {
                log::warn!("sink write failed: {}", source);
                return Err(HashWriterError::SinkWriteFailed { source });
            }
        };

        if let Err(e) = self.fan_out.run(self.registry.entries_mut(), &buf[..n]) {
            log::warn!("{}", e);
            return Err(e);
        }
        self.bytes_written += n as u64;
        log::trace!("hashed {} bytes ({} total)", n, self.bytes_written);
        Ok(n)
    }

    /// Stream `reader` to the end through the writer. Returns the byte count.
    pub fn copy_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<u64> {
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut total = 0u64;
        loop {
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(HashWriterError::SourceReadFailed { source }),
            };
            self.write_bytes(&buf[..read])?;
            total += read as u64;
        }
        Ok(total)
    }
}

impl<W> MultiplexWriter<W> {
    pub fn hash(&self, name: &str) -> Result<Digest> {
        self.registry.digest(name)
    }

    pub fn hex_string(&self, name: &str) -> Result<String> {
        self.registry.hex_digest(name)
    }

    pub fn base64_string(&self, name: &str) -> Result<String> {
        self.registry.base64_digest(name)
    }

    /// Reset every accumulator. The sink is left alone.
    pub fn reset(&mut self) {
        log::debug!("resetting accumulators {:?}", self.registry);
        self.registry.reset_all();
        self.bytes_written = 0;
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &AlgorithmName> {
        self.registry.names()
    }

    /// Bytes hashed since construction or the last reset.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn fan_out(&self) -> &FanOut {
        &self.fan_out
    }

    /// One entry per algorithm, in registration order.
    pub fn report(&self, encoding: DigestEncoding) -> Vec<DigestEntry> {
        self.registry
            .digests()
            .map(|(name, d)| DigestEntry::new(name.clone(), &d, encoding))
            .collect()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Writing to the sink directly bypasses hashing.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn into_parts(self) -> (W, Registry) {
        (self.sink, self.registry)
    }
}

impl<W: Write> Write for MultiplexWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<W> std::fmt::Debug for MultiplexWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiplexWriter")
            .field("algorithms", &self.registry)
            .field("fan_out", &self.fan_out)
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{Md5Accumulator, Sha256Accumulator};
    use crate::hash::HashAccumulator;
    use crate::registry::{MD5, SHA256};
    use sha2::{Digest as _, Sha256};

    struct Failing;

    impl HashAccumulator for Failing {
        fn consume(&mut self, _data: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
        fn finalize(&self) -> Vec<u8> {
            Vec::new()
        }
        fn reset(&mut self) {}
    }

    /// Accepts at most `limit` bytes per call.
    struct ShortSink {
        limit: usize,
        data: Vec<u8>,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sha_md5_registry() -> Registry {
        let mut reg = Registry::new();
        reg.add(SHA256, Sha256Accumulator::new()).unwrap();
        reg.add(MD5, Md5Accumulator::new()).unwrap();
        reg
    }

    #[test]
    fn rejects_empty_registry() {
        let err = MultiplexWriter::new(Vec::<u8>::new(), Registry::new()).unwrap_err();
        assert!(matches!(err, HashWriterError::InvalidConfiguration(_)));
    }

    #[test]
    fn forwards_and_hashes() {
        let mut w = MultiplexWriter::new(Vec::<u8>::new(), sha_md5_registry()).unwrap();
        assert_eq!(w.write_bytes(b"hello ").unwrap(), 6);
        assert_eq!(w.write_bytes(b"world").unwrap(), 5);
        assert_eq!(w.bytes_written(), 11);
        assert_eq!(
            w.hash(SHA256).unwrap().as_bytes(),
            Sha256::digest(b"hello world").as_slice()
        );
        assert_eq!(w.into_inner(), b"hello world".to_vec());
    }

    #[test]
    fn empty_write_is_noop() {
        let mut w = MultiplexWriter::new(BrokenSink, sha_md5_registry()).unwrap();
        let before = w.hash(SHA256).unwrap();
        assert_eq!(w.write_bytes(b"").unwrap(), 0);
        assert_eq!(w.hash(SHA256).unwrap(), before);
    }

    #[test]
    fn short_write_is_not_hashed() {
        let sink = ShortSink {
            limit: 2,
            data: Vec::new(),
        };
        let mut w = MultiplexWriter::new(sink, sha_md5_registry()).unwrap();
        let err = w.write_bytes(b"abcdef").unwrap_err();
        match err {
            HashWriterError::SinkWriteFailed { source } => {
                assert_eq!(source.kind(), io::ErrorKind::WriteZero)
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(w.bytes_written(), 0);
        assert_eq!(
            w.hash(SHA256).unwrap().as_bytes(),
            Sha256::digest(b"").as_slice()
        );
        assert_eq!(w.get_ref().data, b"ab".to_vec());
    }

    #[test]
    fn sink_error_keeps_kind_through_io_write() {
        let mut w = MultiplexWriter::new(BrokenSink, sha_md5_registry()).unwrap();
        let err = w.write_all(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        let inner = err
            .get_ref()
            .and_then(|e| e.downcast_ref::<HashWriterError>())
            .expect("typed error inside io::Error");
        assert!(matches!(inner, HashWriterError::SinkWriteFailed { .. }));
    }

    #[test]
    fn failing_accumulator_is_named() {
        for fan_out in [FanOut::Sequential, FanOut::Parallel] {
            let mut reg = sha_md5_registry();
            reg.add("broken", Failing).unwrap();
            let mut w = MultiplexWriter::with_fan_out(Vec::<u8>::new(), reg, fan_out).unwrap();
            let err = w.write_bytes(b"abc").unwrap_err();
            assert!(err.is_fatal());
            match err {
                HashWriterError::HashConsumeFailed { algorithm, source } => {
                    assert_eq!(algorithm.as_str(), "broken");
                    assert_eq!(source.to_string(), "boom");
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn first_registered_failure_wins() {
        let mut reg = Registry::new();
        reg.add("first", Failing).unwrap();
        reg.add(SHA256, Sha256Accumulator::new()).unwrap();
        reg.add("second", Failing).unwrap();
        let mut w = MultiplexWriter::new(Vec::<u8>::new(), reg).unwrap();
        match w.write_bytes(b"x") {
            Err(HashWriterError::HashConsumeFailed { algorithm, .. }) => {
                assert_eq!(algorithm.as_str(), "first")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn report_lists_every_algorithm() {
        let mut w = MultiplexWriter::new(Vec::<u8>::new(), sha_md5_registry()).unwrap();
        w.write_bytes(b"abc").unwrap();
        let report = w.report(DigestEncoding::Hex);
        let names: Vec<&str> = report.iter().map(|e| e.algorithm.as_str()).collect();
        assert_eq!(names, vec![SHA256, MD5]);
        assert_eq!(report[1].digest, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn copy_from_streams_reader() {
        let payload = vec![7u8; COPY_BUF_SIZE * 2 + 13];
        let mut w = MultiplexWriter::new(Vec::<u8>::new(), sha_md5_registry()).unwrap();
        let copied = w.copy_from(&mut &payload[..]).unwrap();
        assert_eq!(copied, payload.len() as u64);
        assert_eq!(
            w.hash(SHA256).unwrap().as_bytes(),
            Sha256::digest(&payload).as_slice()
        );
    }

    /// Replays a fixed script of read results.
    struct ScriptedReader {
        steps: Vec<io::Result<Vec<u8>>>,
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.steps.is_empty() {
                return Ok(0);
            }
            let chunk = self.steps.remove(0)?;
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn copy_from_retries_interrupts_and_reports_read_errors() {
        let mut reader = ScriptedReader {
            steps: vec![
                Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
                Ok(b"abc".to_vec()),
                Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
                Ok(b"never read".to_vec()),
            ],
        };
        let mut w = MultiplexWriter::new(Vec::<u8>::new(), sha_md5_registry()).unwrap();
        match w.copy_from(&mut reader) {
            Err(HashWriterError::SourceReadFailed { source }) => {
                assert_eq!(source.kind(), io::ErrorKind::Other);
                assert_eq!(source.to_string(), "disk gone");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(w.bytes_written(), 3);
        assert_eq!(
            w.hash(SHA256).unwrap().as_bytes(),
            Sha256::digest(b"abc").as_slice()
        );
        assert_eq!(w.get_ref().as_slice(), b"abc");
    }
}
