use std::io::Write;

use crate::algorithms::{Algorithm, Md5Accumulator, Sha256Accumulator};
use crate::config::RuntimeConfig;
use crate::error::{HashWriterError, Result};
use crate::hash::HashAccumulator;
use crate::pool::{FanOut, HashingPool};
use crate::registry::{AlgorithmName, Registry, MD5, SHA256};
use crate::writer::MultiplexWriter;

/// Collects a sink and accumulator registrations, then validates all of them
/// at once in [`build`](Self::build).
///
/// ```
/// use multiplex_hasher::HashWriterBuilder;
///
/// let mut writer = HashWriterBuilder::new()
///     .sink(Vec::<u8>::new())
///     .with_sha256()
///     .with_md5()
///     .build()
///     .unwrap();
/// writer.write_bytes(b"abc").unwrap();
/// assert_eq!(
///     writer.hex_string("MD5").unwrap(),
///     "900150983cd24fb0d6963f7d28e17f72"
/// );
/// ```
pub struct HashWriterBuilder<W> {
    sink: Option<W>,
    registrations: Vec<(AlgorithmName, Option<Box<dyn HashAccumulator>>)>,
    fan_out: FanOut,
}

impl<W: Write> Default for HashWriterBuilder<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> HashWriterBuilder<W> {
    pub fn new() -> Self {
        Self {
            sink: None,
            registrations: Vec::new(),
            fan_out: FanOut::default(),
        }
    }

    /// Seed a builder from runtime configuration: fan-out settings and the
    /// listed built-in algorithms. Names with no built-in accumulator fail at
    /// build time with [`HashWriterError::NilAccumulator`].
    pub fn from_config(cfg: &RuntimeConfig) -> Result<Self> {
        let mut builder = Self::new().fan_out(cfg.fan_out()?);
        for name in cfg.algorithm_names() {
            let accumulator = Algorithm::from_name(&name).map(|a| a.create());
            builder = builder.register(name, accumulator);
        }
        Ok(builder)
    }

    pub fn sink(mut self, sink: W) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Register `accumulator` under `name`.
    pub fn with_accumulator<A: HashAccumulator>(
        self,
        name: impl Into<AlgorithmName>,
        accumulator: A,
    ) -> Self {
        self.register(name, Some(Box::new(accumulator)))
    }

    /// Register a possibly missing accumulator; `None` fails the build.
    pub fn register(
        mut self,
        name: impl Into<AlgorithmName>,
        accumulator: Option<Box<dyn HashAccumulator>>,
    ) -> Self {
        self.registrations.push((name.into(), accumulator));
        self
    }

    /// Register a built-in algorithm under its canonical name.
    pub fn with_algorithm(self, algorithm: Algorithm) -> Self {
        self.register(algorithm.name(), Some(algorithm.create()))
    }

    pub fn with_sha256(self) -> Self {
        self.with_accumulator(SHA256, Sha256Accumulator::new())
    }

    pub fn with_md5(self) -> Self {
        self.with_accumulator(MD5, Md5Accumulator::new())
    }

    pub fn fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Run the fan-out on a shared pool.
    pub fn pool(self, pool: HashingPool) -> Self {
        self.fan_out(FanOut::Pool(pool))
    }

    pub fn build(self) -> Result<MultiplexWriter<W>> {
        let sink = self.sink.ok_or_else(|| {
            HashWriterError::InvalidConfiguration("underlying sink is missing".to_string())
        })?;
        let mut registry = Registry::new();
        for (name, accumulator) in self.registrations {
            registry.register(name, accumulator)?;
        }
        MultiplexWriter::with_fan_out(sink, registry, self.fan_out)
    }
}
