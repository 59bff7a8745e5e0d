use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encoding::DigestEncoding;
use crate::error::HashWriterError;
use crate::pool::{FanOut, HashingPool};

pub const CONFIG_ENV: &str = "MULTIPLEX_HASHER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WriterConfig {
    pub algorithms: Option<Vec<String>>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FanOutConfig {
    pub mode: Option<String>,
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    pub writer: Option<WriterConfig>,
    pub fanout: Option<FanOutConfig>,
}

impl RuntimeConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let p = path.as_ref();
        let mut s = String::new();
        let mut f = File::open(p)?;
        f.read_to_string(&mut s)?;
        if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
            match ext.to_lowercase().as_str() {
                "toml" => Ok(toml::from_str(&s)?),
                "yaml" | "yml" => Ok(serde_yaml::from_str(&s)?),
                "json" => Ok(serde_json::from_str(&s)?),
                _ => Err(anyhow::anyhow!("Unsupported config extension: {}", ext)),
            }
        } else {
            Err(anyhow::anyhow!("Config file has no extension"))
        }
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: RuntimeConfig) {
        if let Some(w) = other.writer {
            let target = self.writer.get_or_insert_with(Default::default);
            if w.algorithms.is_some() {
                target.algorithms = w.algorithms;
            }
            if w.encoding.is_some() {
                target.encoding = w.encoding;
            }
        }

        if let Some(f) = other.fanout {
            let target = self.fanout.get_or_insert_with(Default::default);
            if f.mode.is_some() {
                target.mode = f.mode;
            }
            if f.threads.is_some() {
                target.threads = f.threads;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(w) = &self.writer {
            if let Some(algs) = &w.algorithms {
                if algs.iter().any(|a| a.trim().is_empty()) {
                    anyhow::bail!("writer.algorithms cannot contain empty names");
                }
            }
            if let Some(enc) = w.encoding.as_deref() {
                enc.parse::<DigestEncoding>()
                    .with_context(|| format!("invalid writer.encoding '{}'", enc))?;
            }
        }

        if let Some(f) = &self.fanout {
            if let Some(threads) = f.threads {
                if threads == 0 {
                    anyhow::bail!("fanout.threads must be greater than 0");
                }
            }
            if let Some(mode) = f.mode.as_deref() {
                let parsed = mode
                    .parse::<FanOut>()
                    .with_context(|| format!("invalid fanout.mode '{}'", mode))?;
                if matches!(parsed, FanOut::Sequential) && f.threads.is_some() {
                    anyhow::bail!("fanout.threads requires fanout.mode = \"parallel\"");
                }
            }
        }

        Ok(())
    }

    /// Configured algorithm names, trimmed, in file order.
    pub fn algorithm_names(&self) -> Vec<String> {
        self.writer
            .as_ref()
            .and_then(|w| w.algorithms.as_ref())
            .map(|algs| algs.iter().map(|a| a.trim().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn encoding(&self) -> crate::Result<DigestEncoding> {
        match self.writer.as_ref().and_then(|w| w.encoding.as_deref()) {
            Some(enc) => enc.parse(),
            None => Ok(DigestEncoding::default()),
        }
    }

    /// Resolve the fan-out strategy. A thread count with parallel mode gets a
    /// dedicated [`HashingPool`]; with sequential mode it is rejected.
    pub fn fan_out(&self) -> crate::Result<FanOut> {
        let fanout = self.fanout.clone().unwrap_or_default();
        let mode = match fanout.mode.as_deref() {
            Some(m) => m.parse()?,
            None => FanOut::default(),
        };
        match (mode, fanout.threads) {
            (FanOut::Parallel, Some(0)) => Err(HashWriterError::InvalidConfiguration(
                "fanout.threads must be greater than 0".to_string(),
            )),
            (FanOut::Parallel, Some(threads)) => Ok(FanOut::Pool(HashingPool::new(threads)?)),
            (FanOut::Sequential, Some(_)) => Err(HashWriterError::InvalidConfiguration(
                "fanout.threads requires parallel fan-out".to_string(),
            )),
            (mode, _) => Ok(mode),
        }
    }
}

fn parse_usize(val: &str) -> Option<usize> {
    val.trim().parse::<usize>().ok()
}

fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Apply `MULTIPLEX_HASHER_*` environment overrides.
pub fn apply_env_overrides(cfg: &mut RuntimeConfig) {
    if let Ok(algs) = env::var("MULTIPLEX_HASHER_ALGORITHMS") {
        let names = parse_list(&algs);
        if !names.is_empty() {
            cfg.writer.get_or_insert_with(Default::default).algorithms = Some(names);
        }
    }
    if let Ok(enc) = env::var("MULTIPLEX_HASHER_ENCODING") {
        cfg.writer.get_or_insert_with(Default::default).encoding = Some(enc);
    }
    if let Ok(mode) = env::var("MULTIPLEX_HASHER_FANOUT") {
        cfg.fanout.get_or_insert_with(Default::default).mode = Some(mode);
    }
    if let Ok(threads_str) = env::var("MULTIPLEX_HASHER_THREADS") {
        if let Some(threads) = parse_usize(&threads_str) {
            cfg.fanout.get_or_insert_with(Default::default).threads = Some(threads);
        }
    }
}

/// Load configuration honoring precedence:
/// file named by `MULTIPLEX_HASHER_CONFIG` < `explicit` < `MULTIPLEX_HASHER_*` variables
pub fn load_runtime_config(explicit: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let mut cfg = RuntimeConfig::default();

    if let Some(env_path) = env::var_os(CONFIG_ENV) {
        let env_path = PathBuf::from(env_path);
        let cfg_env = RuntimeConfig::load_from_file(&env_path)
            .with_context(|| format!("loading config from {} ({:?})", CONFIG_ENV, env_path))?;
        cfg.merge(cfg_env);
    }

    if let Some(p) = explicit {
        let file_cfg = RuntimeConfig::load_from_file(p)
            .with_context(|| format!("loading config {:?}", p))?;
        cfg.merge(file_cfg);
    }

    apply_env_overrides(&mut cfg);
    cfg.validate()?;

    Ok(cfg)
}
