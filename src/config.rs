//! Review run configuration.
//!
//! Defaults match the journal workflow this tool grew out of; every knob can
//! be raised or lowered per run. Larger chunks mean fewer remote calls but
//! longer per-call latency and more risk of truncation by the service.

use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for one review run.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Maximum characters per analysis chunk.
    pub max_chunk_len: usize,
    /// Self-throttle between successive chunk calls.
    pub inter_call_delay: Duration,
    /// Wait after the remote service signals quota exhaustion.
    pub rate_limit_backoff: Duration,
    /// Retries allowed per chunk after a rate-limit signal.
    pub max_retries_per_chunk: u32,
    /// Opening window inspected by the structure check.
    pub structure_window: usize,
    /// Closing window inspected by the references check.
    pub references_window: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: 15_000,
            inter_call_delay: Duration::from_secs(5),
            rate_limit_backoff: Duration::from_secs(60),
            max_retries_per_chunk: 1,
            structure_window: 10_000,
            references_window: 8_000,
        }
    }
}

impl ReviewConfig {
    /// Defaults overridden by any `COPYDESK_*` environment variables.
    ///
    /// Recognized: `COPYDESK_CHUNK_LEN`, `COPYDESK_INTER_CALL_DELAY_SECS`,
    /// `COPYDESK_BACKOFF_SECS`, `COPYDESK_MAX_RETRIES`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = read_env("COPYDESK_CHUNK_LEN")? {
            config.max_chunk_len = parse_positive("COPYDESK_CHUNK_LEN", &value)?;
        }
        if let Some(value) = read_env("COPYDESK_INTER_CALL_DELAY_SECS")? {
            config.inter_call_delay =
                Duration::from_secs(parse_u64("COPYDESK_INTER_CALL_DELAY_SECS", &value)?);
        }
        if let Some(value) = read_env("COPYDESK_BACKOFF_SECS")? {
            config.rate_limit_backoff =
                Duration::from_secs(parse_u64("COPYDESK_BACKOFF_SECS", &value)?);
        }
        if let Some(value) = read_env("COPYDESK_MAX_RETRIES")? {
            config.max_retries_per_chunk = value
                .parse()
                .map_err(|_| invalid("COPYDESK_MAX_RETRIES", &value))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject option values the chunker and pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_len == 0 {
            return Err(Error::Config("chunk length must be positive".into()));
        }
        if self.structure_window == 0 || self.references_window == 0 {
            return Err(Error::Config("analysis windows must be positive".into()));
        }
        Ok(())
    }
}

fn read_env(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) => Ok(None),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Config(format!("cannot read {}: {}", name, e))),
    }
}

fn parse_u64(name: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| invalid(name, value))
}

fn parse_positive(name: &str, value: &str) -> Result<usize> {
    match value.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(name, value)),
    }
}

fn invalid(name: &str, value: &str) -> Error {
    Error::Config(format!("invalid value for {}: {:?}", name, value))
}
