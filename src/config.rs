use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::{PoolError, Result};

const DEFAULT_THREAD_NAME: &str = "workpool";

/// Settings for a [`WorkerPool`](crate::WorkerPool).
///
/// Capacities of `None` make the queue unbounded. With `Some(n)`, producers
/// block once `n` jobs are waiting and workers block once `n` results are
/// waiting for a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Capacity of the job intake.
    pub intake_capacity: Option<usize>,
    /// Capacity of the result stream.
    pub result_capacity: Option<usize>,
    /// Prefix for pool thread names: `{prefix}-worker-{index}`,
    /// `{prefix}-supervisor` and `{prefix}-feeder`.
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: num_cpus::get(),
            intake_capacity: None,
            result_capacity: None,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}

impl PoolConfig {
    /// Creates a config with `workers` workers and unbounded queues.
    pub fn new(workers: usize) -> Self {
        PoolConfig {
            workers,
            ..PoolConfig::default()
        }
    }

    /// Bounds the job intake.
    pub fn intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = Some(capacity);
        self
    }

    /// Bounds the result stream.
    pub fn result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = Some(capacity);
        self
    }

    /// Sets the thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Loads a config from a JSON document. Missing fields take defaults.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: PoolConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no pool can run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PoolError::InvalidWorkerCount(self.workers));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = PoolConfig::from_reader(r#"{"workers": 3, "result_capacity": 8}"#.as_bytes())
            .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.intake_capacity, None);
        assert_eq!(config.result_capacity, Some(8));
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn zero_workers_rejected() {
        let err = PoolConfig::from_reader(r#"{"workers": 0}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, PoolError::InvalidWorkerCount(0)));
    }

    #[test]
    fn malformed_document_rejected() {
        let err = PoolConfig::from_reader("{workers".as_bytes()).unwrap_err();
        assert!(matches!(err, PoolError::Config(_)));
    }
}
