use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfError;
use crate::abdpb::WriterId;

#[cfg(test)]
#[path = "./tests/conf_tests.rs"]
mod tests;

fn default_timeout_ms() -> u64 {
    2000
}

/// ClusterConf is what a coordinator needs to know about the replicas.
///
/// The order of `replicas` matters: a replica is referred to by its index in this list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClusterConf {
    /// Replica endpoints in `host:port` form.
    pub replicas: Vec<String>,

    /// Per-call timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Breaks ties between labels of different writers.
    /// A random one is chosen if it is absent.
    #[serde(default)]
    pub writer_id: Option<WriterId>,
}

impl ClusterConf {
    /// from_endpoints parses a comma separated list of `host:port`.
    pub fn from_endpoints(endpoints: &str) -> Result<ClusterConf, ConfError> {
        let replicas = endpoints.split(',').map(|x| x.trim().to_string()).collect();

        let conf = ClusterConf {
            replicas,
            timeout_ms: default_timeout_ms(),
            writer_id: None,
        };

        conf.check()?;
        Ok(conf)
    }

    /// from_file reads cluster conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterConf, ConfError> {
        let content = fs::read_to_string(path)?;
        let conf: ClusterConf = serde_yaml::from_str(content.as_str())?;

        conf.check()?;
        Ok(conf)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_writer_id(mut self, writer_id: WriterId) -> Self {
        self.writer_id = Some(writer_id);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// check rejects an empty list, blank endpoints and duplicates.
    pub fn check(&self) -> Result<(), ConfError> {
        if self.replicas.is_empty() {
            return Err(ConfError::NoReplica);
        }

        let mut seen = HashSet::new();
        for r in self.replicas.iter() {
            if r.is_empty() || r.contains(char::is_whitespace) {
                return Err(ConfError::BadEndpoint(r.clone()));
            }
            if !seen.insert(r) {
                return Err(ConfError::DupReplica(r.clone()));
            }
        }
        Ok(())
    }
}
