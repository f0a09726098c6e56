use crate::bundle::Eid;
use crate::routing::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Candidates fetched per search
pub const DEFAULT_MAX_CANDIDATES: usize = 10;

/// Outstanding transfers allowed per neighbor
pub const DEFAULT_MAX_IN_TRANSIT: usize = 5;

/// Configuration for the neighbor forwarding core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// This node's endpoint identifier
    pub local_node: Eid,

    /// Upper bound on the candidates one store query may return
    pub max_candidates: usize,

    /// Reservation capacity per neighbor
    pub max_in_transit_per_neighbor: usize,

    /// Pass a destination-prefix hint to indexed stores
    pub use_index_hint: bool,

    /// Thread name of the dispatcher worker
    pub worker_name: String,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            local_node: Eid::new("dtn://local").unwrap_or_else(|_| Eid::none()),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_in_transit_per_neighbor: DEFAULT_MAX_IN_TRANSIT,
            use_index_hint: true,
            worker_name: "neighbor-routing".to_string(),
        }
    }
}

impl ForwardingConfig {
    pub fn new(local_node: Eid) -> Self {
        Self {
            local_node: local_node.node(),
            ..Default::default()
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_max_in_transit(mut self, max_in_transit: usize) -> Self {
        self.max_in_transit_per_neighbor = max_in_transit;
        self
    }

    pub fn with_index_hint(mut self, enabled: bool) -> Self {
        self.use_index_hint = enabled;
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid(
                "max_candidates must be greater than zero".into(),
            ));
        }
        if self.max_in_transit_per_neighbor == 0 {
            return Err(ConfigError::Invalid(
                "max_in_transit_per_neighbor must be greater than zero".into(),
            ));
        }
        if self.worker_name.is_empty() {
            return Err(ConfigError::Invalid("worker_name must not be empty".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
