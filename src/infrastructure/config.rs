//! Ambient engine configuration: the default log level. There is
//! deliberately no cache directory or persistence setting here — the build
//! pipeline has no incremental state to persist (spec.md §1's Non-goals),
//! and no shell setting either — the engine never shells out a `command`
//! string (spec.md §9's plain whitespace split is final, not a fallback
//! for a configurable shell).

use serde::{Deserialize, Serialize};

/// Engine-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default `tracing` log level, used when no `RUST_LOG` override is set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_info_level() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
    }
}
