/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for the Herald framework.
///
/// Values are loaded once from `herald/config.toml` in the XDG config
/// directory; missing files or keys fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HeraldConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Limits and capacity configuration.
    pub limits: LimitsConfig,
}

/// Timeout-related configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default agent shutdown timeout in milliseconds.
    pub agent_shutdown_timeout_ms: u64,
    /// Default timeout for requests awaiting a response, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            agent_shutdown_timeout_ms: 10_000,
            request_timeout_ms: 5_000,
        }
    }
}

/// Limits and capacity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Capacity of each mailbox lane.
    pub agent_inbox_capacity: usize,
    /// Channel size for closed/default placeholder mailboxes.
    pub dummy_channel_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            agent_inbox_capacity: 255,
            dummy_channel_size: 1,
        }
    }
}

impl HeraldConfig {
    /// Loads the configuration from the XDG config directory, falling
    /// back to defaults when no file is present or it fails to parse.
    fn load() -> Self {
        let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("herald") else {
            return HeraldConfig::default();
        };
        let Some(path) = base_dirs.find_config_file("config.toml") else {
            return HeraldConfig::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded Herald configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid Herald configuration; using defaults");
                    HeraldConfig::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable Herald configuration; using defaults");
                HeraldConfig::default()
            }
        }
    }

    /// Default time a request waits for its response.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.request_timeout_ms)
    }

    /// Time allotted to each child agent during shutdown.
    pub fn agent_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.agent_shutdown_timeout_ms)
    }
}

lazy_static! {
    /// The process-wide Herald configuration, loaded on first access.
    pub(crate) static ref HERALD_CONFIG: HeraldConfig = HeraldConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = HeraldConfig::default();
        assert_eq!(config.limits.agent_inbox_capacity, 255);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
