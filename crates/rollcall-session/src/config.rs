use std::time::Duration;

use rollcall_client::DEFAULT_ENDPOINT;
use rollcall_core::frame::DEFAULT_JPEG_QUALITY;
use rollcall_core::DEFAULT_YAW_THRESHOLD_DEG;

/// Session configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Recognition service URL frames are posted to.
    pub endpoint: String,
    /// Milliseconds between frame samples.
    pub sample_interval_ms: u64,
    /// Timeout in seconds for one recognition request.
    pub request_timeout_secs: u64,
    /// JPEG quality (1-100) for uploaded frames.
    pub jpeg_quality: u8,
    /// Head yaw in degrees the subject must exceed to pass the turn step.
    pub yaw_threshold_deg: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sample_interval_ms: 1200,
            request_timeout_secs: 5,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            yaw_threshold_deg: DEFAULT_YAW_THRESHOLD_DEG,
        }
    }
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("ROLLCALL_ENDPOINT").unwrap_or(defaults.endpoint),
            sample_interval_ms: env_parse("ROLLCALL_INTERVAL_MS", defaults.sample_interval_ms),
            request_timeout_secs: env_parse(
                "ROLLCALL_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            jpeg_quality: env_parse("ROLLCALL_JPEG_QUALITY", defaults.jpeg_quality),
            yaw_threshold_deg: env_parse("ROLLCALL_YAW_THRESHOLD", defaults.yaw_threshold_deg),
        }
    }

    /// Sampling period. Never zero.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sample_interval(), Duration::from_millis(1200));
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.yaw_threshold_deg, 15.0);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config {
            sample_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.sample_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // Key is unique to this test so parallel tests cannot interfere
        std::env::set_var("ROLLCALL_TEST_GARBAGE_U64", "twelve");
        assert_eq!(env_parse("ROLLCALL_TEST_GARBAGE_U64", 7u64), 7);
        std::env::remove_var("ROLLCALL_TEST_GARBAGE_U64");
        assert_eq!(env_parse("ROLLCALL_TEST_UNSET_U64", 9u64), 9);
    }
}
