use crate::error::{Error, Result};
use crate::upload::PollPolicy;
use crate::utils::accepted_types::AcceptedTypes;
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_WEBHOOK_URL: &str = "https://disnotsham.app.n8n.cloud/webhook/upload";

/// Command-line arguments; every flag can also come from the environment.
#[derive(Parser, Debug)]
#[command(name = "summary-uploader")]
#[command(about = "Upload PDF/TXT documents to a summarization webhook")]
#[command(version)]
pub struct Args {
    /// Webhook receiving both submissions and status checks
    #[arg(long, env = "SUMMARY_WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
    pub webhook_url: String,

    /// Delay before each status check, in milliseconds
    #[arg(long, env = "SUMMARY_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Status checks before giving up on a summary
    #[arg(long, env = "SUMMARY_POLL_MAX_ATTEMPTS", default_value_t = 30)]
    pub poll_max_attempts: u32,

    /// Interval multiplier applied after every status check
    #[arg(long, env = "SUMMARY_POLL_BACKOFF", default_value_t = 1.0)]
    pub poll_backoff: f64,

    /// Files that can be tracked at once
    #[arg(long, env = "SUMMARY_MAX_FILES", default_value_t = 3)]
    pub max_files: usize,
}

#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub webhook_url: String,
    pub poll: PollPolicy,
    pub max_files: usize,
    pub accepted: AcceptedTypes,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            poll: PollPolicy::default(),
            max_files: 3,
            accepted: AcceptedTypes::default(),
        }
    }
}

impl Args {
    pub fn into_config(self) -> Result<UploaderConfig> {
        if self.poll_max_attempts == 0 {
            return Err(Error::Config("poll attempts must be at least 1".to_string()));
        }
        if !(self.poll_backoff >= 1.0 && self.poll_backoff.is_finite()) {
            return Err(Error::Config(format!(
                "poll backoff must be a finite value >= 1.0, got {}",
                self.poll_backoff
            )));
        }
        if self.max_files == 0 {
            return Err(Error::Config("max files must be at least 1".to_string()));
        }

        let defaults = UploaderConfig::default();
        let interval = Duration::from_millis(self.poll_interval_ms);
        Ok(UploaderConfig {
            webhook_url: self.webhook_url,
            poll: PollPolicy {
                interval,
                max_attempts: self.poll_max_attempts,
                backoff: self.poll_backoff,
                max_interval: defaults.poll.max_interval.max(interval),
            },
            max_files: self.max_files,
            accepted: defaults.accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = Args::parse_from(["summary-uploader"]).into_config().unwrap();
        assert_eq!(config.webhook_url, DEFAULT_WEBHOOK_URL);
        assert_eq!(config.poll, PollPolicy::default());
        assert_eq!(config.max_files, 3);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Args::parse_from([
            "summary-uploader",
            "--webhook-url",
            "http://localhost:5678/webhook/upload",
            "--poll-interval-ms",
            "500",
            "--poll-max-attempts",
            "10",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.webhook_url, "http://localhost:5678/webhook/upload");
        assert_eq!(config.poll.interval, Duration::from_millis(500));
        assert_eq!(config.poll.max_attempts, 10);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let result = Args::parse_from(["summary-uploader", "--poll-max-attempts", "0"]).into_config();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn shrinking_backoff_is_rejected() {
        let result = Args::parse_from(["summary-uploader", "--poll-backoff", "0.5"]).into_config();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
