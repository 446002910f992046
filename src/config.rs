use std::time::Duration;

pub const DEFAULT_UP_BASE_URL: &str = "https://api.up.com.au/api/v1/";
pub const DEFAULT_INTAKE_TOPIC: &str = "webhook-events";
pub const DEFAULT_REPUBLISH_TOPIC: &str = "transactions";
/// Header carrying the upstream's HMAC of the webhook body.
pub const SIGNATURE_HEADER: &str = "X-Up-Authenticity-Signature";

/// What a run does when the cached balance cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistencePolicy {
    /// Persist concurrently with fan-out and only log a failure.
    #[default]
    LogAndContinue,
    /// Persist before fan-out and fail the run on error.
    Abort,
}

/// Settings for [`crate::application::pipeline::TransactionPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub republish_topic: String,
    pub delivery_timeout: Duration,
    pub persistence_policy: PersistencePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            republish_topic: DEFAULT_REPUBLISH_TOPIC.to_string(),
            delivery_timeout: Duration::from_secs(10),
            persistence_policy: PersistencePolicy::default(),
        }
    }
}
