use std::future::Future;
use std::time::Duration;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::captions::{CaptionError, ErrorClass};

/// Bounded exponential backoff for captioning-service calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(rename = "base_delay_ms", with = "millis")]
    pub base_delay: Duration,
    pub rate_limit_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            rate_limit_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32, class: ErrorClass) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        match class {
            ErrorClass::RateLimited => delay.saturating_mul(self.rate_limit_multiplier),
            _ => delay,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Run `operation` under `policy`, collapsing every failure into `None`.
///
/// Permanent failures return immediately; transient ones are retried until
/// `max_attempts` calls have been made.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, video_id: &str, what: &str, operation: F) -> Option<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CaptionError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 0..max_attempts {
        let err = match operation().await {
            Ok(val) => return Some(val),
            Err(e) => e,
        };

        let class = err.class();
        match class {
            ErrorClass::NoCaptions => {
                info!("No transcript available for video {video_id}: {err}");
                return None;
            }
            ErrorClass::Unavailable => {
                warn!("Video {video_id} unavailable: {err}");
                return None;
            }
            ErrorClass::RateLimited | ErrorClass::Transient => {}
        }

        if attempt + 1 >= max_attempts {
            error!("{what} failed after {max_attempts} attempts for video {video_id}: {err}");
            return None;
        }

        let delay = policy.delay_for(attempt, class);
        if class == ErrorClass::RateLimited {
            warn!(
                "Rate limited during {what} (attempt {}/{max_attempts}), waiting {delay:?}",
                attempt + 1
            );
        } else {
            warn!(
                "{what} failed (attempt {}/{max_attempts}): {err}, retrying in {delay:?}",
                attempt + 1
            );
        }
        tokio::time::sleep(delay).await;
    }
    None
}
