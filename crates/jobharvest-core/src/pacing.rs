//! Inter-request delays that look less mechanical than a fixed interval.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Delay between consecutive URLs in a batch.
///
/// The delay for URL `i` is `base + step * (i % cycle) + U[0, jitter]`.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub base: Duration,
    pub step: Duration,
    pub cycle: u32,
    pub jitter: Duration,
}

impl Default for PacingConfig {
    /// 3s base, ramping by 1s over a cycle of 4, plus up to 1s jitter.
    fn default() -> Self {
        Self {
            base: Duration::from_secs(3),
            step: Duration::from_secs(1),
            cycle: 4,
            jitter: Duration::from_secs(1),
        }
    }
}

impl PacingConfig {
    /// No delay at all.
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            step: Duration::ZERO,
            cycle: 1,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn delay_for(&self, index: usize) -> Duration {
        let ramp = (index as u64 % u64::from(self.cycle.max(1))) as u32;
        self.base + self.step * ramp + random_between(Duration::ZERO, self.jitter)
    }
}

/// Uniformly random duration in `[min, max]`.
pub fn random_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let span = (max - min).as_millis() as u64;
    min + Duration::from_millis(fastrand::u64(0..=span))
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// Returns false if the pause was cut short.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_ramps_and_wraps() {
        let pacing = PacingConfig::default().with_jitter(Duration::ZERO);
        assert_eq!(pacing.delay_for(0), Duration::from_secs(3));
        assert_eq!(pacing.delay_for(1), Duration::from_secs(4));
        assert_eq!(pacing.delay_for(3), Duration::from_secs(6));
        assert_eq!(pacing.delay_for(4), Duration::from_secs(3));
    }

    #[test]
    fn jitter_stays_in_range() {
        let pacing = PacingConfig::default();
        for i in 0..50 {
            let d = pacing.delay_for(i);
            let floor = Duration::from_secs(3 + (i as u64 % 4));
            assert!(d >= floor && d <= floor + Duration::from_secs(1));
        }
    }

    #[test]
    fn random_between_bounds() {
        let min = Duration::from_millis(500);
        let max = Duration::from_millis(1500);
        for _ in 0..100 {
            let d = random_between(min, max);
            assert!(d >= min && d <= max);
        }
        assert_eq!(random_between(max, min), max);
    }

    #[tokio::test]
    async fn pause_returns_false_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!pause(Duration::from_secs(3600), &cancel).await);
    }

    #[tokio::test]
    async fn zero_pause_completes() {
        let cancel = CancellationToken::new();
        assert!(pause(Duration::ZERO, &cancel).await);
        assert_eq!(PacingConfig::none().delay_for(7), Duration::ZERO);
    }
}
