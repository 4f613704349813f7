//! Availability of an action given its last activation.
//!
//! Both interactive queries and the expiry scheduler go through these two
//! functions so "looks available" and "is available" can never disagree.

use std::time::Duration;

use super::Timestamp;

pub fn is_available(now: Timestamp, activated_at: Option<Timestamp>, cooldown: Duration) -> bool {
    remaining(now, activated_at, cooldown).is_zero()
}

/// `max(0, cooldown - (now - activated_at))`, zero when never activated.
///
/// A clock that reads earlier than `activated_at` counts as zero elapsed.
pub fn remaining(now: Timestamp, activated_at: Option<Timestamp>, cooldown: Duration) -> Duration {
    let Some(activated_at) = activated_at else {
        return Duration::ZERO;
    };
    let elapsed = now.saturating_sub(activated_at).max(0) as u64;
    cooldown.saturating_sub(Duration::from_secs(elapsed))
}

/// Instant the cooldown window of an activation ends.
pub fn expires_at(activated_at: Timestamp, cooldown: Duration) -> Timestamp {
    activated_at.saturating_add(cooldown.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PET: Duration = Duration::from_secs(900);

    #[test]
    fn never_activated_is_available() {
        assert!(is_available(1_000, None, PET));
        assert_eq!(remaining(1_000, None, PET), Duration::ZERO);
    }

    #[test]
    fn inside_window_reports_exact_remaining() {
        assert!(!is_available(600, Some(500), PET));
        assert_eq!(remaining(600, Some(500), PET), Duration::from_secs(800));
    }

    #[test]
    fn boundary_is_available() {
        assert!(is_available(900, Some(0), PET));
        assert!(!is_available(899, Some(0), PET));
        assert_eq!(remaining(899, Some(0), PET), Duration::from_secs(1));
    }

    #[test]
    fn clock_behind_activation_counts_full_window() {
        assert_eq!(remaining(100, Some(200), PET), PET);
    }

    #[test]
    fn expiry_instant() {
        assert_eq!(expires_at(10, PET), 910);
    }
}
