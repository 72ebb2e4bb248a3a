//! Feed scores
//!
//! A published route's vote score is its vote count plus a time component in
//! (0, 1). The time component maps the creation instant linearly between a
//! fixed epoch and a far-future horizon, so newer routes win only among routes
//! with the same vote count.

use chrono::{DateTime, Utc};

/// 2024-01-01T00:00:00Z
const EPOCH_SECS: i64 = 1_704_067_200;

/// 2100-01-01T00:00:00Z
const HORIZON_SECS: i64 = 4_102_444_800;

/// Keeps the component strictly inside the open interval
const EDGE: f64 = 1e-9;

/// Creation instant mapped into (0, 1)
pub fn time_component(created_at: DateTime<Utc>) -> f64 {
    let elapsed = (created_at.timestamp() - EPOCH_SECS) as f64;
    let span = (HORIZON_SECS - EPOCH_SECS) as f64;
    (elapsed / span).clamp(EDGE, 1.0 - EDGE)
}

/// Score for the vote-ordered feed
pub fn vote_score(num_votes: i64, created_at: DateTime<Utc>) -> f64 {
    num_votes.max(0) as f64 + time_component(created_at)
}

/// Score for the recency-ordered feed
pub fn recency_score(created_at: DateTime<Utc>) -> f64 {
    created_at.timestamp_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn test_component_bounds() {
        assert!(time_component(at(0)) > 0.0);
        assert!(time_component(at(EPOCH_SECS)) > 0.0);
        assert!(time_component(at(HORIZON_SECS + 1_000)) < 1.0);

        let midpoint = time_component(at((EPOCH_SECS + HORIZON_SECS) / 2));
        assert!((midpoint - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_votes_dominate_recency() {
        let old = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let new = old + Duration::days(365 * 20);
        assert!(vote_score(5, old) > vote_score(0, new));
        assert!(vote_score(1, old) > vote_score(0, new));
    }

    #[test]
    fn test_recency_breaks_vote_ties() {
        let old = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let new = old + Duration::hours(1);
        assert!(vote_score(3, new) > vote_score(3, old));
        assert!(recency_score(new) > recency_score(old));
    }

    proptest! {
        #[test]
        fn prop_component_in_open_unit_interval(secs in 0i64..5_000_000_000) {
            let component = time_component(at(secs));
            prop_assert!(component > 0.0 && component < 1.0);
        }

        #[test]
        fn prop_component_is_monotonic(a in EPOCH_SECS..HORIZON_SECS, b in EPOCH_SECS..HORIZON_SECS) {
            if a < b {
                prop_assert!(time_component(at(a)) <= time_component(at(b)));
            }
        }
    }
}
