//! The game's fixed recycler-to-credits conversion.
//!
//! The host publishes debris values computed with this same rate, so it is
//! the single source of truth for both sides of a correlation.

/// Credits of debris value implied by one recycler.
pub const CREDITS_PER_RECYCLER: u64 = 10;

/// Credits value of a fleet carrying `recyclers` salvage units.
pub fn credits_for(recyclers: u64) -> u64 {
    recyclers * CREDITS_PER_RECYCLER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_recyclers_are_worthless() {
        assert_eq!(credits_for(0), 0);
    }

    #[test]
    fn value_is_strictly_increasing() {
        for n in 0..100 {
            assert!(credits_for(n + 1) > credits_for(n));
        }
    }

    #[test]
    fn value_is_deterministic() {
        assert_eq!(credits_for(1250), credits_for(1250));
        assert_eq!(credits_for(1250), 12_500);
    }
}
