//! Pure mappings from elapsed time to normalized need levels.

/// Ticks from a full need level down to zero.
pub const NEED_HORIZON_TICKS: u64 = 200;

/// Ticks since the last meal before the survivor starts seeking food. Much
/// tighter than the depletion horizon so seeking starts long before the
/// level bottoms out.
pub const HUNGER_THRESHOLD_TICKS: u64 = 30;

/// Ticks since the last drink before the survivor starts seeking water.
pub const THIRST_THRESHOLD_TICKS: u64 = 25;

/// Normalized need level: 1.0 immediately after satisfaction, 0.0 once
/// `horizon` ticks have elapsed.
pub fn level(elapsed: u64, horizon: u64) -> f32 {
    1.0 - (elapsed as f32 / horizon as f32).clamp(0.0, 1.0)
}

pub fn hunger_level(now: u64, last_ate: u64) -> f32 {
    level(now.saturating_sub(last_ate), NEED_HORIZON_TICKS)
}

pub fn thirst_level(now: u64, last_drank: u64) -> f32 {
    level(now.saturating_sub(last_drank), NEED_HORIZON_TICKS)
}

pub fn is_hungry(now: u64, last_ate: u64) -> bool {
    now.saturating_sub(last_ate) > HUNGER_THRESHOLD_TICKS
}

pub fn is_thirsty(now: u64, last_drank: u64) -> bool {
    now.saturating_sub(last_drank) > THIRST_THRESHOLD_TICKS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_saturates_at_both_ends() {
        assert_eq!(level(0, NEED_HORIZON_TICKS), 1.0);
        assert_eq!(level(NEED_HORIZON_TICKS, NEED_HORIZON_TICKS), 0.0);
        assert_eq!(level(NEED_HORIZON_TICKS * 3, NEED_HORIZON_TICKS), 0.0);
    }

    #[test]
    fn level_decreases_with_elapsed_time() {
        let mut previous = level(0, NEED_HORIZON_TICKS);
        for elapsed in 1..=NEED_HORIZON_TICKS {
            let current = level(elapsed, NEED_HORIZON_TICKS);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn hunger_triggers_strictly_after_the_threshold() {
        assert!(!is_hungry(HUNGER_THRESHOLD_TICKS, 0));
        assert!(is_hungry(HUNGER_THRESHOLD_TICKS + 1, 0));
    }

    #[test]
    fn thirst_triggers_strictly_after_the_threshold() {
        assert!(!is_thirsty(THIRST_THRESHOLD_TICKS, 0));
        assert!(is_thirsty(THIRST_THRESHOLD_TICKS + 1, 0));
    }
}
