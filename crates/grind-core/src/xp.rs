//! XP calculation engine: session awards and level inversion.
//!
//! XP amounts are `f64` throughout. Partial focus minutes earn partial XP,
//! so values are fractional by nature; display layers round for
//! presentation only.

use serde::{Deserialize, Serialize};

use crate::session::StreakSegment;

/// Flat XP earned per focus minute, independent of streaks.
pub const BASE_XP_PER_MINUTE: f64 = 10.0;

/// Flat bonus per completed streak hour for hours 1-3.
pub const STREAK_BONUS_PER_HOUR: f64 = 100.0;

/// Growth factor applied per hour from hour 4 onward.
pub const ACCELERATION_MULTIPLIER: f64 = 1.5;

/// XP required to clear each level within the first 5-level band.
pub const BASE_LEVEL_COST: f64 = 700.0;

/// Base-rate component of one focus hour (60 min x 10 XP).
const BASE_XP_PER_HOUR: f64 = 60.0 * BASE_XP_PER_MINUTE;

/// Total per-hour XP attributed to hour 3 (600 base + 100 bonus).
/// Seed for the accelerating series starting at hour 4.
const HOUR_THREE_TOTAL: f64 = 700.0;

/// Number of leading streak hours paid at the flat bonus rate.
const FLAT_BONUS_HOURS: u32 = 3;

/// Hard ceiling on levels. Bounds the inversion loop for absurd inputs
/// (a finite `f64` can otherwise demand ~10^150 iterations).
pub const MAX_LEVEL: u32 = 100_000;

// ============================================================================
// Result Types
// ============================================================================

/// Itemized XP sources for a session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XpBreakdown {
    /// Flat per-minute XP.
    pub base_focus_xp: f64,
    /// Flat bonus for streak hours 1-3 (pro-rated for a trailing partial hour).
    pub streak_bonus_xp: f64,
    /// Accelerating bonus for streak hours 4+.
    pub accelerated_bonus_xp: f64,
}

/// Full XP award for one completed session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XpAward {
    /// Flat per-minute XP.
    pub base_xp: f64,
    /// Sum of all streak bonuses across segments.
    pub bonus_xp: f64,
    /// `base_xp + bonus_xp`.
    pub total_xp: f64,
    /// Itemized sources.
    pub breakdown: XpBreakdown,
}

/// Level derived from a cumulative XP total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Level reached (>= 1).
    pub level: u32,
    /// XP accumulated within the current level.
    pub current_xp: f64,
    /// XP still needed to clear the current level.
    pub xp_to_next: f64,
}

// ============================================================================
// Session XP
// ============================================================================

/// Computes the XP award for a completed session.
///
/// Base XP is a flat rate on the total focus minutes. Bonus XP is computed
/// per streak segment independently and summed: a broken streak restarts
/// the bonus curve, so two 60-minute segments earn less bonus than one
/// 120-minute segment.
///
/// Negative or zero inputs contribute nothing; this function never fails.
pub fn session_xp(focus_minutes_total: f64, segments: &[StreakSegment]) -> XpAward {
    let base_xp = BASE_XP_PER_MINUTE * sanitize_minutes(focus_minutes_total);

    let mut streak_bonus_xp = 0.0;
    let mut accelerated_bonus_xp = 0.0;

    for segment in segments {
        let (streak, accelerated) = segment_bonus(segment.minutes);
        streak_bonus_xp += streak;
        accelerated_bonus_xp += accelerated;
    }

    let bonus_xp = streak_bonus_xp + accelerated_bonus_xp;

    XpAward {
        base_xp,
        bonus_xp,
        total_xp: base_xp + bonus_xp,
        breakdown: XpBreakdown {
            base_focus_xp: base_xp,
            streak_bonus_xp,
            accelerated_bonus_xp,
        },
    }
}

/// Computes `(streak_bonus, accelerated_bonus)` for a single segment.
fn segment_bonus(segment_minutes: f64) -> (f64, f64) {
    let minutes = sanitize_minutes(segment_minutes);
    let completed_hours = (minutes / 60.0).floor() as u32;
    let partial_minutes = minutes % 60.0;

    let mut streak_bonus = 0.0;
    let mut accelerated_bonus = 0.0;

    // Hours 1-3: flat bonus per completed hour.
    let flat_hours = completed_hours.min(FLAT_BONUS_HOURS);
    streak_bonus += f64::from(flat_hours) * STREAK_BONUS_PER_HOUR;

    // Hours 4+: accelerating returns. The per-hour total carries forward,
    // and only the part above the base rate counts as bonus (the base part
    // is already in base_xp).
    if completed_hours > FLAT_BONUS_HOURS {
        let mut per_hour_total = HOUR_THREE_TOTAL;
        for _hour in (FLAT_BONUS_HOURS + 1)..=completed_hours {
            per_hour_total *= ACCELERATION_MULTIPLIER;
            accelerated_bonus += per_hour_total - BASE_XP_PER_HOUR;
        }
    }

    // Trailing partial hour: same per-hour bonus rate, pro-rated.
    if partial_minutes > 0.0 {
        let hour_index = completed_hours + 1;
        let partial_ratio = partial_minutes / 60.0;

        if hour_index <= FLAT_BONUS_HOURS {
            streak_bonus += STREAK_BONUS_PER_HOUR * partial_ratio;
        } else {
            let exponent = i32::try_from(hour_index - FLAT_BONUS_HOURS - 1).unwrap_or(i32::MAX);
            let per_hour_prev = HOUR_THREE_TOTAL * ACCELERATION_MULTIPLIER.powi(exponent);
            let per_hour_curr = per_hour_prev * ACCELERATION_MULTIPLIER;
            accelerated_bonus += (per_hour_curr - BASE_XP_PER_HOUR) * partial_ratio;
        }
    }

    (streak_bonus, accelerated_bonus)
}

/// Clamps a minute count to a finite non-negative value.
fn sanitize_minutes(minutes: f64) -> f64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}

// ============================================================================
// Levels
// ============================================================================

/// XP required to clear the given level.
///
/// A step function over 5-level bands: levels 1-5 cost 700 each, levels
/// 6-10 cost 1400, levels 11-15 cost 2100, and so on.
pub fn xp_to_next_level(level: u32) -> f64 {
    let band = level.saturating_sub(1) / 5;
    BASE_LEVEL_COST + f64::from(band) * BASE_LEVEL_COST
}

/// Converts a cumulative XP total into a level plus within-level progress.
///
/// The inverse of [`xp_to_next_level`]: starting at level 1, each level's
/// cost is subtracted while the remainder covers it. Negative or non-finite
/// input is clamped to zero, and the loop stops at [`MAX_LEVEL`] so any
/// finite input terminates promptly.
pub fn level_from_xp(total_xp: f64) -> LevelInfo {
    let mut remaining = if total_xp.is_finite() && total_xp > 0.0 {
        total_xp
    } else {
        0.0
    };

    let mut level = 1;
    while level < MAX_LEVEL {
        let cost = xp_to_next_level(level);
        if remaining < cost {
            break;
        }
        remaining -= cost;
        level += 1;
    }

    LevelInfo {
        level,
        current_xp: remaining,
        xp_to_next: xp_to_next_level(level) - remaining,
    }
}

/// Total XP represented by a level plus within-level progress.
///
/// Exact sum of the thresholds for every cleared level; the round-trip
/// `level_from_xp(cumulative_xp(level, cur))` recovers `(level, cur)`.
pub fn cumulative_xp(level: u32, current_xp: f64) -> f64 {
    let mut total = if current_xp.is_finite() && current_xp > 0.0 {
        current_xp
    } else {
        0.0
    };
    for cleared in 1..level.min(MAX_LEVEL) {
        total += xp_to_next_level(cleared);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn segments(minutes: &[f64]) -> Vec<StreakSegment> {
        minutes.iter().map(|&m| StreakSegment { minutes: m }).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_three_hour_session() {
        let award = session_xp(180.0, &segments(&[180.0]));
        assert_close(award.base_xp, 1800.0);
        assert_close(award.breakdown.streak_bonus_xp, 300.0);
        assert_close(award.breakdown.accelerated_bonus_xp, 0.0);
        assert_close(award.total_xp, 2100.0);
    }

    #[test]
    fn test_four_hour_session_starts_acceleration() {
        let award = session_xp(240.0, &segments(&[240.0]));
        assert_close(award.base_xp, 2400.0);
        assert_close(award.breakdown.streak_bonus_xp, 300.0);
        // Hour 4: 700 * 1.5 - 600 = 450
        assert_close(award.breakdown.accelerated_bonus_xp, 450.0);
        assert_close(award.total_xp, 3150.0);
    }

    #[test]
    fn test_five_hour_session_compounds() {
        let award = session_xp(300.0, &segments(&[300.0]));
        // Hour 4: 1050 - 600 = 450; hour 5: 1575 - 600 = 975
        assert_close(award.breakdown.accelerated_bonus_xp, 1425.0);
        assert_close(award.total_xp, 3000.0 + 300.0 + 1425.0);
    }

    #[test]
    fn test_partial_hour_in_flat_range() {
        // 90 min: 1 completed hour (+100), 30 min into hour 2 (+50).
        let award = session_xp(90.0, &segments(&[90.0]));
        assert_close(award.base_xp, 900.0);
        assert_close(award.breakdown.streak_bonus_xp, 150.0);
        assert_close(award.breakdown.accelerated_bonus_xp, 0.0);
    }

    #[test]
    fn test_partial_hour_in_accelerated_range() {
        // 270 min = 4.5 h: hours 1-3 flat, hour 4 = 450, then half of
        // hour 5's rate: (1575 - 600) * 0.5 = 487.5.
        let award = session_xp(270.0, &segments(&[270.0]));
        assert_close(award.breakdown.streak_bonus_xp, 300.0);
        assert_close(award.breakdown.accelerated_bonus_xp, 937.5);
        assert_close(award.total_xp, 2700.0 + 1237.5);
    }

    #[test]
    fn test_broken_streak_earns_less_bonus() {
        let unbroken = session_xp(240.0, &segments(&[240.0]));
        let broken = session_xp(240.0, &segments(&[120.0, 120.0]));
        // Same base XP, but each 2-hour segment only reaches the flat range.
        assert_close(broken.base_xp, unbroken.base_xp);
        assert_close(broken.breakdown.streak_bonus_xp, 400.0);
        assert_close(broken.breakdown.accelerated_bonus_xp, 0.0);
        assert!(broken.total_xp < unbroken.total_xp);
    }

    #[test]
    fn test_degenerate_inputs_yield_zero() {
        let award = session_xp(0.0, &[]);
        assert_close(award.total_xp, 0.0);

        let award = session_xp(-50.0, &segments(&[-50.0]));
        assert_close(award.base_xp, 0.0);
        assert_close(award.bonus_xp, 0.0);

        let award = session_xp(f64::NAN, &segments(&[f64::NAN]));
        assert_close(award.total_xp, 0.0);
    }

    #[test]
    fn test_level_cost_bands() {
        for level in 1..=5 {
            assert_close(xp_to_next_level(level), 700.0);
        }
        for level in 6..=10 {
            assert_close(xp_to_next_level(level), 1400.0);
        }
        for level in 11..=15 {
            assert_close(xp_to_next_level(level), 2100.0);
        }
    }

    #[test]
    fn test_level_cost_non_decreasing() {
        let mut previous = 0.0;
        for level in 1..200 {
            let cost = xp_to_next_level(level);
            assert!(cost >= previous);
            previous = cost;
        }
    }

    #[test]
    fn test_level_from_zero_xp() {
        let info = level_from_xp(0.0);
        assert_eq!(info.level, 1);
        assert_close(info.current_xp, 0.0);
        assert_close(info.xp_to_next, 700.0);
    }

    #[test]
    fn test_level_from_exact_threshold() {
        let info = level_from_xp(700.0);
        assert_eq!(info.level, 2);
        assert_close(info.current_xp, 0.0);
    }

    #[test]
    fn test_level_from_band_crossing() {
        // Levels 1-5 cost 700 each = 3500 total; 3600 lands 100 into level 6.
        let info = level_from_xp(3600.0);
        assert_eq!(info.level, 6);
        assert_close(info.current_xp, 100.0);
        assert_close(info.xp_to_next, 1300.0);
    }

    #[test]
    fn test_level_from_adversarial_input() {
        let info = level_from_xp(-500.0);
        assert_eq!(info.level, 1);
        assert_close(info.current_xp, 0.0);

        let info = level_from_xp(f64::NAN);
        assert_eq!(info.level, 1);

        let info = level_from_xp(f64::INFINITY);
        assert_eq!(info.level, 1);

        // Absurd finite input terminates at the cap instead of spinning.
        let info = level_from_xp(f64::MAX);
        assert_eq!(info.level, MAX_LEVEL);
    }

    #[test]
    fn test_cumulative_round_trip() {
        for total in [0.0, 350.0, 700.0, 3499.0, 3500.0, 10_000.0, 123_456.7] {
            let info = level_from_xp(total);
            let rebuilt = cumulative_xp(info.level, info.current_xp);
            assert_close(rebuilt, total);
        }
    }
}
