//! Cumulative probability-band selection.
//!
//! Profiles are scanned in list order. Each banding-eligible profile owns a
//! band whose width is its probability minus the previous eligible
//! probability, floored at zero; the running baseline resets to zero whenever
//! probabilities decrease in list order. Configs rely on the reset to give
//! a low-probability profile a band after a near-certain one.
//!
//! Unconditional profiles (negative probability) bypass banding entirely and
//! fire whenever they are encountered un-maxed. Placeholder profiles occupy
//! band space but never fire, absorbing rolls that land in their band.

use crate::constants::is_unconditional;

/// One profile's view into the band computation.
#[derive(Debug, Clone, Copy)]
pub struct BandEntry {
    /// Configured probability; negative means unconditional.
    pub probability: f32,
    /// Placeholder profiles never fire but still occupy band space.
    pub placeholder: bool,
    /// Whether the profile has reached its applicable bound this pass.
    pub maxed: bool,
}

impl BandEntry {
    /// Banding-eligible: contributes a band to the adjusted total.
    fn banded(&self) -> bool {
        !self.maxed && !is_unconditional(self.probability)
    }
}

/// Result of a single selection pass over the profile list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutcome {
    /// Indices that fired, in scan order. At most one of these is
    /// probability-based and it is always the last.
    pub fired: Vec<usize>,
}

/// Sum of adjusted band widths over banding-eligible profiles.
///
/// A zero total means no probability-based profile can fire this pass
/// (everything is maxed, unconditional, or zero-width).
pub fn adjusted_total(entries: &[BandEntry]) -> f32 {
    let mut baseline = 0.0_f32;
    let mut total = 0.0_f32;
    for entry in entries {
        if !entry.banded() {
            continue;
        }
        total += band_width(entry.probability, baseline);
        baseline = entry.probability;
    }
    total
}

/// Walk the profile list once with a pre-drawn roll in `[0, adjusted_total)`.
///
/// Unconditional un-maxed profiles fire without consuming the roll; several
/// may fire in one pass. The first probability-based profile whose band
/// covers the roll fires and ends the pass. Placeholders advance the band
/// cursor without firing, so a roll landing in a placeholder band fires
/// nothing.
pub fn select_pass(entries: &[BandEntry], roll: f32) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let mut baseline = 0.0_f32;
    let mut cursor = 0.0_f32;

    for (index, entry) in entries.iter().enumerate() {
        if is_unconditional(entry.probability) {
            if !entry.maxed && !entry.placeholder {
                outcome.fired.push(index);
            }
            continue;
        }
        if entry.maxed {
            continue;
        }

        let width = band_width(entry.probability, baseline);
        if !entry.placeholder && roll >= cursor && roll < cursor + width {
            outcome.fired.push(index);
            break;
        }
        cursor += width;
        baseline = entry.probability;
    }

    outcome
}

/// Adjusted width of one band given the running baseline. The baseline
/// resets to zero when the probability is lower than its predecessor.
fn band_width(probability: f32, baseline: f32) -> f32 {
    if probability >= baseline {
        probability - baseline
    } else {
        probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNCONDITIONAL;

    fn banded(p: f32) -> BandEntry {
        BandEntry {
            probability: p,
            placeholder: false,
            maxed: false,
        }
    }

    #[test]
    fn total_over_nondecreasing_probabilities() {
        let entries = [banded(0.5), banded(1.0)];
        assert!((adjusted_total(&entries) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decreasing_probability_resets_baseline() {
        // 0.99 then 0.01: second band is 0.01 wide, not clamped to zero.
        let entries = [banded(0.99), banded(0.01)];
        assert!((adjusted_total(&entries) - 1.0).abs() < 1e-6);

        let pick_first = select_pass(&entries, 0.5);
        assert_eq!(pick_first.fired, vec![0]);
        let pick_second = select_pass(&entries, 0.995);
        assert_eq!(pick_second.fired, vec![1]);
    }

    #[test]
    fn fixed_rolls_pick_profiles_in_band_order() {
        // Bands [0, 0.5) and [0.5, 1.0): rolls 0.3 then 0.7 pick 0 then 1.
        let entries = [banded(0.5), banded(1.0)];
        assert_eq!(select_pass(&entries, 0.3).fired, vec![0]);
        assert_eq!(select_pass(&entries, 0.7).fired, vec![1]);
    }

    #[test]
    fn unconditional_fires_without_consuming_roll() {
        let entries = [
            BandEntry {
                probability: UNCONDITIONAL,
                placeholder: false,
                maxed: false,
            },
            banded(0.5),
            banded(1.0),
        ];
        // Roll in the second band: unconditional fires first, then the pick.
        let outcome = select_pass(&entries, 0.7);
        assert_eq!(outcome.fired, vec![0, 2]);
        // Unconditional bands contribute nothing to the total.
        assert!((adjusted_total(&entries) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn maxed_profiles_are_skipped_and_keep_baseline() {
        let mut entries = [banded(0.5), banded(1.0)];
        entries[0].maxed = true;
        // Only the second band remains; baseline never saw 0.5.
        assert!((adjusted_total(&entries) - 1.0).abs() < f32::EPSILON);
        assert_eq!(select_pass(&entries, 0.2).fired, vec![1]);
    }

    #[test]
    fn placeholder_absorbs_roll_without_firing() {
        let mut entries = [banded(0.5), banded(1.0)];
        entries[0].placeholder = true;
        assert!((adjusted_total(&entries) - 1.0).abs() < f32::EPSILON);
        // Roll lands in the placeholder band: nothing fires.
        assert_eq!(select_pass(&entries, 0.2).fired, Vec::<usize>::new());
        // Roll above it still reaches the real profile.
        assert_eq!(select_pass(&entries, 0.7).fired, vec![1]);
    }

    #[test]
    fn probabilistic_pick_ends_the_pass() {
        let entries = [
            banded(0.5),
            BandEntry {
                probability: UNCONDITIONAL,
                placeholder: false,
                maxed: false,
            },
        ];
        // Pick in the first band: scanning stops before the unconditional.
        assert_eq!(select_pass(&entries, 0.1).fired, vec![0]);
    }

    #[test]
    fn empty_and_all_maxed_lists_fire_nothing() {
        assert_eq!(select_pass(&[], 0.0).fired, Vec::<usize>::new());
        let mut entries = [banded(0.5)];
        entries[0].maxed = true;
        assert_eq!(adjusted_total(&entries), 0.0);
        assert_eq!(select_pass(&entries, 0.0).fired, Vec::<usize>::new());
    }
}
