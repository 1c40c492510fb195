// src/analysis/state_machine.rs
//
// Repetition phase tracking.
//
//   Top ──a < descend──▶ Descending ──a < bottom──▶ Bottom
//    ▲                                                 │
//    └──a > descend── Ascending ◀──a > bottom──────────┘
//
// Ascending → Top is the only edge that counts a repetition. Requiring a pass
// through Bottom keeps one noisy oscillation near a single threshold from
// being counted twice.

use crate::types::{AngleSample, PhaseRecord, PhaseState};
use tracing::{debug, info};

// ============================================================================
// DEFAULT THRESHOLDS
// ============================================================================
pub const DEFAULT_DESCEND_THRESHOLD: f64 = 160.0;
pub const DEFAULT_BOTTOM_THRESHOLD: f64 = 90.0;

// With bottom < descend at most two edges fire for one sample.
const MAX_TRANSITIONS_PER_SAMPLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseThresholds {
    pub descend: f64,
    pub bottom: f64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            descend: DEFAULT_DESCEND_THRESHOLD,
            bottom: DEFAULT_BOTTOM_THRESHOLD,
        }
    }
}

pub struct PhaseStateMachine {
    thresholds: PhaseThresholds,
    phase: PhaseState,
    repetitions: u32,
    timeline: Vec<PhaseRecord>,
}

impl PhaseStateMachine {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self {
            thresholds,
            phase: PhaseState::Top,
            repetitions: 0,
            timeline: Vec::new(),
        }
    }

    /// Consume the next angle sample. Returns true when it closed a repetition.
    ///
    /// Samples must arrive in increasing frame order. Transitions are applied
    /// until none fires, so a single sample can carry Bottom → Ascending → Top.
    pub fn update(&mut self, sample: AngleSample) -> bool {
        let mut completed = false;

        for _ in 0..MAX_TRANSITIONS_PER_SAMPLE {
            let Some(next) = self.next_phase(sample.angle) else {
                break;
            };

            debug!(
                "Frame {}: {} → {} at {:.1}°",
                sample.frame_index, self.phase, next, sample.angle
            );

            if self.phase == PhaseState::Ascending && next == PhaseState::Top {
                self.repetitions += 1;
                completed = true;
                info!(
                    "✓ Repetition {} completed at frame {}",
                    self.repetitions, sample.frame_index
                );
            }
            self.phase = next;
        }

        self.timeline.push(PhaseRecord {
            frame: sample.frame_index,
            phase: self.phase,
            angle: sample.angle,
        });

        completed
    }

    fn next_phase(&self, angle: f64) -> Option<PhaseState> {
        let PhaseThresholds { descend, bottom } = self.thresholds;

        match self.phase {
            PhaseState::Top if angle < descend => Some(PhaseState::Descending),
            PhaseState::Descending if angle < bottom => Some(PhaseState::Bottom),
            PhaseState::Bottom if angle > bottom => Some(PhaseState::Ascending),
            PhaseState::Ascending if angle > descend => Some(PhaseState::Top),
            _ => None,
        }
    }

    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn thresholds(&self) -> PhaseThresholds {
        self.thresholds
    }

    pub fn timeline(&self) -> &[PhaseRecord] {
        &self.timeline
    }

    pub fn into_timeline(self) -> Vec<PhaseRecord> {
        self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(angles: &[f64]) -> PhaseStateMachine {
        let mut machine = PhaseStateMachine::new(PhaseThresholds::default());
        for (i, &angle) in angles.iter().enumerate() {
            machine.update(AngleSample {
                frame_index: i as u64,
                angle,
            });
        }
        machine
    }

    #[test]
    fn test_single_cycle() {
        let machine = run(&[170.0, 170.0, 80.0, 80.0, 170.0]);
        assert_eq!(machine.phase(), PhaseState::Top);
        assert_eq!(machine.repetitions(), 1);
    }

    #[test]
    fn test_flat_signal_never_leaves_top() {
        let machine = run(&[170.0, 170.0, 170.0]);
        assert_eq!(machine.repetitions(), 0);
        assert!(machine
            .timeline()
            .iter()
            .all(|record| record.phase == PhaseState::Top));
    }

    #[test]
    fn test_no_samples() {
        let machine = run(&[]);
        assert_eq!(machine.phase(), PhaseState::Top);
        assert_eq!(machine.repetitions(), 0);
        assert!(machine.timeline().is_empty());
    }

    #[test]
    fn test_shallow_reps_never_count() {
        // Never reaches the bottom threshold
        let machine = run(&[170.0, 130.0, 100.0, 130.0, 170.0, 120.0, 95.0, 165.0]);
        assert_eq!(machine.repetitions(), 0);
        assert!(machine
            .timeline()
            .iter()
            .all(|r| matches!(r.phase, PhaseState::Top | PhaseState::Descending)));
    }

    #[test]
    fn test_gradual_cycle_walks_every_phase() {
        let machine = run(&[170.0, 140.0, 85.0, 100.0, 165.0]);
        let phases: Vec<PhaseState> = machine.timeline().iter().map(|r| r.phase).collect();
        assert_eq!(
            phases,
            vec![
                PhaseState::Top,
                PhaseState::Descending,
                PhaseState::Bottom,
                PhaseState::Ascending,
                PhaseState::Top,
            ]
        );
        assert_eq!(machine.repetitions(), 1);
    }

    #[test]
    fn test_noise_around_bottom_counts_once() {
        let machine = run(&[
            170.0, 120.0, 88.0, 92.0, 87.0, 93.0, 89.0, 120.0, 150.0, 158.0, 170.0,
        ]);
        assert_eq!(machine.repetitions(), 1);
    }

    #[test]
    fn test_noise_around_top_does_not_double_count() {
        let machine = run(&[170.0, 80.0, 170.0, 158.0, 162.0, 159.0, 163.0, 170.0]);
        assert_eq!(machine.repetitions(), 1);
        assert_eq!(machine.phase(), PhaseState::Descending);
    }

    #[test]
    fn test_repetitions_only_increment_on_return_to_top() {
        let angles = [
            170.0, 150.0, 85.0, 80.0, 95.0, 140.0, 175.0, 120.0, 70.0, 130.0, 179.0, 100.0,
        ];
        let mut machine = PhaseStateMachine::new(PhaseThresholds::default());
        let mut previous = machine.phase();

        for (i, &angle) in angles.iter().enumerate() {
            let before = machine.repetitions();
            let completed = machine.update(AngleSample {
                frame_index: i as u64,
                angle,
            });
            let after = machine.repetitions();

            if after > before {
                assert!(completed);
                assert_eq!(machine.phase(), PhaseState::Top);
                assert!(
                    matches!(previous, PhaseState::Bottom | PhaseState::Ascending),
                    "rep counted from {:?}",
                    previous
                );
            } else {
                assert!(!completed);
            }
            previous = machine.phase();
        }

        assert_eq!(machine.repetitions(), 2);
        assert!(machine.repetitions() as usize <= angles.len() / 2);
    }

    #[test]
    fn test_timeline_records_every_sample() {
        let angles = [170.0, 100.0, 80.0, 120.0, 170.0, 170.0];
        let machine = run(&angles);
        let timeline = machine.into_timeline();

        assert_eq!(timeline.len(), angles.len());
        for (i, record) in timeline.iter().enumerate() {
            assert_eq!(record.frame, i as u64);
            assert_eq!(record.angle, angles[i]);
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let mut machine = PhaseStateMachine::new(PhaseThresholds {
            descend: 150.0,
            bottom: 70.0,
        });
        for (i, angle) in [155.0, 80.0, 65.0, 155.0].into_iter().enumerate() {
            machine.update(AngleSample {
                frame_index: i as u64,
                angle,
            });
        }
        assert_eq!(machine.repetitions(), 1);
    }
}
