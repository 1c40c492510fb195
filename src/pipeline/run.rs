// src/pipeline/run.rs
//
// All mutable state of one analysis run. Owned by exactly one engine and
// never shared, so concurrent runs need no locking.

use crate::analysis::{PhaseStateMachine, PhaseThresholds};
use crate::types::{AngleSample, FormFlag, PhaseRecord, PhaseState};

pub struct AnalysisRun {
    phase_machine: PhaseStateMachine,
    angles: Vec<AngleSample>,
    flags: Vec<FormFlag>,
    cheat_detected: bool,
    frames_processed: u64,
    frames_with_pose: u64,
}

impl AnalysisRun {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self {
            phase_machine: PhaseStateMachine::new(thresholds),
            angles: Vec::new(),
            flags: Vec::new(),
            cheat_detected: false,
            frames_processed: 0,
            frames_with_pose: 0,
        }
    }

    /// Claim the index for the next frame, whether or not a body was found in it.
    pub(crate) fn begin_frame(&mut self, pose_detected: bool) -> u64 {
        let frame_index = self.frames_processed;
        self.frames_processed += 1;
        if pose_detected {
            self.frames_with_pose += 1;
        }
        frame_index
    }

    pub(crate) fn record_angle(&mut self, sample: AngleSample) -> bool {
        self.angles.push(sample);
        self.phase_machine.update(sample)
    }

    pub(crate) fn record_flags(&mut self, flags: &[FormFlag]) {
        // Sticky: once a serious violation is seen the run stays flagged.
        if flags.iter().any(|f| f.kind.is_cheat()) {
            self.cheat_detected = true;
        }
        self.flags.extend_from_slice(flags);
    }

    pub fn phase(&self) -> PhaseState {
        self.phase_machine.phase()
    }

    pub fn repetitions(&self) -> u32 {
        self.phase_machine.repetitions()
    }

    pub fn angles(&self) -> &[AngleSample] {
        &self.angles
    }

    pub fn flags(&self) -> &[FormFlag] {
        &self.flags
    }

    pub fn timeline(&self) -> &[PhaseRecord] {
        self.phase_machine.timeline()
    }

    pub fn cheat_detected(&self) -> bool {
        self.cheat_detected
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_with_pose(&self) -> u64 {
        self.frames_with_pose
    }

    pub(crate) fn into_timeline(self) -> Vec<PhaseRecord> {
        self.phase_machine.into_timeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormFlagKind;

    #[test]
    fn test_frame_indices_are_monotonic() {
        let mut run = AnalysisRun::new(PhaseThresholds::default());
        assert_eq!(run.begin_frame(true), 0);
        assert_eq!(run.begin_frame(false), 1);
        assert_eq!(run.begin_frame(true), 2);
        assert_eq!(run.frames_processed(), 3);
        assert_eq!(run.frames_with_pose(), 2);
    }

    #[test]
    fn test_cheat_flag_is_sticky() {
        let mut run = AnalysisRun::new(PhaseThresholds::default());

        run.record_flags(&[FormFlag::new(FormFlagKind::ElbowFlare, 0)]);
        assert!(!run.cheat_detected(), "elbow flare is advisory only");

        run.record_flags(&[FormFlag::new(FormFlagKind::BackSag, 1)]);
        assert!(run.cheat_detected());

        run.record_flags(&[]);
        run.record_flags(&[FormFlag::new(FormFlagKind::ElbowFlare, 2)]);
        assert!(run.cheat_detected());
        assert_eq!(run.flags().len(), 3);
    }
}
