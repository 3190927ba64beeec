use serde::Serialize;
use crate::config::config::ExpressionRule;
use crate::helper::landmark_helper::{FaceSignals, FrameSignals};

/// Whole-video tallies of the per-frame signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunningCounters {
    pub frame_count: u64,
    pub blink_count: u64,
    pub brow_movement_count: u64,
    pub hand_movement_count: u64,
    pub posture_issues: u64,
    pub smile_count: u64,
    pub frown_count: u64,
    pub neutral_face_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionClass {
    Smile,
    FrownCandidate,
    Neutral,
}

/// Accumulates frame signals into `RunningCounters`. Every face is given
/// exactly one expression class; under `WholeVideo` closed-mouth faces are
/// held back until `finish`.
#[derive(Debug, Clone)]
pub struct Aggregator {
    counters: RunningCounters,
    rule: ExpressionRule,
    frown_brow_count: u64,
    deferred_faces: u64,
}

impl Aggregator {
    pub fn new(rule: ExpressionRule, frown_brow_count: u64) -> Self {
        Aggregator {
            counters: RunningCounters::default(),
            rule,
            frown_brow_count,
            deferred_faces: 0,
        }
    }

    /// record counts one decoded frame, whether or not anything was detected in it.
    pub fn record(&mut self, signals: &FrameSignals) {
        self.counters.frame_count += 1;

        for face in &signals.faces {
            self.record_face(face);
        }
        if signals.hand_moved {
            self.counters.hand_movement_count += 1;
        }
        if signals.posture_bad == Some(true) {
            self.counters.posture_issues += 1;
        }
    }

    fn record_face(&mut self, face: &FaceSignals) {
        if face.blinked {
            self.counters.blink_count += 1;
        }
        // counted before classifying, a raise in this face can tip it to a frown
        if face.brow_raised {
            self.counters.brow_movement_count += 1;
        }

        match self.classify(face) {
            Some(class) => self.count_expression(class, 1),
            None => self.deferred_faces += 1,
        }
    }

    /// classify applies the expression rule against the counters seen so far.
    /// Returns `None` when the class can only be known after the last frame.
    pub fn classify(&self, face: &FaceSignals) -> Option<ExpressionClass> {
        if face.mouth_open {
            return Some(ExpressionClass::Smile)
        }
        match self.rule {
            ExpressionRule::Cumulative => Some(self.closed_mouth_class()),
            ExpressionRule::WholeVideo => None,
        }
    }

    fn closed_mouth_class(&self) -> ExpressionClass {
        if self.counters.brow_movement_count > self.frown_brow_count {
            ExpressionClass::FrownCandidate
        } else {
            ExpressionClass::Neutral
        }
    }

    fn count_expression(&mut self, class: ExpressionClass, n: u64) {
        match class {
            ExpressionClass::Smile => self.counters.smile_count += n,
            ExpressionClass::FrownCandidate => self.counters.frown_count += n,
            ExpressionClass::Neutral => self.counters.neutral_face_count += n,
        }
    }

    pub fn counters(&self) -> &RunningCounters {
        &self.counters
    }

    /// finish resolves deferred faces against the final brow count and returns the tallies.
    pub fn finish(mut self) -> RunningCounters {
        if self.deferred_faces > 0 {
            let class = self.closed_mouth_class();
            self.count_expression(class, self.deferred_faces);
            self.deferred_faces = 0;
        }
        self.counters
    }
}
