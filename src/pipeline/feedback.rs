use serde::Serialize;
use crate::config::config::FeedbackThresholds;
use crate::pipeline::counters::RunningCounters;

pub const EXCESSIVE_BLINKING: &str = "Excessive blinking detected – Try to relax and maintain eye contact.";
pub const FREQUENT_BROW_MOVEMENT: &str = "Frequent eyebrow movements detected – You might be showing signs of nervousness.";
pub const FREQUENT_HAND_MOVEMENT: &str = "Frequent hand movements detected – Try to minimize unnecessary gestures.";
pub const POSTURE_ISSUES: &str = "Posture issues detected – Sit upright for better engagement.";
pub const GREAT_SMILE: &str = "Great smile detected – Positive engagement!";
pub const FREQUENT_FROWNING: &str = "Frequent frowning detected – Try to relax and appear more confident.";
pub const NEUTRAL_EXPRESSIONS: &str = "Neutral expressions detected – Consider adding slight expressions to stay engaging.";
pub const NO_ISSUES: &str = "Great body language! No issues detected.";

/// Ordered, human readable feedback for one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackReport {
    messages: Vec<String>,
}

impl FeedbackReport {
    pub fn new(messages: Vec<String>) -> Self {
        FeedbackReport { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// exceeds compares a counter against a frame-normalized ratio. An empty
/// video exceeds nothing.
fn exceeds(count: u64, frame_count: u64, ratio: f64) -> bool {
    frame_count > 0 && count as f64 > frame_count as f64 * ratio
}

/// synthesize turns the final counters into feedback.
///
/// Behavioral rules are checked independently in a fixed order, then at most
/// one expression message is added (smile, else frown, else neutral). The
/// no-issues message is used only when nothing else applies.
pub fn synthesize(counters: &RunningCounters, thresholds: &FeedbackThresholds) -> FeedbackReport {
    let frames = counters.frame_count;
    let mut messages: Vec<String> = Vec::new();

    let behavioral = [
        (counters.blink_count, thresholds.blink, EXCESSIVE_BLINKING),
        (counters.brow_movement_count, thresholds.brow_movement, FREQUENT_BROW_MOVEMENT),
        (counters.hand_movement_count, thresholds.hand_movement, FREQUENT_HAND_MOVEMENT),
        (counters.posture_issues, thresholds.posture, POSTURE_ISSUES),
    ];
    for (count, ratio, message) in behavioral {
        if exceeds(count, frames, ratio) {
            messages.push(message.to_string());
        }
    }

    if exceeds(counters.smile_count, frames, thresholds.smile) {
        messages.push(GREAT_SMILE.to_string());
    } else if exceeds(counters.frown_count, frames, thresholds.frown) {
        messages.push(FREQUENT_FROWNING.to_string());
    } else if exceeds(counters.neutral_face_count, frames, thresholds.neutral) {
        messages.push(NEUTRAL_EXPRESSIONS.to_string());
    }

    if messages.is_empty() {
        messages.push(NO_ISSUES.to_string());
    }
    FeedbackReport::new(messages)
}
