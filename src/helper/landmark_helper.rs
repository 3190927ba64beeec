use crate::config::config::SignalThresholds;
use crate::utils::coordinate::{FaceLandmarkSet, PoseLandmarkSet, LEFT_BROW, LEFT_EYE, LIPS, RIGHT_BROW, RIGHT_EYE};

/// Signals derived from one detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceSignals {
    pub blinked: bool,
    pub brow_raised: bool,
    pub mouth_open: bool,
}

/// Signals derived from one decoded frame. The three providers are read
/// independently, so hand and posture signals exist even without a face.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSignals {
    /// One entry per counted face, in provider order.
    pub faces: Vec<FaceSignals>,
    /// At least one hand was detected. Presence, not motion.
    pub hand_moved: bool,
    /// `None` when no pose was detected.
    pub posture_bad: Option<bool>,
}

/// eye_openness returns the (left, right) lid distances of a face.
pub fn eye_openness(face: &FaceLandmarkSet) -> (f32, f32) {
    (face.pair_distance(LEFT_EYE), face.pair_distance(RIGHT_EYE))
}

/// brow_height returns the (left, right) brow-to-reference distances of a face.
pub fn brow_height(face: &FaceLandmarkSet) -> (f32, f32) {
    (face.pair_distance(LEFT_BROW), face.pair_distance(RIGHT_BROW))
}

pub fn mouth_openness(face: &FaceLandmarkSet) -> f32 {
    face.pair_distance(LIPS)
}

/// is_blink requires both eyes to be nearly closed.
pub fn is_blink(face: &FaceLandmarkSet, thresholds: &SignalThresholds) -> bool {
    let (left, right) = eye_openness(face);
    left < thresholds.blink_eye_openness && right < thresholds.blink_eye_openness
}

/// is_brow_raised accepts a raise on either side.
pub fn is_brow_raised(face: &FaceLandmarkSet, thresholds: &SignalThresholds) -> bool {
    let (left, right) = brow_height(face);
    left > thresholds.brow_raise_distance || right > thresholds.brow_raise_distance
}

pub fn is_mouth_open(face: &FaceLandmarkSet, thresholds: &SignalThresholds) -> bool {
    mouth_openness(face) > thresholds.smile_mouth_openness
}

/// is_bad_posture reports a head dropped below the right shoulder. Image y grows downward.
pub fn is_bad_posture(pose: &PoseLandmarkSet) -> bool {
    pose.nose().y > pose.right_shoulder().y
}

pub fn face_signals(face: &FaceLandmarkSet, thresholds: &SignalThresholds) -> FaceSignals {
    FaceSignals {
        blinked: is_blink(face, thresholds),
        brow_raised: is_brow_raised(face, thresholds),
        mouth_open: is_mouth_open(face, thresholds),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::config::SignalThresholds;
    use crate::helper::landmark_helper::{face_signals, is_bad_posture, is_blink, is_brow_raised, is_mouth_open, FaceSignals};
    use crate::utils::coordinate::{
        FaceLandmarkSet, LandmarkPoint, PoseLandmarkSet, FACE_MESH_LANDMARK_COUNT, LEFT_BROW, LEFT_EYE, LIPS, POSE_NOSE,
        POSE_RIGHT_SHOULDER, RIGHT_BROW, RIGHT_EYE,
    };

    /// FaceBuilder sets the landmark pairs the extractor reads, leaving the rest centered.
    pub(crate) struct FaceBuilder {
        points: Vec<LandmarkPoint>,
    }

    impl FaceBuilder {
        pub(crate) fn new() -> Self {
            let mut builder = FaceBuilder { points: vec![LandmarkPoint::new(0.5, 0.5); FACE_MESH_LANDMARK_COUNT] };
            builder.pair(LEFT_EYE, 0.03).pair(RIGHT_EYE, 0.03).pair(LEFT_BROW, 0.03).pair(RIGHT_BROW, 0.03).pair(LIPS, 0.01);
            builder
        }

        pub(crate) fn pair(&mut self, pair: (usize, usize), distance: f32) -> &mut Self {
            self.points[pair.0] = LandmarkPoint::new(0.5, 0.4);
            self.points[pair.1] = LandmarkPoint::new(0.5, 0.4 + distance);
            self
        }

        pub(crate) fn build(&self) -> FaceLandmarkSet {
            FaceLandmarkSet::new(self.points.clone()).unwrap()
        }
    }

    pub(crate) fn pose(nose_y: f32, shoulder_y: f32) -> PoseLandmarkSet {
        let mut points = vec![LandmarkPoint::new(0.5, 0.5); 33];
        points[POSE_NOSE] = LandmarkPoint::new(0.5, nose_y);
        points[POSE_RIGHT_SHOULDER] = LandmarkPoint::new(0.4, shoulder_y);
        PoseLandmarkSet::new(points).unwrap()
    }

    #[test]
    fn test_relaxed_face_has_no_signals() {
        let face = FaceBuilder::new().build();
        assert_eq!(face_signals(&face, &SignalThresholds::new()), FaceSignals::default());
    }

    #[test]
    fn test_blink_needs_both_eyes() {
        let thresholds = SignalThresholds::new();
        let one_eye = FaceBuilder::new().pair(LEFT_EYE, 0.005).build();
        assert!(!is_blink(&one_eye, &thresholds));

        let both_eyes = FaceBuilder::new().pair(LEFT_EYE, 0.005).pair(RIGHT_EYE, 0.01).build();
        assert!(is_blink(&both_eyes, &thresholds));
    }

    #[test]
    fn test_brow_raise_on_either_side() {
        let thresholds = SignalThresholds::new();
        assert!(is_brow_raised(&FaceBuilder::new().pair(RIGHT_BROW, 0.07).build(), &thresholds));
        assert!(is_brow_raised(&FaceBuilder::new().pair(LEFT_BROW, 0.06).build(), &thresholds));
        assert!(!is_brow_raised(&FaceBuilder::new().pair(LEFT_BROW, 0.045).build(), &thresholds));
    }

    #[test]
    fn test_mouth_open() {
        let thresholds = SignalThresholds::new();
        assert!(is_mouth_open(&FaceBuilder::new().pair(LIPS, 0.06).build(), &thresholds));
        assert!(!is_mouth_open(&FaceBuilder::new().pair(LIPS, 0.03).build(), &thresholds));
    }

    #[test]
    fn test_bad_posture_when_nose_below_shoulder() {
        assert!(is_bad_posture(&pose(0.7, 0.6)));
        assert!(!is_bad_posture(&pose(0.3, 0.6)));
    }
}
