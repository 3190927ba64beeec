use anyhow::Error;
use serde::{Deserialize, Serialize};

/// Number of points in the face mesh topology.
pub const FACE_MESH_LANDMARK_COUNT: usize = 468;
/// Number of points in the hand topology.
pub const HAND_LANDMARK_COUNT: usize = 21;

// face mesh indices, (top, bottom) pairs
pub const LEFT_EYE: (usize, usize) = (159, 145);
pub const RIGHT_EYE: (usize, usize) = (386, 374);
pub const LEFT_BROW: (usize, usize) = (70, 46);
pub const RIGHT_BROW: (usize, usize) = (300, 276);
pub const LIPS: (usize, usize) = (13, 14);

// pose indices
pub const POSE_NOSE: usize = 0;
pub const POSE_RIGHT_SHOULDER: usize = 12;

/// A point in normalized image coordinates, x and y in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        LandmarkPoint { x, y }
    }

    /// vertical_distance returns the absolute difference of the y coordinates.
    pub fn vertical_distance(&self, other: &LandmarkPoint) -> f32 {
        (self.y - other.y).abs()
    }
}

/// One detected face, indexed by the face mesh topology.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarkSet {
    points: Vec<LandmarkPoint>,
}

impl FaceLandmarkSet {
    pub fn new(points: Vec<LandmarkPoint>) -> Result<Self, Error> {
        if points.len() < FACE_MESH_LANDMARK_COUNT {
            return Err(Error::msg(format!(
                "face landmark set has {} points, expected at least {}",
                points.len(),
                FACE_MESH_LANDMARK_COUNT
            )))
        }
        Ok(FaceLandmarkSet { points })
    }

    pub fn point(&self, index: usize) -> LandmarkPoint {
        self.points[index]
    }

    /// pair_distance returns the vertical distance between two indexed points.
    pub fn pair_distance(&self, pair: (usize, usize)) -> f32 {
        self.points[pair.0].vertical_distance(&self.points[pair.1])
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }
}

/// One detected hand. Only its presence is consumed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarkSet {
    pub points: Vec<LandmarkPoint>,
}

/// One detected body pose, indexed by the pose topology.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarkSet {
    points: Vec<LandmarkPoint>,
}

impl PoseLandmarkSet {
    pub fn new(points: Vec<LandmarkPoint>) -> Result<Self, Error> {
        if points.len() <= POSE_RIGHT_SHOULDER {
            return Err(Error::msg(format!(
                "pose landmark set has {} points, expected at least {}",
                points.len(),
                POSE_RIGHT_SHOULDER + 1
            )))
        }
        Ok(PoseLandmarkSet { points })
    }

    pub fn nose(&self) -> LandmarkPoint {
        self.points[POSE_NOSE]
    }

    pub fn right_shoulder(&self) -> LandmarkPoint {
        self.points[POSE_RIGHT_SHOULDER]
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::coordinate::{FaceLandmarkSet, LandmarkPoint, PoseLandmarkSet, FACE_MESH_LANDMARK_COUNT, LIPS};

    #[test]
    fn test_face_landmark_set_rejects_short_topology() {
        let points = vec![LandmarkPoint::default(); 68];
        assert!(FaceLandmarkSet::new(points).is_err());
    }

    #[test]
    fn test_face_pair_distance() {
        let mut points = vec![LandmarkPoint::new(0.5, 0.5); FACE_MESH_LANDMARK_COUNT];
        points[LIPS.0] = LandmarkPoint::new(0.5, 0.61);
        points[LIPS.1] = LandmarkPoint::new(0.5, 0.66);
        let face = FaceLandmarkSet::new(points).unwrap();
        assert!((face.pair_distance(LIPS) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_pose_landmark_set_requires_right_shoulder() {
        assert!(PoseLandmarkSet::new(vec![LandmarkPoint::default(); 12]).is_err());

        let mut points = vec![LandmarkPoint::default(); 33];
        points[0] = LandmarkPoint::new(0.5, 0.3);
        points[12] = LandmarkPoint::new(0.4, 0.6);
        let pose = PoseLandmarkSet::new(points).unwrap();
        assert_eq!(pose.nose().y, 0.3);
        assert_eq!(pose.right_shoulder().y, 0.6);
    }
}
