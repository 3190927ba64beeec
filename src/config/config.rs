use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceMeshConfig {
    pub model_name: String,
    pub timeout: u64,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub input_name: String,
    pub max_num_faces: usize,
    pub min_detection_confidence: f32,
    pub landmarks_output: String,
    pub scores_output: String,
}

impl FaceMeshConfig {
    pub fn new() -> Self {
        FaceMeshConfig {
            model_name: "face_mesh".to_string(),
            timeout: 20,
            mean: 0.0,
            scale: 1.0 / 255.0,
            imsize: (192, 192),
            input_name: "input".to_string(),
            max_num_faces: 1,
            min_detection_confidence: 0.5,
            landmarks_output: "landmarks".to_string(),
            scores_output: "scores".to_string(),
        }
    }
}

impl Default for FaceMeshConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HandsConfig {
    pub model_name: String,
    pub timeout: u64,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub input_name: String,
    pub max_num_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub landmarks_output: String,
    pub scores_output: String,
    pub presence_output: String,
}

impl HandsConfig {
    pub fn new() -> Self {
        HandsConfig {
            model_name: "hand_landmark".to_string(),
            timeout: 20,
            mean: 0.0,
            scale: 1.0 / 255.0,
            imsize: (224, 224),
            input_name: "input".to_string(),
            max_num_hands: 2,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            landmarks_output: "landmarks".to_string(),
            scores_output: "scores".to_string(),
            presence_output: "presence".to_string(),
        }
    }
}

impl Default for HandsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseConfig {
    pub model_name: String,
    pub timeout: u64,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub input_name: String,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub landmarks_output: String,
    pub scores_output: String,
    pub presence_output: String,
}

impl PoseConfig {
    pub fn new() -> Self {
        PoseConfig {
            model_name: "pose_landmark".to_string(),
            timeout: 20,
            mean: 0.0,
            scale: 1.0 / 255.0,
            imsize: (256, 256),
            input_name: "input".to_string(),
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            landmarks_output: "landmarks".to_string(),
            scores_output: "scores".to_string(),
            presence_output: "presence".to_string(),
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometric cut-offs applied to a single face landmark set.
///
/// All distances are in normalized image coordinates and are not scaled by
/// the detected face size, so they drift with the subject's distance from
/// the camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalThresholds {
    /// Both eyes below this openness count as a blink.
    pub blink_eye_openness: f32,
    /// Either brow above this distance counts as a raise.
    pub brow_raise_distance: f32,
    /// Mouth openness above this counts as a smile.
    pub smile_mouth_openness: f32,
    /// Brow movement count that turns a closed mouth into a frown.
    pub frown_brow_count: u64,
}

impl SignalThresholds {
    pub fn new() -> Self {
        SignalThresholds {
            blink_eye_openness: 0.02,
            brow_raise_distance: 0.05,
            smile_mouth_openness: 0.04,
            frown_brow_count: 5,
        }
    }
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-normalized ratios a counter must exceed before feedback is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackThresholds {
    pub blink: f64,
    pub brow_movement: f64,
    pub hand_movement: f64,
    pub posture: f64,
    pub smile: f64,
    pub frown: f64,
    pub neutral: f64,
}

impl FeedbackThresholds {
    pub fn new() -> Self {
        FeedbackThresholds {
            blink: 0.10,
            brow_movement: 0.15,
            hand_movement: 0.20,
            posture: 0.20,
            smile: 0.15,
            frown: 0.15,
            neutral: 0.50,
        }
    }
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self::new()
    }
}

/// How a face with a closed mouth is split between frown and neutral.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionRule {
    /// Compare against the brow movement count observed so far, including
    /// the face being classified. Depends on frame order.
    #[default]
    Cumulative,
    /// Defer closed-mouth faces until the whole video is counted, then
    /// compare against the final brow movement count.
    WholeVideo,
}

/// Which detected faces of a frame contribute to the counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaceCounting {
    /// Only the first face set the provider returns.
    #[default]
    FirstFace,
    /// Every face set, so one frame can count more than once.
    EachFace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub signals: SignalThresholds,
    pub feedback: FeedbackThresholds,
    pub expression_rule: ExpressionRule,
    pub face_counting: FaceCounting,
    pub staging_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        AnalysisConfig::default()
    }

    /// staging_dir returns the directory uploads are staged in before decoding.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub triton_url: String,
    pub face_mesh: FaceMeshConfig,
    pub hands: HandsConfig,
    pub pose: PoseConfig,
    pub analysis: AnalysisConfig,
}

impl ServiceConfig {
    pub fn new() -> Self {
        ServiceConfig {
            triton_url: "http://127.0.0.1:8001".to_string(),
            face_mesh: FaceMeshConfig::new(),
            hands: HandsConfig::new(),
            pose: PoseConfig::new(),
            analysis: AnalysisConfig::new(),
        }
    }

    /// load reads a JSON service configuration, filling absent fields with defaults.
    ///
    /// # Arguments
    /// * `path` - path of the JSON file
    ///
    /// # Returns
    /// * `Result<ServiceConfig, Error>`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}
