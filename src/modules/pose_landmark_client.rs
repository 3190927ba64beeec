use anyhow::Error;
use async_trait::async_trait;
use opencv::core::Mat;
use crate::config::config::PoseConfig;
use crate::modules::landmark_model_client::{detection_count, landmarks_at, score_at, LandmarkModelClient, ModelOutputs};
use crate::modules::provider::PoseLandmarkProvider;
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::coordinate::PoseLandmarkSet;

#[derive(Debug, Clone)]
pub struct PoseLandmarkClient {
    model: LandmarkModelClient,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    landmarks_output: String,
    scores_output: String,
    presence_output: String,
}

impl PoseLandmarkClient {
    pub fn new(triton_infer_client: TritonInferenceClient, config: PoseConfig) -> Self {
        PoseLandmarkClient {
            model: LandmarkModelClient::new(
                triton_infer_client,
                &config.model_name,
                config.timeout,
                config.mean,
                config.scale,
                config.imsize,
                &config.input_name,
            ),
            min_detection_confidence: config.min_detection_confidence,
            min_tracking_confidence: config.min_tracking_confidence,
            landmarks_output: config.landmarks_output,
            scores_output: config.scores_output,
            presence_output: config.presence_output,
        }
    }

    /// postprocess returns the single pose when both confidences pass.
    pub fn postprocess(&self, outputs: &ModelOutputs) -> Result<Option<PoseLandmarkSet>, Error> {
        let landmarks = outputs.get(&self.landmarks_output)?;
        if detection_count(landmarks)? == 0 {
            return Ok(None)
        }

        let score = score_at(outputs.get(&self.scores_output)?, 0)?;
        let presence = score_at(outputs.get(&self.presence_output)?, 0)?;
        if score < self.min_detection_confidence || presence < self.min_tracking_confidence {
            return Ok(None)
        }

        Ok(Some(PoseLandmarkSet::new(landmarks_at(landmarks, 0)?)?))
    }
}

#[async_trait(?Send)]
impl PoseLandmarkProvider for PoseLandmarkClient {
    async fn detect(&self, image: &Mat) -> Result<Option<PoseLandmarkSet>, Error> {
        let outputs = self
            .model
            .infer(image, &[self.landmarks_output.as_str(), self.scores_output.as_str(), self.presence_output.as_str()])
            .await?;
        self.postprocess(&outputs)
    }
}
