use anyhow::Error;
use async_trait::async_trait;
use opencv::core::Mat;
use crate::config::config::FaceMeshConfig;
use crate::modules::landmark_model_client::{detection_count, landmarks_at, score_at, LandmarkModelClient, ModelOutputs};
use crate::modules::provider::FaceLandmarkProvider;
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::coordinate::FaceLandmarkSet;

#[derive(Debug, Clone)]
pub struct FaceMeshClient {
    model: LandmarkModelClient,
    pub max_num_faces: usize,
    pub min_detection_confidence: f32,
    landmarks_output: String,
    scores_output: String,
}

impl FaceMeshClient {
    pub fn new(triton_infer_client: TritonInferenceClient, config: FaceMeshConfig) -> Self {
        FaceMeshClient {
            model: LandmarkModelClient::new(
                triton_infer_client,
                &config.model_name,
                config.timeout,
                config.mean,
                config.scale,
                config.imsize,
                &config.input_name,
            ),
            max_num_faces: config.max_num_faces,
            min_detection_confidence: config.min_detection_confidence,
            landmarks_output: config.landmarks_output,
            scores_output: config.scores_output,
        }
    }

    /// postprocess keeps the confident faces, in model order, up to `max_num_faces`.
    ///
    /// # Arguments
    /// * `outputs` - decoded model outputs
    ///
    /// # Returns
    /// * `Result<Vec<FaceLandmarkSet>, Error>`
    pub fn postprocess(&self, outputs: &ModelOutputs) -> Result<Vec<FaceLandmarkSet>, Error> {
        let landmarks = outputs.get(&self.landmarks_output)?;
        let scores = outputs.get(&self.scores_output)?;

        let mut faces: Vec<FaceLandmarkSet> = Vec::with_capacity(self.max_num_faces);
        for i in 0..detection_count(landmarks)? {
            if faces.len() >= self.max_num_faces {
                break
            }
            if score_at(scores, i)? < self.min_detection_confidence {
                continue
            }
            faces.push(FaceLandmarkSet::new(landmarks_at(landmarks, i)?)?);
        }
        Ok(faces)
    }
}

#[async_trait(?Send)]
impl FaceLandmarkProvider for FaceMeshClient {
    async fn detect(&self, image: &Mat) -> Result<Vec<FaceLandmarkSet>, Error> {
        let outputs = self.model.infer(image, &[self.landmarks_output.as_str(), self.scores_output.as_str()]).await?;
        self.postprocess(&outputs)
    }
}
