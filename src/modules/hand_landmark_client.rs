use anyhow::Error;
use async_trait::async_trait;
use opencv::core::Mat;
use crate::config::config::HandsConfig;
use crate::modules::landmark_model_client::{detection_count, landmarks_at, score_at, LandmarkModelClient, ModelOutputs};
use crate::modules::provider::HandLandmarkProvider;
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::coordinate::HandLandmarkSet;

#[derive(Debug, Clone)]
pub struct HandLandmarkClient {
    model: LandmarkModelClient,
    pub max_num_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    landmarks_output: String,
    scores_output: String,
    presence_output: String,
}

impl HandLandmarkClient {
    pub fn new(triton_infer_client: TritonInferenceClient, config: HandsConfig) -> Self {
        HandLandmarkClient {
            model: LandmarkModelClient::new(
                triton_infer_client,
                &config.model_name,
                config.timeout,
                config.mean,
                config.scale,
                config.imsize,
                &config.input_name,
            ),
            max_num_hands: config.max_num_hands,
            min_detection_confidence: config.min_detection_confidence,
            min_tracking_confidence: config.min_tracking_confidence,
            landmarks_output: config.landmarks_output,
            scores_output: config.scores_output,
            presence_output: config.presence_output,
        }
    }

    /// postprocess keeps hands whose palm score and landmark presence both pass.
    pub fn postprocess(&self, outputs: &ModelOutputs) -> Result<Vec<HandLandmarkSet>, Error> {
        let landmarks = outputs.get(&self.landmarks_output)?;
        let scores = outputs.get(&self.scores_output)?;
        let presence = outputs.get(&self.presence_output)?;

        let mut hands: Vec<HandLandmarkSet> = Vec::with_capacity(self.max_num_hands);
        for i in 0..detection_count(landmarks)? {
            if hands.len() >= self.max_num_hands {
                break
            }
            if score_at(scores, i)? < self.min_detection_confidence
                || score_at(presence, i)? < self.min_tracking_confidence {
                continue
            }
            hands.push(HandLandmarkSet { points: landmarks_at(landmarks, i)? });
        }
        Ok(hands)
    }
}

#[async_trait(?Send)]
impl HandLandmarkProvider for HandLandmarkClient {
    async fn detect(&self, image: &Mat) -> Result<Vec<HandLandmarkSet>, Error> {
        let outputs = self
            .model
            .infer(image, &[self.landmarks_output.as_str(), self.scores_output.as_str(), self.presence_output.as_str()])
            .await?;
        self.postprocess(&outputs)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array, IxDyn};
    use crate::config::config::HandsConfig;
    use crate::modules::hand_landmark_client::HandLandmarkClient;
    use crate::modules::landmark_model_client::tests::landmark_tensor;
    use crate::modules::landmark_model_client::ModelOutputs;
    use crate::triton_client::client::TritonInferenceClient;
    use crate::utils::coordinate::HAND_LANDMARK_COUNT;

    fn outputs(scores: Vec<f32>, presence: Vec<f32>) -> ModelOutputs {
        let n = scores.len();
        let points = vec![(0.5, 0.5); n];
        let mut outputs = ModelOutputs::default();
        outputs.insert(
            "landmarks",
            Array::from_shape_vec(IxDyn(&[n, HAND_LANDMARK_COUNT, 3]), landmark_tensor(&points, HAND_LANDMARK_COUNT)).unwrap(),
        );
        outputs.insert("scores", Array::from_shape_vec(IxDyn(&[n]), scores).unwrap());
        outputs.insert("presence", Array::from_shape_vec(IxDyn(&[n, 1]), presence).unwrap());
        outputs
    }

    #[tokio::test]
    async fn test_postprocess_requires_detection_and_presence() {
        let triton = TritonInferenceClient::connect_lazy("http://127.0.0.1:8001").unwrap();
        let client = HandLandmarkClient::new(triton, HandsConfig::new());

        let hands = client.postprocess(&outputs(vec![0.9, 0.3, 0.8], vec![0.2, 0.9, 0.7])).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].points.len(), HAND_LANDMARK_COUNT);

        let hands = client.postprocess(&outputs(vec![0.9, 0.9, 0.9], vec![0.9, 0.9, 0.9])).unwrap();
        assert_eq!(hands.len(), 2);
    }

    #[tokio::test]
    async fn test_postprocess_missing_presence_output() {
        let triton = TritonInferenceClient::connect_lazy("http://127.0.0.1:8001").unwrap();
        let mut config = HandsConfig::new();
        config.presence_output = "hand_flag".to_string();
        let client = HandLandmarkClient::new(triton, config);

        assert!(client.postprocess(&outputs(vec![0.9], vec![0.9])).is_err());
    }
}
