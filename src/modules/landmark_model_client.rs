use std::collections::HashMap;
use std::time::Duration;
use anyhow::Error;
use ndarray::{Array, ArrayD, Ix3, IxDyn};
use opencv::core::Mat;
use tracing::warn;
use crate::triton_client::client::triton::model_infer_request::{InferInputTensor, InferRequestedOutputTensor};
use crate::triton_client::client::triton::{InferTensorContents, ModelInferRequest, ModelInferResponse};
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::coordinate::LandmarkPoint;
use crate::utils::image::image_to_tensor;
use crate::utils::utils::u8_to_f32_vec;

/// Output tensors of one inference call, keyed by output name.
#[derive(Debug, Clone, Default)]
pub struct ModelOutputs {
    tensors: HashMap<String, ArrayD<f32>>,
}

impl ModelOutputs {
    pub fn get(&self, name: &str) -> Result<&ArrayD<f32>, Error> {
        self.tensors
            .get(name)
            .ok_or_else(|| Error::msg(format!("model response has no output named {name}")))
    }

    pub fn insert(&mut self, name: &str, tensor: ArrayD<f32>) {
        self.tensors.insert(name.to_string(), tensor);
    }
}

/// Triton plumbing shared by the face, hand and pose landmark models:
/// image preprocessing, request building and response decoding.
#[derive(Debug, Clone)]
pub struct LandmarkModelClient {
    triton_infer_client: TritonInferenceClient,
    pub model_name: String,
    pub timeout: Duration,
    pub mean: f32,
    pub scale: f32,
    pub imsize: (i32, i32),
    pub input_name: String,
}

impl LandmarkModelClient {
    pub fn new(
        triton_infer_client: TritonInferenceClient,
        model_name: &str,
        timeout_secs: u64,
        mean: f32,
        scale: f32,
        imsize: (i32, i32),
        input_name: &str,
    ) -> Self {
        LandmarkModelClient {
            triton_infer_client,
            model_name: model_name.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            mean,
            scale,
            imsize,
            input_name: input_name.to_string(),
        }
    }

    /// build_request packs an RGB image into a `ModelInfer` request.
    ///
    /// # Arguments
    /// * `img` - RGB OpenCV matrix
    /// * `outputs` - names of the output tensors to request
    ///
    /// # Returns
    /// * `Result<ModelInferRequest, Error>`
    pub fn build_request(&self, img: &Mat, outputs: &[&str]) -> Result<ModelInferRequest, Error> {
        let tensor = image_to_tensor(img, self.imsize, self.mean, self.scale)?;
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();

        Ok(ModelInferRequest {
            model_name: self.model_name.to_owned(),
            model_version: "".to_string(),
            id: "".to_string(),
            inputs: vec![InferInputTensor {
                name: self.input_name.to_owned(),
                datatype: "FP32".to_string(),
                shape,
                contents: Some(InferTensorContents {
                    fp32_contents: tensor.iter().copied().collect(),
                    ..Default::default()
                }),
            }],
            outputs: outputs
                .iter()
                .map(|name| InferRequestedOutputTensor { name: name.to_string() })
                .collect(),
            raw_input_contents: vec![],
        })
    }

    pub async fn infer(&self, img: &Mat, outputs: &[&str]) -> Result<ModelOutputs, Error> {
        let request = self.build_request(img, outputs)?;
        let response = match self.triton_infer_client.model_infer(request, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                warn!(model = %self.model_name, error = %e, "landmark model inference failed");
                return Err(e)
            }
        };
        decode_outputs(&response)
    }
}

/// decode_outputs turns every FP32 output of a response into a shaped array.
/// Raw output contents take precedence over typed contents.
pub fn decode_outputs(response: &ModelInferResponse) -> Result<ModelOutputs, Error> {
    let mut outputs = ModelOutputs::default();

    for (oidx, output) in response.outputs.iter().enumerate() {
        if output.datatype != "FP32" {
            return Err(Error::msg(format!(
                "output {} of model {} has unsupported datatype {}",
                output.name, response.model_name, output.datatype
            )))
        }

        let mut dimensions: Vec<usize> = Vec::with_capacity(output.shape.len());
        for dim in &output.shape {
            let dim = usize::try_from(*dim)
                .map_err(|_| Error::msg(format!("output {} has negative dimension {}", output.name, dim)))?;
            dimensions.push(dim);
        }

        let values = match response.raw_output_contents.get(oidx) {
            Some(raw) => u8_to_f32_vec(raw),
            None => output
                .contents
                .as_ref()
                .map(|contents| contents.fp32_contents.clone())
                .unwrap_or_default(),
        };

        let array = Array::from_shape_vec(IxDyn(&dimensions), values)?;
        outputs.insert(&output.name, array);
    }
    Ok(outputs)
}

/// detection_count returns the leading dimension of a `[N, K, C]` landmark tensor.
pub fn detection_count(landmarks: &ArrayD<f32>) -> Result<usize, Error> {
    if landmarks.ndim() != 3 || landmarks.shape()[2] < 2 {
        return Err(Error::msg(format!(
            "landmark tensor must be shaped [N, K, C>=2], got {:?}",
            landmarks.shape()
        )))
    }
    Ok(landmarks.shape()[0])
}

/// landmarks_at reads the `index`-th set of a `[N, K, C]` landmark tensor as (x, y) points.
pub fn landmarks_at(landmarks: &ArrayD<f32>, index: usize) -> Result<Vec<LandmarkPoint>, Error> {
    let count = detection_count(landmarks)?;
    if index >= count {
        return Err(Error::msg(format!("landmark set {index} out of range, model returned {count}")))
    }

    let landmarks = landmarks.view().into_dimensionality::<Ix3>()?;
    Ok((0..landmarks.shape()[1])
        .map(|k| LandmarkPoint::new(landmarks[[index, k, 0]], landmarks[[index, k, 1]]))
        .collect())
}

/// score_at reads the `index`-th value of a per-detection score tensor, `[N]` or `[N, 1]`.
pub fn score_at(scores: &ArrayD<f32>, index: usize) -> Result<f32, Error> {
    scores
        .iter()
        .nth(index)
        .copied()
        .ok_or_else(|| Error::msg(format!("score {index} out of range, model returned {}", scores.len())))
}

#[cfg(test)]
pub(crate) mod tests {
    use ndarray::{Array, ArrayD, IxDyn};
    use opencv::core::{Mat, Scalar, CV_8UC3};
    use crate::modules::landmark_model_client::{decode_outputs, detection_count, landmarks_at, score_at, LandmarkModelClient};
    use crate::triton_client::client::triton::model_infer_response::InferOutputTensor;
    use crate::triton_client::client::triton::{InferTensorContents, ModelInferResponse};
    use crate::triton_client::client::TritonInferenceClient;

    pub(crate) fn output(name: &str, shape: Vec<i64>) -> InferOutputTensor {
        InferOutputTensor {
            name: name.to_string(),
            datatype: "FP32".to_string(),
            shape,
            contents: None,
        }
    }

    pub(crate) fn raw(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// landmark_tensor builds a `[N, K, 3]` tensor where every point of set `n` is `points[n]`.
    pub(crate) fn landmark_tensor(points: &[(f32, f32)], k: usize) -> Vec<f32> {
        let mut values = Vec::with_capacity(points.len() * k * 3);
        for &(x, y) in points {
            for _ in 0..k {
                values.extend_from_slice(&[x, y, 0.0]);
            }
        }
        values
    }

    #[test]
    fn test_decode_outputs_prefers_raw_contents() {
        let mut response = ModelInferResponse {
            model_name: "pose_landmark".to_string(),
            outputs: vec![output("scores", vec![2]), output("presence", vec![1])],
            raw_output_contents: vec![raw(&[0.9, 0.1])],
            ..Default::default()
        };
        response.outputs[1].contents = Some(InferTensorContents {
            fp32_contents: vec![0.75],
            ..Default::default()
        });

        let outputs = decode_outputs(&response).unwrap();
        assert_eq!(outputs.get("scores").unwrap().iter().copied().collect::<Vec<_>>(), vec![0.9, 0.1]);
        assert_eq!(score_at(outputs.get("presence").unwrap(), 0).unwrap(), 0.75);
        assert!(outputs.get("landmarks").is_err());
    }

    #[test]
    fn test_decode_outputs_rejects_shape_mismatch() {
        let response = ModelInferResponse {
            outputs: vec![output("scores", vec![3])],
            raw_output_contents: vec![raw(&[0.9, 0.1])],
            ..Default::default()
        };
        assert!(decode_outputs(&response).is_err());
    }

    #[test]
    fn test_decode_outputs_rejects_non_fp32() {
        let mut scores = output("scores", vec![1]);
        scores.datatype = "INT64".to_string();
        let response = ModelInferResponse {
            outputs: vec![scores],
            ..Default::default()
        };
        assert!(decode_outputs(&response).is_err());
    }

    #[test]
    fn test_landmarks_at() {
        let values = landmark_tensor(&[(0.1, 0.2), (0.7, 0.8)], 4);
        let tensor: ArrayD<f32> = Array::from_shape_vec(IxDyn(&[2, 4, 3]), values).unwrap();

        assert_eq!(detection_count(&tensor).unwrap(), 2);
        let second = landmarks_at(&tensor, 1).unwrap();
        assert_eq!(second.len(), 4);
        assert_eq!((second[3].x, second[3].y), (0.7, 0.8));
        assert!(landmarks_at(&tensor, 2).is_err());
    }

    #[test]
    fn test_detection_count_rejects_flat_tensor() {
        let tensor: ArrayD<f32> = Array::from_shape_vec(IxDyn(&[6]), vec![0.0; 6]).unwrap();
        assert!(detection_count(&tensor).is_err());
    }

    #[tokio::test]
    async fn test_build_request() {
        let triton = TritonInferenceClient::connect_lazy("http://127.0.0.1:8001").unwrap();
        let client = LandmarkModelClient::new(triton, "face_mesh", 20, 0.0, 1.0 / 255.0, (4, 2), "input");
        let img = Mat::new_rows_cols_with_default(10, 20, CV_8UC3, Scalar::all(255.0)).unwrap();

        let request = client.build_request(&img, &["landmarks", "scores"]).unwrap();
        assert_eq!(request.model_name, "face_mesh");
        assert_eq!(request.inputs[0].shape, vec![1, 3, 2, 4]);
        let contents = request.inputs[0].contents.as_ref().unwrap();
        assert_eq!(contents.fp32_contents.len(), 24);
        assert!(contents.fp32_contents.iter().all(|v| (v - 1.0).abs() < 1e-6));
        assert_eq!(request.outputs.len(), 2);
    }
}
