use anyhow::Error;
use async_trait::async_trait;
use opencv::core::Mat;
use crate::utils::coordinate::{FaceLandmarkSet, HandLandmarkSet, PoseLandmarkSet};

/// Locates face mesh landmarks in an RGB image.
#[async_trait(?Send)]
pub trait FaceLandmarkProvider {
    /// detect returns one landmark set per detected face, possibly none.
    async fn detect(&self, image: &Mat) -> Result<Vec<FaceLandmarkSet>, Error>;
}

/// Locates hand landmarks in an RGB image.
#[async_trait(?Send)]
pub trait HandLandmarkProvider {
    async fn detect(&self, image: &Mat) -> Result<Vec<HandLandmarkSet>, Error>;
}

/// Locates body pose landmarks in an RGB image.
#[async_trait(?Send)]
pub trait PoseLandmarkProvider {
    /// detect returns the pose of the analyzed subject, or `None` if no body was found.
    async fn detect(&self, image: &Mat) -> Result<Option<PoseLandmarkSet>, Error>;
}
