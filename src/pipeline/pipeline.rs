use anyhow::Error;
use opencv::core::Mat;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};
use crate::config::config::{AnalysisConfig, FaceCounting};
use crate::error::{AnalysisError, AnalysisResponse};
use crate::helper::landmark_helper::{face_signals, is_bad_posture, FrameSignals};
use crate::modules::provider::{FaceLandmarkProvider, HandLandmarkProvider, PoseLandmarkProvider};
use crate::pipeline::counters::{Aggregator, RunningCounters};
use crate::pipeline::feedback::{synthesize, FeedbackReport};
use crate::utils::image::bgr_to_rgb;
use crate::utils::staging::StagedUpload;
use crate::utils::video::{FrameSource, VideoDecoder};

/// Lifecycle of one analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Opening,
    Looping,
    Finalizing,
    Done,
    Errored,
}

impl AnalysisState {
    fn advance(&mut self, next: AnalysisState) {
        debug!(from = ?*self, to = ?next, "analysis state");
        *self = next;
    }
}

/// Turns an uploaded video into body language feedback.
///
/// The three landmark providers are built once and shared by every call;
/// each call owns its staged file, decoder and counters.
#[derive(Debug, Clone)]
pub struct BodyLanguagePipeline<F, H, P> {
    face: F,
    hands: H,
    pose: P,
    config: AnalysisConfig,
}

impl<F, H, P> BodyLanguagePipeline<F, H, P>
where
    F: FaceLandmarkProvider,
    H: HandLandmarkProvider,
    P: PoseLandmarkProvider,
{
    /// new initializes new instance of the pipeline
    pub fn new(face: F, hands: H, pose: P, config: AnalysisConfig) -> Self {
        BodyLanguagePipeline { face, hands, pose, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// analyze runs a full analysis and folds the outcome into a response.
    ///
    /// # Arguments
    /// * `video` - the uploaded video body
    ///
    /// # Returns
    /// * `AnalysisResponse` - feedback list, or an error message
    pub async fn analyze<R>(&self, video: R) -> AnalysisResponse
    where
        R: AsyncRead + Unpin,
    {
        AnalysisResponse::from(self.try_analyze(video).await)
    }

    /// try_analyze stages the upload, decodes it frame by frame and synthesizes feedback.
    ///
    /// The staged file and the decoder are released on every return path.
    ///
    /// # Arguments
    /// * `video` - the uploaded video body
    ///
    /// # Returns
    /// * `Result<FeedbackReport, AnalysisError>`
    pub async fn try_analyze<R>(&self, video: R) -> Result<FeedbackReport, AnalysisError>
    where
        R: AsyncRead + Unpin,
    {
        let mut state = AnalysisState::Idle;
        let result = self.run(video, &mut state).await;
        match &result {
            Ok(report) => info!(feedback = report.messages().len(), "analysis done"),
            Err(e) => {
                state.advance(AnalysisState::Errored);
                warn!(error = %e, "analysis failed");
            }
        }
        result
    }

    async fn run<R>(&self, video: R, state: &mut AnalysisState) -> Result<FeedbackReport, AnalysisError>
    where
        R: AsyncRead + Unpin,
    {
        state.advance(AnalysisState::Opening);
        let staged = StagedUpload::stage(&self.config.staging_dir(), video)
            .await
            .map_err(AnalysisError::processing)?;
        let mut decoder = VideoDecoder::open(staged.path())?;

        state.advance(AnalysisState::Looping);
        let counters = self
            .analyze_frames(&mut decoder)
            .await
            .map_err(AnalysisError::processing)?;

        state.advance(AnalysisState::Finalizing);
        decoder.release().map_err(AnalysisError::processing)?;
        drop(staged);
        info!(
            frames = counters.frame_count,
            blinks = counters.blink_count,
            brow_movements = counters.brow_movement_count,
            hand_movements = counters.hand_movement_count,
            posture_issues = counters.posture_issues,
            smiles = counters.smile_count,
            frowns = counters.frown_count,
            neutral = counters.neutral_face_count,
            "video counted"
        );
        let report = synthesize(&counters, &self.config.feedback);

        state.advance(AnalysisState::Done);
        Ok(report)
    }

    /// analyze_frames drains `source`, one frame at a time, into counters.
    /// The first failing frame aborts the whole run.
    pub async fn analyze_frames<S>(&self, source: &mut S) -> Result<RunningCounters, Error>
    where
        S: FrameSource,
    {
        let mut aggregator = Aggregator::new(self.config.expression_rule, self.config.signals.frown_brow_count);
        while let Some(frame) = source.next_frame()? {
            let signals = self.extract_frame_signals(&frame).await?;
            aggregator.record(&signals);
        }
        Ok(aggregator.finish())
    }

    /// extract_frame_signals queries the three providers on one BGR frame.
    /// Each provider is consulted regardless of what the others found.
    pub async fn extract_frame_signals(&self, frame: &Mat) -> Result<FrameSignals, Error> {
        let image = bgr_to_rgb(frame)?;

        let mut faces = self.face.detect(&image).await?;
        if self.config.face_counting == FaceCounting::FirstFace {
            faces.truncate(1);
        }
        let hands = self.hands.detect(&image).await?;
        let pose = self.pose.detect(&image).await?;

        Ok(FrameSignals {
            faces: faces.iter().map(|face| face_signals(face, &self.config.signals)).collect(),
            hand_moved: !hands.is_empty(),
            posture_bad: pose.as_ref().map(is_bad_posture),
        })
    }
}
