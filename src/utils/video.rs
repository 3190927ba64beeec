use std::path::Path;
use anyhow::Error;
use opencv::core::{Mat, MatTraitConst};
use opencv::prelude::{VideoCaptureTrait, VideoCaptureTraitConst};
use opencv::videoio::{CAP_ANY, VideoCapture};
use tracing::{debug, warn};
use crate::error::AnalysisError;

/// A finite, sequential source of BGR frames.
pub trait FrameSource {
    /// next_frame returns the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Mat>, Error>;
}

/// Sequential reader over a video file. The capture is released on
/// end-of-stream, on `release`, and on drop.
pub struct VideoDecoder {
    capture: Option<VideoCapture>,
    decoded: u64,
}

impl VideoDecoder {
    /// open opens the video at `path` for sequential decoding.
    ///
    /// # Arguments
    /// * `path` - staged video file
    ///
    /// # Returns
    /// * `Result<VideoDecoder, AnalysisError>` - `SourceUnreadable` if no backend can open it
    pub fn open(path: &Path) -> Result<Self, AnalysisError> {
        let filename = path.to_str().ok_or(AnalysisError::SourceUnreadable)?;
        let capture = match VideoCapture::from_file(filename, CAP_ANY) {
            Ok(capture) => capture,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "video backend rejected file");
                return Err(AnalysisError::SourceUnreadable)
            }
        };
        if !capture.is_opened().unwrap_or(false) {
            return Err(AnalysisError::SourceUnreadable)
        }
        Ok(VideoDecoder { capture: Some(capture), decoded: 0 })
    }

    /// decoded returns how many frames have been yielded so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    pub fn release(&mut self) -> Result<(), Error> {
        if let Some(mut capture) = self.capture.take() {
            capture.release()?;
        }
        Ok(())
    }
}

impl FrameSource for VideoDecoder {
    fn next_frame(&mut self) -> Result<Option<Mat>, Error> {
        let capture = match self.capture.as_mut() {
            Some(capture) => capture,
            None => return Ok(None),
        };

        let mut frame = Mat::default();
        let ok = capture.read(&mut frame)?;
        if !ok || frame.empty() {
            self.release()?;
            return Ok(None)
        }
        self.decoded += 1;
        Ok(Some(frame))
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release video capture");
        }
    }
}
