use serde::Serialize;
use thiserror::Error;
use crate::pipeline::feedback::FeedbackReport;

/// Failure outcome of one analysis call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The staged upload could not be opened as a video.
    #[error("Unable to open video file")]
    SourceUnreadable,
    /// Anything else that went wrong while staging, decoding, detecting or synthesizing.
    #[error("{0}")]
    ProcessingFailure(String),
}

impl AnalysisError {
    pub fn processing(err: anyhow::Error) -> Self {
        AnalysisError::ProcessingFailure(err.to_string())
    }
}

/// Serialized result of `analyze`, either the feedback list or an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Feedback {
        #[serde(rename = "bodyLanguageFeedback")]
        body_language_feedback: Vec<String>,
    },
    Error {
        error: String,
    },
}

impl From<Result<FeedbackReport, AnalysisError>> for AnalysisResponse {
    fn from(result: Result<FeedbackReport, AnalysisError>) -> Self {
        match result {
            Ok(report) => AnalysisResponse::Feedback {
                body_language_feedback: report.into_messages(),
            },
            Err(err) => AnalysisResponse::Error {
                error: err.to_string(),
            },
        }
    }
}
