pub mod utils;
pub mod triton_client;
pub mod pipeline;
pub mod config;
pub mod helper;
pub mod modules;
pub mod error;

pub use crate::error::{AnalysisError, AnalysisResponse};
pub use crate::pipeline::feedback::FeedbackReport;
pub use crate::pipeline::pipeline::BodyLanguagePipeline;
