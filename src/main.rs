use std::env;
use anyhow::{bail, Error};
use tracing::{info, Level};
use rs_body_language_pipeline::config::config::ServiceConfig;
use rs_body_language_pipeline::modules::face_mesh_client::FaceMeshClient;
use rs_body_language_pipeline::modules::hand_landmark_client::HandLandmarkClient;
use rs_body_language_pipeline::modules::pose_landmark_client::PoseLandmarkClient;
use rs_body_language_pipeline::triton_client::client::TritonInferenceClient;
use rs_body_language_pipeline::BodyLanguagePipeline;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <config.json> <video>", args.first().map(String::as_str).unwrap_or("body-language-analyze"));
    }

    let config = ServiceConfig::load(&args[1])?;
    info!(triton_url = %config.triton_url, "starting analysis");

    let triton_client = TritonInferenceClient::connect_lazy(&config.triton_url)?;
    let pipeline = BodyLanguagePipeline::new(
        FaceMeshClient::new(triton_client.clone(), config.face_mesh),
        HandLandmarkClient::new(triton_client.clone(), config.hands),
        PoseLandmarkClient::new(triton_client, config.pose),
        config.analysis,
    );

    let video = tokio::fs::File::open(&args[2]).await?;
    let response = pipeline.analyze(video).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
