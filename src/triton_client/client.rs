use std::time::Duration;
use anyhow::Error;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use crate::triton_client::client::triton::{ModelInferRequest, ModelInferResponse};

/// Messages of the Triton / KServe v2 `inference` gRPC package used by this crate.
/// Only the fields needed for `ModelInfer` are declared; unknown fields on the
/// wire are skipped by prost.
pub mod triton {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct InferTensorContents {
        #[prost(bool, repeated, tag = "1")]
        pub bool_contents: Vec<bool>,
        #[prost(int32, repeated, tag = "2")]
        pub int_contents: Vec<i32>,
        #[prost(int64, repeated, tag = "3")]
        pub int64_contents: Vec<i64>,
        #[prost(uint32, repeated, tag = "4")]
        pub uint_contents: Vec<u32>,
        #[prost(uint64, repeated, tag = "5")]
        pub uint64_contents: Vec<u64>,
        #[prost(float, repeated, tag = "6")]
        pub fp32_contents: Vec<f32>,
        #[prost(double, repeated, tag = "7")]
        pub fp64_contents: Vec<f64>,
        #[prost(bytes = "vec", repeated, tag = "8")]
        pub bytes_contents: Vec<Vec<u8>>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelInferRequest {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(message, repeated, tag = "5")]
        pub inputs: Vec<model_infer_request::InferInputTensor>,
        #[prost(message, repeated, tag = "6")]
        pub outputs: Vec<model_infer_request::InferRequestedOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "7")]
        pub raw_input_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_request {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferInputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferRequestedOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelInferResponse {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(message, repeated, tag = "5")]
        pub outputs: Vec<model_infer_response::InferOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "6")]
        pub raw_output_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_response {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }
    }
}

const MODEL_INFER_PATH: &str = "/inference.GRPCInferenceService/ModelInfer";

/// Thin gRPC client for Triton's `ModelInfer` call. Cloning is cheap and
/// shares the underlying channel.
#[derive(Debug, Clone)]
pub struct TritonInferenceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl TritonInferenceClient {
    /// connect_lazy builds a client for `url`; the connection is made on first use.
    pub fn connect_lazy(url: &str) -> Result<Self, Error> {
        let channel = Endpoint::from_shared(url.to_string())?.connect_lazy();
        Ok(TritonInferenceClient {
            inner: tonic::client::Grpc::new(channel),
        })
    }

    pub async fn model_infer(&self, request: ModelInferRequest, timeout: Duration) -> Result<ModelInferResponse, Error> {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Error::msg(format!("triton service was not ready: {e}")))?;

        let mut request = tonic::Request::new(request);
        request.set_timeout(timeout);

        let codec = tonic::codec::ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(MODEL_INFER_PATH), codec)
            .await?;
        Ok(response.into_inner())
    }
}
