use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serving_core::{ArgumentInfo, Job, Model, ResourceId, StagedValue};
use serving_logging::serving_trace;
use url::Url;

use crate::{ApiError, FailureKind};

/// Multipart field every staged value is sent under.
pub const UPLOAD_FIELD: &str = "value_list";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_result_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_result_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub argument_infos: Vec<ArgumentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCreate {
    pub model_id: ResourceId,
    pub argument_infos: Vec<ArgumentInfo>,
}

/// The serving backend's REST surface.
#[async_trait::async_trait]
pub trait ServingApi: Send + Sync {
    async fn list_models(&self) -> Result<Vec<Model>, ApiError>;

    async fn get_model(&self, id: &ResourceId) -> Result<Model, ApiError>;

    async fn upload_values(&self, values: &[StagedValue]) -> Result<UploadResponse, ApiError>;

    async fn create_job(&self, request: &JobCreate) -> Result<Job, ApiError>;

    async fn get_job(&self, id: &ResourceId) -> Result<Job, ApiError>;

    async fn list_jobs(&self, skip: u32, limit: u32) -> Result<Vec<Job>, ApiError>;

    /// Raw result body, decoded as UTF-8 (lossy).
    async fn get_result(&self, path: &str) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base_url: Url,
    settings: ClientSettings,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    /// Appends percent-encoded segments to the base url. A trailing empty
    /// segment produces a trailing slash.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        serving_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(check_status(response).await?).await
    }
}

#[async_trait::async_trait]
impl ServingApi for ReqwestApi {
    async fn list_models(&self) -> Result<Vec<Model>, ApiError> {
        self.get_json(self.endpoint(["models", ""])?).await
    }

    async fn get_model(&self, id: &ResourceId) -> Result<Model, ApiError> {
        let id = id.to_string();
        self.get_json(self.endpoint(["models", id.as_str()])?).await
    }

    async fn upload_values(&self, values: &[StagedValue]) -> Result<UploadResponse, ApiError> {
        let url = self.endpoint(["uploads", ""])?;
        let form = values.iter().fold(Form::new(), |form, value| {
            let part = match value {
                StagedValue::File { name, payload } => {
                    Part::bytes(payload.to_vec()).file_name(name.clone())
                }
                StagedValue::Text(text) => Part::text(text.clone()),
            };
            form.part(UPLOAD_FIELD, part)
        });

        serving_trace!("POST {} with {} part(s)", url, values.len());
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(check_status(response).await?).await
    }

    async fn create_job(&self, request: &JobCreate) -> Result<Job, ApiError> {
        let url = self.endpoint(["jobs", ""])?;
        serving_trace!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(check_status(response).await?).await
    }

    async fn get_job(&self, id: &ResourceId) -> Result<Job, ApiError> {
        let id = id.to_string();
        self.get_json(self.endpoint(["jobs", id.as_str()])?).await
    }

    async fn list_jobs(&self, skip: u32, limit: u32) -> Result<Vec<Job>, ApiError> {
        let mut url = self.endpoint(["jobs", ""])?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    async fn get_result(&self, path: &str) -> Result<String, ApiError> {
        // The result path may itself contain slashes.
        let url = self.endpoint(std::iter::once("results").chain(path.split('/')))?;
        serving_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response).await?;

        let max_bytes = self.settings.max_result_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "result too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "result too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
