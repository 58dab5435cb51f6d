use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// The colorization collaborator as the tracker sees it: grayscale SAR
/// image bytes in, colorized image bytes out.
#[async_trait]
pub trait Colorizer: Send + Sync {
    async fn colorize(&self, image: &[u8]) -> Result<Vec<u8>, GatewayError>;
}

/// Wire protocol spoken to the model server.
///
/// Hosted notebook deployments answer a multipart upload with a download
/// URL; self-hosted ones round-trip the image as base64 inside JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProtocol {
    #[default]
    Multipart,
    Base64,
}

/// HTTP client for the colorization model server.
pub struct ColorizeClient {
    http: Client,
    base_url: String,
    protocol: ModelProtocol,
}

/// Multipart-protocol reply: a server-relative URL to fetch the result from.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrlReply {
    #[serde(default)]
    success: bool,
    colorized_image_url: Option<String>,
}

/// Base64-protocol reply: the result inline.
#[derive(Deserialize)]
struct InlineReply {
    #[serde(default)]
    success: bool,
    image: Option<String>,
}

impl ColorizeClient {
    pub fn new(
        base_url: &str,
        protocol: ModelProtocol,
        request_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(GatewayError::Http)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            protocol,
        })
    }

    /// Probe whether the model server answers HTTP at all. Any status
    /// counts as reachable; hosted notebooks 404 on their root path.
    pub async fn health_check(&self) -> Result<(), GatewayError> {
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map_err(GatewayError::Http)?;
        Ok(())
    }

    async fn colorize_multipart(&self, image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let mime = image::guess_format(image)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("upload.png")
            .mime_str(mime)
            .map_err(GatewayError::Http)?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}/api/colorize", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(GatewayError::Http)?;
        let reply: UrlReply = Self::parse_reply(response).await?;

        let url_path = match reply {
            UrlReply {
                success: true,
                colorized_image_url: Some(path),
            } => path,
            _ => return Err(GatewayError::InvalidResponse),
        };

        // The reply URL is relative to the model server itself.
        let download = self
            .http
            .get(format!("{}{}", self.base_url, url_path))
            .send()
            .await
            .map_err(|_| GatewayError::Download)?;
        if !download.status().is_success() {
            return Err(GatewayError::Download);
        }
        let bytes = download.bytes().await.map_err(|_| GatewayError::Download)?;

        Self::checked_image(bytes.to_vec())
    }

    async fn colorize_base64(&self, image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let request_body = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image),
        });

        let response = self
            .http
            .post(format!("{}/api/colorize", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(GatewayError::Http)?;
        let reply: InlineReply = Self::parse_reply(response).await?;

        let encoded = match reply {
            InlineReply {
                success: true,
                image: Some(data),
            } => data,
            _ => return Err(GatewayError::InvalidResponse),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|_| GatewayError::Base64)?;

        Self::checked_image(bytes)
    }

    /// Surface non-2xx replies with the server's own words, then decode
    /// the JSON body.
    async fn parse_reply<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ModelServer { status, body });
        }
        response
            .json()
            .await
            .map_err(|_| GatewayError::InvalidResponse)
    }

    fn checked_image(bytes: Vec<u8>) -> Result<Vec<u8>, GatewayError> {
        image::guess_format(&bytes).map_err(|_| GatewayError::BadImage)?;
        Ok(bytes)
    }
}

#[async_trait]
impl Colorizer for ColorizeClient {
    async fn colorize(&self, image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        match self.protocol {
            ModelProtocol::Multipart => self.colorize_multipart(image).await,
            ModelProtocol::Base64 => self.colorize_base64(image).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Model server request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model server error: {status}: {body}")]
    ModelServer { status: StatusCode, body: String },

    #[error("Invalid response from model server")]
    InvalidResponse,

    #[error("Failed to download colorized image")]
    Download,

    #[error("Model server returned data that is not an image")]
    BadImage,

    #[error("Model server returned invalid base64 image data")]
    Base64,
}
