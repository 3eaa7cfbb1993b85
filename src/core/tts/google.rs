//! Google Cloud Text-to-Speech REST provider.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://texttospeech.googleapis.com/v1/text:synthesize`
//! - Auth: `X-Goog-Api-Key` header, a service account (tokens minted and
//!   refreshed by `google-cloud-auth`) or a static OAuth bearer token
//! - Response: `{"audioContent": "<base64>"}`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use google_cloud_auth::credentials::service_account::{
    AccessSpecifier, Builder as ServiceAccountBuilder,
};
use google_cloud_auth::credentials::{
    Builder as DefaultCredentialsBuilder, CacheableResource, Credentials,
};
use http::{Extensions, HeaderMap};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use super::{AudioConfig, SpeechSynthesis, SynthesisError, VoiceConfig};

/// Google Cloud TTS synthesis endpoint
pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// OAuth scope requested for service account tokens
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// How requests authenticate against the API.
#[derive(Clone, PartialEq, Eq)]
pub enum GoogleCredentials {
    ApiKey(String),
    /// Service account key JSON, a path to a key file, or an empty string for
    /// application default credentials.
    ServiceAccount(String),
    /// Static bearer token. Not refreshed.
    AccessToken(String),
}

impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::ServiceAccount(_) => f.write_str("ServiceAccount(***)"),
            Self::AccessToken(_) => f.write_str("AccessToken(***)"),
        }
    }
}

impl Drop for GoogleCredentials {
    fn drop(&mut self) {
        match self {
            Self::ApiKey(key) => key.zeroize(),
            Self::ServiceAccount(source) => source.zeroize(),
            Self::AccessToken(token) => token.zeroize(),
        }
    }
}

/// Provider settings.
#[derive(Debug, Clone)]
pub struct GoogleTTSConfig {
    pub endpoint: String,
    /// `None` makes every synthesis call fail with a credentials error.
    pub credentials: Option<GoogleCredentials>,
    pub request_timeout: Duration,
}

impl Default for GoogleTTSConfig {
    fn default() -> Self {
        Self {
            endpoint: GOOGLE_TTS_URL.to_string(),
            credentials: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    ssml: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: &'a VoiceConfig,
    audio_config: &'a AudioConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Build token-issuing credentials from a service account source.
///
/// `source` is inline key JSON (starts with `{`), a path to a key file, or
/// empty to use application default credentials.
fn service_account_credentials(source: &str) -> Result<Credentials, SynthesisError> {
    let source = source.trim();
    if source.is_empty() {
        info!("Using Google application default credentials");
        return DefaultCredentialsBuilder::default()
            .with_scopes([CLOUD_PLATFORM_SCOPE])
            .build()
            .map_err(|e| {
                SynthesisError::Credentials(format!(
                    "Application default credentials unavailable: {e}"
                ))
            });
    }

    let json = if source.starts_with('{') {
        source.to_string()
    } else {
        std::fs::read_to_string(source).map_err(|e| {
            SynthesisError::Credentials(format!(
                "Failed to read service account key {source}: {e}"
            ))
        })?
    };
    let key: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
        SynthesisError::Credentials(format!("Service account key is not valid JSON: {e}"))
    })?;

    ServiceAccountBuilder::new(key)
        .with_access_specifier(AccessSpecifier::from_scopes([CLOUD_PLATFORM_SCOPE]))
        .build()
        .map_err(|e| SynthesisError::Credentials(format!("Invalid service account key: {e}")))
}

/// Authorization headers for one request. Tokens are cached and refreshed
/// inside `credentials`.
async fn service_account_headers(credentials: &Credentials) -> Result<HeaderMap, SynthesisError> {
    match credentials.headers(Extensions::new()).await {
        Ok(CacheableResource::New { data, .. }) => Ok(data),
        Ok(_) => Err(SynthesisError::Credentials(
            "Service account returned no authorization headers".to_string(),
        )),
        Err(e) => Err(SynthesisError::Credentials(format!(
            "Failed to obtain service account token: {e}"
        ))),
    }
}

/// Google Cloud TTS client.
pub struct GoogleTTS {
    client: reqwest::Client,
    config: GoogleTTSConfig,
    service_account: Option<Credentials>,
}

impl GoogleTTS {
    /// Build the client. A service account source is resolved here, so a
    /// missing or malformed key fails at startup rather than per request.
    pub fn new(config: GoogleTTSConfig) -> Result<Self, SynthesisError> {
        let service_account = match &config.credentials {
            Some(GoogleCredentials::ServiceAccount(source)) => {
                Some(service_account_credentials(source)?)
            }
            Some(_) => None,
            None => {
                warn!("Google TTS credentials not configured; synthesis requests will fail");
                None
            }
        };
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                SynthesisError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            config,
            service_account,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.config.credentials.is_some()
    }

    async fn build_http_request(
        &self,
        body: &SynthesizeRequest<'_>,
    ) -> Result<reqwest::RequestBuilder, SynthesisError> {
        let request = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(body);

        match &self.config.credentials {
            Some(GoogleCredentials::ApiKey(key)) => Ok(request.header("X-Goog-Api-Key", key.as_str())),
            Some(GoogleCredentials::ServiceAccount(_)) => match &self.service_account {
                Some(credentials) => Ok(request.headers(service_account_headers(credentials).await?)),
                None => Err(SynthesisError::Credentials(
                    "service account credentials were not initialized".to_string(),
                )),
            },
            Some(GoogleCredentials::AccessToken(token)) => {
                Ok(request.header("Authorization", format!("Bearer {token}")))
            }
            None => Err(SynthesisError::Credentials(
                "set GOOGLE_CREDENTIALS_JSON, GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_TTS_API_KEY"
                    .to_string(),
            )),
        }
    }
}

#[async_trait]
impl SpeechSynthesis for GoogleTTS {
    async fn synthesize(
        &self,
        ssml: &str,
        voice: &VoiceConfig,
        audio: &AudioConfig,
    ) -> Result<Bytes, SynthesisError> {
        let body = SynthesizeRequest {
            input: SynthesisInput { ssml },
            voice,
            audio_config: audio,
        };

        debug!(
            ssml_len = ssml.len(),
            voice = %voice.name,
            encoding = %audio.audio_encoding,
            "Google TTS synthesis request"
        );

        let response = self
            .build_http_request(&body)
            .await?
            .send()
            .await
            .map_err(|e| SynthesisError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SynthesisError::Credentials(
                    format!("Google TTS rejected credentials ({status}): {error_text}"),
                ),
                _ => SynthesisError::Provider {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let result: SynthesizeResponse = response.json().await.map_err(|e| {
            SynthesisError::InvalidResponse(format!("Failed to parse response: {e}"))
        })?;

        if result.audio_content.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        let audio_bytes = BASE64
            .decode(&result.audio_content)
            .map_err(|e| SynthesisError::InvalidResponse(format!("Base64 decode error: {e}")))?;

        debug!(audio_bytes = audio_bytes.len(), "Google TTS synthesis complete");
        Ok(Bytes::from(audio_bytes))
    }
}
