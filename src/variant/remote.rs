use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::app_config::VariantConfig;
use crate::errors::{TransportError, VariantError};

use super::VariantConverter;

// @module: Online conversion service tier

/// Conversion request body understood by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Text to convert
    pub text: String,
    /// Target variant
    pub converter: String,
    /// Module switches, JSON-encoded as a string
    pub modules: String,
    pub jp_text_conversion_strategy: String,
    pub jp_style_conversion_strategy: String,
    pub diff_enable: bool,
    pub output_format: String,
}

impl ConvertRequest {
    /// Simplified-Chinese conversion of `text`
    pub fn simplified(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            converter: "China".to_string(),
            modules: r#"{"ChineseVariant":"1"}"#.to_string(),
            jp_text_conversion_strategy: "none".to_string(),
            jp_style_conversion_strategy: "none".to_string(),
            diff_enable: false,
            output_format: "json".to_string(),
        }
    }
}

/// Response body returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    /// 0 on success
    pub code: i64,
    #[serde(default)]
    pub data: Option<ConvertData>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Payload of a successful response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertData {
    #[serde(default)]
    pub text: String,
}

/// Raw HTTP answer of one transport attempt
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// One way of reaching the conversion service
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Label used in logs and errors, e.g. `direct` or the proxy URL
    fn label(&self) -> &str;

    /// POST `request` as JSON to `endpoint`
    async fn post_json(&self, endpoint: &str, request: &ConvertRequest) -> Result<TransportResponse, TransportError>;
}

/// Network route for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// No proxy, environment proxies ignored
    Direct,
    /// All traffic through the given proxy URL
    Proxy(String),
}

impl fmt::Display for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proxy(url) => write!(f, "proxy {}", url),
        }
    }
}

/// reqwest-backed transport; one client per route
pub struct ReqwestTransport {
    label: String,
    /// Err when the client could not be built (bad proxy URL)
    client: Result<Client, String>,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("label", &self.label)
            .field("available", &self.client.is_ok())
            .finish()
    }
}

impl ReqwestTransport {
    /// Create a transport for `config` with a per-request timeout
    pub fn new(config: &TransportConfig, timeout: Duration) -> Self {
        let builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("subass/", env!("CARGO_PKG_VERSION")));

        let client = match config {
            TransportConfig::Direct => builder.no_proxy().build().map_err(|e| e.to_string()),
            TransportConfig::Proxy(url) => Proxy::all(url.as_str())
                .and_then(|proxy| builder.proxy(proxy).build())
                .map_err(|e| e.to_string()),
        };

        Self {
            label: config.to_string(),
            client,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn label(&self) -> &str {
        &self.label
    }

    async fn post_json(&self, endpoint: &str, request: &ConvertRequest) -> Result<TransportResponse, TransportError> {
        let client = self.client.as_ref().map_err(|message| TransportError::Unavailable {
            transport: self.label.clone(),
            message: message.clone(),
        })?;

        let request_failed = |e: reqwest::Error| TransportError::RequestFailed {
            transport: self.label.clone(),
            message: e.to_string(),
        };

        let response = client
            .post(endpoint)
            .header("accept", "application/json, text/plain, */*")
            .header("origin", "https://zhconvert.org")
            .header("referer", "https://zhconvert.org/")
            .json(request)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_failed)?;

        Ok(TransportResponse { status, body })
    }
}

/// Remote tier: one attempt per transport, in order, until one succeeds
#[derive(Debug)]
pub struct RemoteConverter {
    endpoint: String,
    transports: Vec<Box<dyn HttpTransport>>,
}

impl RemoteConverter {
    /// Create a remote tier over explicit transports
    pub fn new(endpoint: impl Into<String>, transports: Vec<Box<dyn HttpTransport>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transports,
        }
    }

    /// Direct transport followed by every configured proxy
    pub fn from_config(config: &VariantConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let transports = config
            .transport_configs()
            .iter()
            .map(|t| Box::new(ReqwestTransport::new(t, timeout)) as Box<dyn HttpTransport>)
            .collect();
        Self::new(config.endpoint.clone(), transports)
    }

    /// Labels of the transports in attempt order
    pub fn transport_labels(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.label()).collect()
    }

    async fn attempt(&self, transport: &dyn HttpTransport, request: &ConvertRequest) -> Result<String, TransportError> {
        let label = transport.label().to_string();
        let response = transport.post_json(&self.endpoint, request).await?;

        if response.status != 200 {
            return Err(TransportError::HttpStatus {
                transport: label,
                status: response.status,
            });
        }

        let parsed: ConvertResponse = serde_json::from_str(&response.body).map_err(|e| TransportError::ParseError {
            transport: label.clone(),
            message: e.to_string(),
        })?;

        if parsed.code != 0 {
            if let Some(msg) = &parsed.msg {
                debug!("Service message from {}: {}", label, msg);
            }
            return Err(TransportError::ServiceError {
                transport: label,
                code: parsed.code,
            });
        }

        match parsed.data.map(|d| d.text) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(TransportError::EmptyResult { transport: label }),
        }
    }
}

#[async_trait]
impl VariantConverter for RemoteConverter {
    fn name(&self) -> &str {
        "remote"
    }

    async fn convert(&self, text: &str) -> Result<String, VariantError> {
        if self.transports.is_empty() {
            return Err(VariantError::Unavailable("remote (no transports)".to_string()));
        }

        let request = ConvertRequest::simplified(text);
        let mut last_error = None;

        for transport in &self.transports {
            match self.attempt(transport.as_ref(), &request).await {
                Ok(converted) => {
                    debug!("Remote conversion succeeded via {}", transport.label());
                    return Ok(converted);
                }
                Err(e) => {
                    warn!("Remote conversion attempt failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(VariantError::AllTransportsFailed {
            attempts: self.transports.len(),
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
