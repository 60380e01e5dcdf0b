//! Typed client for the platform API.
//!
//! Every request carries a versioned accept header; some reads need a
//! variant suffix to opt into ACM or SNI payload fields. Errors keep the
//! platform's own message text so per-item failures stay meaningful.

pub mod endpoints;
pub mod types;

use std::time::Duration;

use log::debug;
use reqwest::{Response, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::config::Config;
use endpoints::EndpointMeta;
use types::{App, Domain, SniEndpoint};

/// Versioned media type all requests carry.
const ACCEPT_BASE: &str = "application/vnd.nimbus+json; version=3";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by platform requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform answered with an error payload.
    #[error("{message}")]
    Api {
        status: StatusCode,
        id: Option<String>,
        message: String,
    },

    /// Connection, timeout, or decoding trouble below the API layer.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// JSON body the platform uses for request errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("nimbusctl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    /// App record, ACM-aware variant.
    pub async fn app(&self, app: &str) -> Result<App, ApiError> {
        self.get(&format!("/apps/{app}"), Some("acm")).await
    }

    /// All domains attached to the app.
    pub async fn domains(&self, app: &str) -> Result<Vec<Domain>, ApiError> {
        self.get(&format!("/apps/{app}/domains"), None).await
    }

    /// Domains with ACM status fields populated.
    pub async fn domains_acm(&self, app: &str) -> Result<Vec<Domain>, ApiError> {
        self.get(&format!("/apps/{app}/domains"), Some("acm")).await
    }

    /// Register one custom domain.
    pub async fn create_domain(&self, app: &str, hostname: &str) -> Result<Domain, ApiError> {
        self.post(
            &format!("/apps/{app}/domains"),
            None,
            &json!({ "hostname": hostname }),
        )
        .await
    }

    /// Certificates hosted on the app's shared SNI infrastructure.
    pub async fn sni_endpoints(&self, app: &str) -> Result<Vec<SniEndpoint>, ApiError> {
        self.get(&format!("/apps/{app}/sni-endpoints"), Some("sni_ssl_cert"))
            .await
    }

    /// Upload a certificate chain and private key to the resolved endpoint
    /// path.
    pub async fn create_certificate(
        &self,
        meta: &EndpointMeta,
        chain: &str,
        key: &str,
    ) -> Result<SniEndpoint, ApiError> {
        self.post(
            &meta.path,
            Some(meta.variant),
            &json!({
                "certificate_chain": chain,
                "private_key": key,
            }),
        )
        .await
    }

    /// Whether the app has the dedicated ssl-endpoint addon. A 404 means the
    /// addon is absent; any other error propagates.
    pub async fn has_ssl_endpoint_addon(&self, app: &str) -> Result<bool, ApiError> {
        let probe = self
            .get::<serde_json::Value>(&format!("/apps/{app}/addons/ssl-endpoint"), None)
            .await;
        match probe {
            Ok(_) => Ok(true),
            Err(ApiError::Api { status, .. }) if status == StatusCode::NOT_FOUND => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        variant: Option<&str>,
    ) -> Result<T, ApiError> {
        debug!("GET {path}");
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, accept_header(variant))
            .send()
            .await?;
        decode(response).await
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        variant: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("POST {path}");
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, accept_header(variant))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

fn accept_header(variant: Option<&str>) -> String {
    match variant {
        Some(variant) => format!("{ACCEPT_BASE}.{variant}"),
        None => ACCEPT_BASE.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    let (id, message) = match parsed {
        Some(body) => (body.id, body.message),
        None => (None, None),
    };
    Err(ApiError::Api {
        status,
        id,
        message: message.unwrap_or_else(|| format!("Unexpected API response (HTTP {status})")),
    })
}
