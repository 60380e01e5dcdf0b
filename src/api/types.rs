//! Payload types for the platform API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// App record, ACM-aware variant.
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub name: String,
    #[serde(default)]
    pub acm: bool,
}

/// One domain attached to an app.
///
/// `kind` distinguishes operator-owned `custom` domains from the hostnames
/// the platform manages itself. The ACM fields are only populated when the
/// record was fetched with the ACM accept variant.
#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub hostname: String,
    pub kind: String,
    #[serde(default)]
    pub cname: Option<String>,
    #[serde(default)]
    pub acm_status: Option<String>,
    #[serde(default)]
    pub acm_status_reason: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Certificate as hosted by the platform, dedicated or SNI.
///
/// `warnings` maps a field name to advisory strings the platform attached;
/// they are displayed but never change exit codes.
#[derive(Debug, Clone, Deserialize)]
pub struct SniEndpoint {
    pub name: String,
    #[serde(default)]
    pub cname: Option<String>,
    pub ssl_cert: SslCert,
    #[serde(default)]
    pub warnings: BTreeMap<String, Vec<String>>,
}

/// The X.509 material behind an endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SslCert {
    #[serde(rename = "ca_signed?", default)]
    pub ca_signed: bool,
    pub cert_domains: Vec<String>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
    #[serde(default)]
    pub acm: bool,
}
