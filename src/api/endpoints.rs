//! Routing metadata for the two certificate hosting flavors.

/// How a certificate is hosted: on a dedicated endpoint, or on shared SNI
/// infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Ssl,
    Sni,
}

/// Request path and accept-header variant for one endpoint kind.
#[derive(Debug, Clone)]
pub struct EndpointMeta {
    pub kind: EndpointKind,
    pub path: String,
    pub variant: &'static str,
}

/// Build the upload metadata for an app and endpoint kind.
pub fn meta(app: &str, kind: EndpointKind) -> EndpointMeta {
    match kind {
        EndpointKind::Ssl => EndpointMeta {
            kind,
            path: format!("/apps/{app}/ssl-endpoints"),
            variant: "ssl_cert",
        },
        EndpointKind::Sni => EndpointMeta {
            kind,
            path: format!("/apps/{app}/sni-endpoints"),
            variant: "sni_ssl_cert",
        },
    }
}
