use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "nimbusctl", version, about = "TLS certificate management for Nimbus apps")]
pub struct Cli {
    /// App to act on (defaults to NIMBUS_APP)
    #[arg(short = 'a', long, global = true)]
    pub app: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage SSL certificates on an app
    #[command(subcommand)]
    Certs(CertsCommand),
    /// Generate keys and certificate signing requests
    #[command(subcommand)]
    Ssl(SslCommand),
}

#[derive(Subcommand, Debug)]
pub enum CertsCommand {
    /// Add an SSL certificate to an app
    Add(AddArgs),
    /// Show Automatic Certificate Management status
    Auto,
}

#[derive(Subcommand, Debug)]
pub enum SslCommand {
    /// Generate a key and certificate signing request (or self-signed certificate)
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Certificate file (PEM)
    pub crt: PathBuf,

    /// Private key file (PEM)
    pub key: PathBuf,

    /// Bypass the trust chain completion step
    #[arg(long)]
    pub bypass: bool,

    /// Endpoint type to create
    #[arg(long = "type", value_enum)]
    pub endpoint_type: Option<EndpointType>,

    /// Comma-separated domains to create after certificate upload
    #[arg(long)]
    pub domains: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Dedicated SSL endpoint
    Endpoint,
    /// Shared SNI infrastructure
    Sni,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Domain the key material is for
    pub domain: String,

    /// Generate a self-signed certificate instead of a CSR
    #[arg(long)]
    pub selfsigned: bool,

    /// RSA key size in bits
    #[arg(long, default_value_t = 2048)]
    pub keysize: u32,

    /// Name of the organization the certificate belongs to
    #[arg(long)]
    pub owner: Option<String>,

    /// Country of owner, as a two-letter ISO country code
    #[arg(long)]
    pub country: Option<String>,

    /// Sub-country area (state, province, etc.) of owner
    #[arg(long)]
    pub area: Option<String>,

    /// City of owner
    #[arg(long)]
    pub city: Option<String>,

    /// Entire certificate subject, overriding the individual fields
    #[arg(long)]
    pub subject: Option<String>,

    /// Do not prompt for any owner information
    #[arg(long)]
    pub now: bool,
}
