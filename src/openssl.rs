//! Bridge to the external `openssl` binary for key, CSR, and self-signed
//! certificate generation.

use std::process::Stdio;

use anyhow::{Context, Result};
use log::debug;

pub struct Request<'a> {
    pub keysize: u32,
    pub keyfile: &'a str,
    pub outfile: &'a str,
    pub subject: &'a str,
    pub self_signed: bool,
}

/// Invoke `openssl req` with inherited stdio so its own output stays on the
/// operator's terminal.
pub async fn req(request: &Request<'_>) -> Result<()> {
    let binary = which::which("openssl").context("openssl not found on PATH")?;

    let newkey = format!("rsa:{}", request.keysize);
    let mut args = vec![
        "req",
        "-new",
        "-newkey",
        newkey.as_str(),
        "-nodes",
        "-keyout",
        request.keyfile,
        "-out",
        request.outfile,
        "-subj",
        request.subject,
    ];
    if request.self_signed {
        args.push("-x509");
    }
    debug!("running openssl {}", args.join(" "));

    let status = tokio::process::Command::new(&binary)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .context("Failed to start openssl")?;

    if !status.success() {
        return Err(anyhow::anyhow!("openssl exited with {status}"));
    }
    Ok(())
}
