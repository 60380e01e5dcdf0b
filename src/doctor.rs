//! Bridge to the external `ssl-doctor` chain-resolution tool.

use std::path::Path;
use std::process::{Output, Stdio};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

/// Key material as returned by `ssl-doctor`: completed chain plus the
/// matching private key.
#[derive(Debug, Deserialize)]
pub struct ResolvedMaterial {
    pub pem: String,
    pub key: String,
}

/// Run `ssl-doctor resolve-chain-and-key` over a raw certificate and key.
/// The tool takes both payloads concatenated on stdin and answers with one
/// JSON object on stdout; anything else is treated as failure.
pub async fn resolve_chain_and_key(crt: &str, key: &str) -> Result<ResolvedMaterial> {
    let binary = which::which("ssl-doctor")
        .context("ssl-doctor not found on PATH (use --bypass to skip chain resolution)")?;
    debug!("running {} resolve-chain-and-key", binary.display());

    let payload = format!("{crt}\n{key}");
    let output = run_piped(&binary, &["resolve-chain-and-key"], payload).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("ssl-doctor failed: {}", stderr.trim()));
    }

    serde_json::from_slice(&output.stdout).context("ssl-doctor returned unparsable output")
}

/// Spawn a tool with piped stdio, feed it `payload`, and collect its output.
/// The feed runs joined with the output collection; writing and draining
/// must overlap or payloads beyond the pipe buffers deadlock.
async fn run_piped(binary: &Path, args: &[&str], payload: String) -> Result<Output> {
    let mut child = tokio::process::Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", binary.display()))?;

    let mut stdin = child
        .stdin
        .take()
        .with_context(|| format!("Failed to open stdin of {}", binary.display()))?;
    let feed = async move {
        stdin.write_all(payload.as_bytes()).await?;
        // stdin drops here, closing the pipe so the tool can finish
        Ok::<_, std::io::Error>(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output.with_context(|| format!("Failed to run {}", binary.display()))?;
    if output.status.success() {
        // The tool's own stderr is the better diagnostic when it failed; a
        // feed error on a successful run still means truncated input.
        fed.with_context(|| format!("Failed to send input to {}", binary.display()))?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[cfg(unix)]
    #[tokio::test]
    async fn feeds_stdin_while_draining_stdout() {
        // Larger than the stdin and stdout pipe buffers combined, so this
        // hangs unless the feed and the drain run at the same time.
        let payload = "x".repeat(1 << 20);
        let output = tokio::time::timeout(
            Duration::from_secs(30),
            run_piped(Path::new("cat"), &[], payload.clone()),
        )
        .await
        .expect("finishes")
        .expect("cat");

        assert!(output.status.success());
        assert_eq!(output.stdout.len(), payload.len());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stderr_and_status_on_failure() {
        let output = run_piped(Path::new("sh"), &["-c", "echo nope >&2; exit 3"], String::new())
            .await
            .expect("sh");

        assert!(!output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "nope");
    }
}
